//! Prints every location's menus for the coming week as json.
//!
//! usage: `week_menu [days]` (default 7)
//!
//! Reads the `[upstream]` section of `uci_web_api.toml` like the server
//! does. Nothing is cached.

use anyhow::Context;
use uci_meal_api::{week::resolve_week, MenuResolver};
use uci_web_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let days = match std::env::args().nth(1) {
        Some(v) => v.parse().with_context(|| format!("invalid day count '{v}'"))?,
        None => 7,
    };

    let config = config::read().await?;
    let clock = config.upstream.clock()?;
    let source = config.upstream.source(&clock)?;
    let resolver = MenuResolver::new(source, clock);

    tracing::info!("fetching {days} days starting after {}", resolver.clock().today());
    let docs = resolve_week(&resolver, days).await;

    let out: Vec<_> = docs.into_iter()
        .map(|(location, doc)| serde_json::json!({ "location": location, "menu": doc }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&out)?);

    Ok(())
}
