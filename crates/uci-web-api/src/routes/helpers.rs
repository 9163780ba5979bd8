use std::{future::Future, pin::Pin, time::Instant};

use mongodb::options::ClientOptions;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uci_meal_api::{week::resolve_week, MenuResolver};

use uci_web_api::config::{DbConfig, PrefetchConfig};

use super::data::MenuCollections;

pub trait Pinable: Sized {
    fn pin(self) -> Pin<Box<Self>> { Box::pin(self) }
}

impl<F: Future> Pinable for F {}

/// Periodically resolves the coming days for every location so requests
/// hit a warm cache.
pub async fn start_prefetch(resolver: MenuResolver, cfg: &PrefetchConfig) {
    let days = cfg.days;

    if let Err(err) = async {
        let shed = JobScheduler::new().await?;
        shed.add(Job::new_async(cfg.schedule.as_str(), move |uuid, _| {
            let resolver = resolver.clone();
            async move {
                tracing::info!("prefetching {days} days (job: {uuid:?})");
                let start = Instant::now();
                let docs = resolve_week(&resolver, days).await;
                let took = start.elapsed();
                tracing::info!("prefetched {} menus (took {took:?})", docs.len());
            }.pin()
        })?).await?;
        shed.start().await?;
        Ok::<_, JobSchedulerError>(())
    }.await {
        tracing::error!("could not start prefetch job: {err}");
    } else {
        tracing::info!("scheduled prefetch of {days} days ({})", cfg.schedule);
    }
}

pub async fn open_collections(cfg: &DbConfig) -> Option<MenuCollections> {
    match async {
        mongodb::Client::with_options(
            ClientOptions::parse(&cfg.url).await?,
        )
    }.await {
        Ok(client) => {
            tracing::info!("caching menus in {}.{}", cfg.database, cfg.collection);
            Some(MenuCollections::new(&client.database(&cfg.database), &cfg.collection))
        },
        Err(err) => {
            tracing::error!("could not connect to db: {err}");
            None
        },
    }
}
