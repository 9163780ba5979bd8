//! Upstream data sources.
//!
//! [`ApiSource`] reads the json menu api, [`ScrapeSource`] reads the html
//! pages. Both produce the same shapes, so the resolver only sees a
//! [`MenuSource`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    events::extract_events,
    location::Location,
    meal::MealPeriod,
    processed::{Event, MenuEntry, Schedule},
};

mod api;
mod scrape;

pub use api::ApiSource;
pub use scrape::ScrapeSource;

pub const DEFAULT_BASE_URL: &str = "https://uci.campusdish.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Unreachable(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Unreachable(err) => !err.is_decode(),
            Self::Status(_) => true,
            Self::Malformed(_) => false,
        }
    }

    pub fn is_malformed(&self) -> bool { !self.is_unreachable() }
}

/// One way of getting a day's data for a location.
///
/// An `Err` means the upstream could not be reached or sent something
/// unreadable; an `Ok` with nothing in it is a well-formed empty result.
/// Failed requests are not retried.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn fetch_schedule(
        &self, location: &Location, date: NaiveDate,
    ) -> Result<Schedule, FetchError>;

    /// themed events dated `today` or later
    async fn fetch_events(
        &self, location: &Location, today: NaiveDate,
    ) -> Result<Vec<Event>, FetchError>;

    async fn fetch_menu(
        &self, location: &Location, meal: MealPeriod, date: NaiveDate,
    ) -> Result<Vec<MenuEntry>, FetchError>;
}

/// Http access to the provider, with a bounded timeout on every request.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    async fn get<Q: Serialize + ?Sized>(
        &self, path: &str, query: &Q,
    ) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("GET {url}");

        let res = self.client.get(&url)
            .query(query)
            .send().await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!("{url} returned {status}");
            return Err(FetchError::Status(status));
        }
        Ok(res)
    }

    async fn get_text<Q: Serialize + ?Sized>(
        &self, path: &str, query: &Q,
    ) -> Result<String, FetchError> {
        Ok(self.get(path, query).await?.text().await?)
    }

    async fn get_json<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self, path: &str, query: &Q,
    ) -> Result<T, FetchError> {
        let body = self.get_text(path, query).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// themed events from the overview page, shared by both strategies
    async fn events(&self, location: &Location, today: NaiveDate) -> Result<Vec<Event>, FetchError> {
        let html = self.get_text(&location.overview_path(), NO_QUERY).await?;
        Ok(extract_events(&html, today))
    }
}
