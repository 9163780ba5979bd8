use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    cache::{CacheKey, MenuCache},
    fetch::MenuSource,
    location::{self, Location},
    meal::MealPeriod,
    normalize::group_stations,
    processed::{events_placeholder, MenuDocument, Schedule, Station, DEFAULT_PRICES},
    time::{self, format_date, meal_name, CampusClock},
};

/// Problems with the request itself. Upstream failures never end up here.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unknown location '{0}'")]
    InvalidLocation(String),
    #[error("meal must be one of 0, 1, 2, 3 (got {0})")]
    InvalidMeal(i64),
    #[error("date must be MM/DD/YYYY (got '{0}')")]
    InvalidDate(String),
}

/// Answers menu requests: fills in defaults, consults the cache, fetches
/// and normalizes, and substitutes placeholders for anything upstream
/// couldn't deliver.
#[derive(Clone)]
pub struct MenuResolver {
    source: Arc<dyn MenuSource>,
    cache: Option<Arc<dyn MenuCache>>,
    clock: CampusClock,
}

impl MenuResolver {
    pub fn new(source: Arc<dyn MenuSource>, clock: CampusClock) -> Self {
        Self { source, cache: None, clock }
    }

    pub fn with_cache(mut self, cache: Arc<dyn MenuCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn clock(&self) -> &CampusClock { &self.clock }

    /// Resolves `meal` (code 0-3) and `date` (`MM/DD/YYYY`), defaulting to
    /// the current meal and campus date. Only invalid input is an error.
    pub async fn get_menu_document(
        &self, location: &str, meal: Option<i64>, date: Option<&str>,
    ) -> Result<MenuDocument, ResolveError> {
        let location = location::resolve(location)?;
        let meal = match meal {
            Some(code) => MealPeriod::from_code(code)?,
            None => self.clock.current_meal(),
        };
        let date = match date {
            Some(d) => time::parse_date(d)
                .map_err(|_| ResolveError::InvalidDate(d.to_owned()))?,
            None => self.clock.today(),
        };

        Ok(self.resolve(location, meal, date).await)
    }

    pub async fn resolve(
        &self, location: &Location, meal: MealPeriod, date: NaiveDate,
    ) -> MenuDocument {
        let key = CacheKey::new(location, &format_date(date), meal);

        if let Some(cache) = &self.cache {
            if let Some(doc) = cache.get(&key).await {
                tracing::debug!("cache hit for {key}");
                return doc;
            }
        }

        tracing::info!("building {key}");
        let doc = self.build_document(location, meal, date).await;

        if let Some(cache) = &self.cache {
            cache.set(&key, &doc).await;
        }
        doc
    }

    /// Fetches and assembles a fresh document, bypassing the cache.
    pub async fn build_document(
        &self, location: &Location, meal: MealPeriod, date: NaiveDate,
    ) -> MenuDocument {
        let (schedule, themed, menu) = tokio::join!(
            self.source.fetch_schedule(location, date),
            self.source.fetch_events(location, self.clock.today()),
            self.source.fetch_menu(location, meal, date),
        );

        let schedule = schedule.unwrap_or_else(|err| {
            tracing::warn!("no schedule for {} on {date}: {err}", location.key);
            Schedule::default()
        });
        let current_meal = meal_name(&schedule, meal).to_owned();

        let themed = match themed {
            Ok(events) if !events.is_empty() => events,
            Ok(_) => events_placeholder(),
            Err(err) => {
                tracing::warn!("could not fetch events for {}: {err}", location.key);
                events_placeholder()
            },
        };

        let all = match menu {
            Err(err) => {
                tracing::warn!("could not fetch {meal} menu for {} on {date}: {err}", location.key);
                vec![Station::fetch_failed()]
            },
            Ok(entries) => {
                let stations = group_stations(entries);
                if stations.is_empty() {
                    tracing::info!("{meal} menu for {} on {date} is empty", location.key);
                    vec![Station::empty_menu()]
                } else {
                    stations
                }
            },
        };

        MenuDocument {
            meal: meal.code(),
            date: format_date(date),
            restaurant: location.official_name.to_owned(),
            refresh_time: self.clock.now_utc().timestamp(),
            schedule,
            current_meal,
            price: DEFAULT_PRICES,
            all,
            themed,
        }
    }
}
