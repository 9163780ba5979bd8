
use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::get,
    Json,
    Router,
};

use uci_meal_api::{MenuDocument, MenuResolver};

use uci_web_api::config::Config;

use self::data::MenuStore;

mod data;
mod helpers;
use helpers::*;

const USAGE: &str = "Invalid query parameters. \
    Needs to contain location=anteatery or location=brandywine, \
    optionally meal=0..3 and date=MM/DD/YYYY. \
    For example, /api?location=anteatery";

#[derive(Clone, FromRef)]
pub struct AppState {
    resolver: MenuResolver,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let clock = config.upstream.clock()?;
        let source = config.upstream.source(&clock)?;
        let mut resolver = MenuResolver::new(source, clock);

        if config.cache.enabled {
            let collections = if let Some(db) = &config.db {
                tracing::info!("connecting to db");
                open_collections(db).await
            } else {
                tracing::info!("no db specified, caching in memory only");
                None
            };
            let store = MenuStore::new(collections, config.cache.memory_capacity);
            resolver = resolver.with_cache(Arc::new(store));
        } else {
            tracing::warn!("cache disabled, every request goes upstream");
        }

        if config.prefetch.enabled {
            start_prefetch(resolver.clone(), &config.prefetch).await;
        }

        Ok(Self { resolver })
    }
}

pub async fn make_router(config: &Config) -> anyhow::Result<Router> {
    Ok(router(AppState::new(config).await?))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(menu))
        .route("/api/", get(menu))
        .with_state(state)
    .fallback(not_found)
}

#[derive(Debug, serde::Deserialize)]
struct MenuQuery {
    location: Option<String>,
    meal: Option<String>,
    date: Option<String>,
}

async fn menu(
    Query(q): Query<MenuQuery>,
    State(resolver): State<MenuResolver>,
) -> Result<Json<MenuDocument>, (StatusCode, String)> {
    let bad_request = |reason: String| {
        tracing::info!("rejecting request: {reason}");
        (StatusCode::BAD_REQUEST, format!("{reason}\n{USAGE}"))
    };

    let location = q.location
        .ok_or_else(|| bad_request(format!("missing location")))?;
    let meal = q.meal.as_deref()
        .map(|v| v.trim().parse::<i64>()
            .map_err(|_| bad_request(format!("meal must be an integer (got '{v}')"))))
    .transpose()?;

    let doc = resolver.get_menu_document(&location, meal, q.date.as_deref())
        .await
    .map_err(|err| bad_request(err.to_string()))?;

    Ok(Json(doc))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Invalid path. The only one available is /api")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use chrono::{NaiveDate, NaiveTime};
    use tower::ServiceExt;
    use uci_meal_api::{
        processed::Nutrition, time::CAMPUS_TZ, CampusClock, Event, FetchError, Item,
        Location, MealPeriod, MenuEntry, MenuSource, Schedule,
    };

    use super::*;

    struct StaticSource;

    #[async_trait]
    impl MenuSource for StaticSource {
        async fn fetch_schedule(&self, _: &Location, _: NaiveDate) -> Result<Schedule, FetchError> {
            Ok(Schedule::default())
        }

        async fn fetch_events(&self, _: &Location, _: NaiveDate) -> Result<Vec<Event>, FetchError> {
            Err(FetchError::Malformed("offline".into()))
        }

        async fn fetch_menu(
            &self, _: &Location, _: MealPeriod, _: NaiveDate,
        ) -> Result<Vec<MenuEntry>, FetchError> {
            Ok(vec![MenuEntry {
                station: "Home".into(),
                category: "Entrées".into(),
                item: Item {
                    name: "Roast Chicken".into(),
                    description: "Herb roasted".into(),
                    nutrition: Nutrition::default(),
                },
            }])
        }
    }

    fn app() -> Router {
        let at = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
            .and_time(NaiveTime::from_hms_opt(19, 0, 0).unwrap())
            .and_utc();
        let resolver = MenuResolver::new(Arc::new(StaticSource), CampusClock::frozen(CAMPUS_TZ, at));
        router(AppState { resolver })
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let res = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn serves_menu_document() {
        let (status, body) = get("/api?location=anteatery&meal=1&date=03%2F08%2F2024").await;
        assert_eq!(status, StatusCode::OK);

        let doc: MenuDocument = serde_json::from_str(&body).unwrap();
        assert_eq!(doc.restaurant, "Anteatery");
        assert_eq!(doc.meal, 1);
        assert_eq!(doc.date, "03/08/2024");
        assert_eq!(doc.all[0].name, "Home");
        assert_eq!(doc.themed, uci_meal_api::processed::events_placeholder());
    }

    #[tokio::test]
    async fn defaults_apply_without_meal_and_date() {
        let (status, body) = get("/api/?location=brandywine").await;
        assert_eq!(status, StatusCode::OK);
        let doc: MenuDocument = serde_json::from_str(&body).unwrap();
        assert_eq!(doc.meal, MealPeriod::Lunch.code());
        assert_eq!(doc.date, "03/08/2024");
    }

    #[tokio::test]
    async fn client_errors_are_bad_requests() {
        for uri in [
            "/api",
            "/api?location=mesa",
            "/api?location=anteatery&meal=lunch",
            "/api?location=anteatery&meal=9",
            "/api?location=anteatery&meal=0&date=2024-03-08",
            "/api?location=anteatery&meal=0&date=03%2F08%2F24",
            "/api?location=anteatery&date=03%2F08%2F%2B2024",
        ] {
            let (status, body) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body.contains("location=anteatery"), "{uri}: {body}");
        }
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let (status, body) = get("/menu?location=anteatery").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("/api"));
    }
}
