use async_trait::async_trait;
use chrono::NaiveDate;

use super::{FetchError, MenuSource, Upstream};
use crate::{
    location::Location,
    meal::MealPeriod,
    normalize::entries_from_api,
    processed::{Event, MenuEntry, Schedule, ServiceWindow},
    raw,
    time::{format_date, CampusClock},
};

const MENU_PATH: &str = "/api/menu/GetMenus";
const SCHEDULE_PATH: &str = "/api/menu/GetMenuPeriods";

/// Reads menus and schedules from the json api.
#[derive(Debug, Clone)]
pub struct ApiSource {
    upstream: Upstream,
    clock: CampusClock,
}

impl ApiSource {
    pub fn new(upstream: Upstream, clock: CampusClock) -> Self {
        Self { upstream, clock }
    }
}

fn lower_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the day's schedule, converting utc period bounds to campus time.
pub fn schedule_from_periods(
    periods: &[raw::ApiPeriod], clock: &CampusClock,
) -> Result<Schedule, FetchError> {
    let to_local = |ts: &str| clock.utc_to_local_time(ts)
        .map_err(|e| FetchError::Malformed(e.to_string()));

    periods.iter().map(|period| {
        let window = ServiceWindow {
            start: to_local(&period.utc_meal_period_start_time)?,
            end: to_local(&period.utc_meal_period_end_time)?,
        };
        Ok((lower_first_letter(&period.period_name), window))
    }).collect()
}

#[async_trait]
impl MenuSource for ApiSource {
    async fn fetch_schedule(
        &self, location: &Location, date: NaiveDate,
    ) -> Result<Schedule, FetchError> {
        let res: raw::ApiScheduleResult = self.upstream.get_json(
            SCHEDULE_PATH,
            &raw::ScheduleQuery::new(location.upstream_id, format_date(date)),
        ).await?;

        let periods = res.result.ok_or_else(|| {
            FetchError::Malformed("key \"Result\" missing from schedule response".into())
        })?;
        schedule_from_periods(&periods, &self.clock)
    }

    async fn fetch_events(
        &self, location: &Location, today: NaiveDate,
    ) -> Result<Vec<Event>, FetchError> {
        self.upstream.events(location, today).await
    }

    async fn fetch_menu(
        &self, location: &Location, meal: MealPeriod, date: NaiveDate,
    ) -> Result<Vec<MenuEntry>, FetchError> {
        let res: raw::ApiMenuResult = self.upstream.get_json(
            MENU_PATH,
            &raw::MenuQuery::new(location.upstream_id, meal.period_id(), format_date(date)),
        ).await?;

        let menu = res.menu.ok_or_else(|| {
            FetchError::Malformed("key \"Menu\" missing from menu response".into())
        })?;
        Ok(entries_from_api(&menu))
    }
}
