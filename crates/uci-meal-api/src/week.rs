use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{
    location::LOCATIONS,
    meal::MealPeriod,
    processed::MenuDocument,
    resolver::MenuResolver,
};

/// The `days` days following `start`, three meals each. Weekends get brunch
/// in place of lunch.
pub fn week_plan(start: NaiveDate, days: u64) -> Vec<(NaiveDate, MealPeriod)> {
    (1..=days)
        .filter_map(|i| start.checked_add_days(Days::new(i)))
        .flat_map(|date| {
            let midday = match date.weekday() {
                Weekday::Sat | Weekday::Sun => MealPeriod::Brunch,
                _ => MealPeriod::Lunch,
            };
            [MealPeriod::Breakfast, midday, MealPeriod::Dinner].map(|meal| (date, meal))
        })
        .collect()
}

/// Resolves every location for the days after today, in plan order.
pub async fn resolve_week(resolver: &MenuResolver, days: u64) -> Vec<(&'static str, MenuDocument)> {
    let plan = week_plan(resolver.clock().today(), days);
    let mut docs = Vec::with_capacity(plan.len() * LOCATIONS.len());

    for (date, meal) in plan {
        for location in LOCATIONS {
            docs.push((location.key, resolver.resolve(location, meal, date).await));
        }
    }
    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_starts_tomorrow_and_swaps_weekend_lunch() {
        // a Thursday
        let start = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let plan = week_plan(start, 7);
        assert_eq!(plan.len(), 21);

        let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(plan[0], (friday, MealPeriod::Breakfast));
        assert_eq!(plan[1], (friday, MealPeriod::Lunch));
        assert_eq!(plan[2], (friday, MealPeriod::Dinner));

        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(plan[4], (saturday, MealPeriod::Brunch));
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(plan[7], (sunday, MealPeriod::Brunch));

        assert_eq!(plan[20].0, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[test]
    fn empty_plan() {
        assert!(week_plan(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), 0).is_empty());
    }
}
