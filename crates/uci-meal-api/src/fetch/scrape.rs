use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use super::{FetchError, MenuSource, Upstream, NO_QUERY};
use crate::{
    location::Location,
    meal::MealPeriod,
    normalize::normalize_station_name,
    processed::{Event, Item, MenuEntry, Nutrition, Schedule, ServiceWindow},
    raw,
    time::{format_date, time_from_str},
};

// the overview page lists at most this many periods
const MAX_PERIODS: usize = 5;

static PERIOD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".mealPeriod").unwrap());
static TIMES_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[class=location__times]").unwrap());

static STATION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.menu__station").unwrap());
static STATION_TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.station-header-title").unwrap());
static CATEGORY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.menu__parentCategory").unwrap());
static CATEGORY_NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.categoryName").unwrap());
static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.menu__item.item").unwrap());
static ITEM_NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.viewItem, span.item__name").unwrap());
static CALORIES_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.item__calories").unwrap());
static DESCRIPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.item__content").unwrap());
static BADGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.allergenList img").unwrap());

const EAT_WELL_ICON: &str = "/-/media/Global/All Divisions/Dietary Information/EatWell-80x80.png";
const PLANT_FORWARD_ICON: &str = "/-/media/Global/All Divisions/Dietary Information/PlantForward.png";
const WHOLE_GRAIN_ICON: &str = "/-/media/Global/All Divisions/Dietary Information/WholeGrains-80x80.png";

/// Reads schedules and menus from the location's html pages.
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    upstream: Upstream,
}

impl ScrapeSource {
    pub fn new(upstream: Upstream) -> Self {
        Self { upstream }
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

fn first_text(el: ElementRef<'_>, selector: &Selector) -> Option<String> {
    el.select(selector).next().map(text_of)
}

/// Pairs the first period labels with the first time ranges by position.
pub fn parse_schedule(html: &str) -> Result<Schedule, FetchError> {
    let document = Html::parse_document(html);
    let periods = document.select(&PERIOD_SELECTOR).take(MAX_PERIODS);
    let times = document.select(&TIMES_SELECTOR).take(MAX_PERIODS);

    periods.zip(times).map(|(period, times)| {
        let times = text_of(times);
        let (start, end) = times.split_once(" - ")
            .ok_or_else(|| FetchError::Malformed(format!("no time range in '{times}'")))?;
        let parse = |v: &str| time_from_str(v)
            .map_err(|e| FetchError::Malformed(e.to_string()));

        Ok((
            text_of(period).to_lowercase(),
            ServiceWindow { start: parse(start)?, end: parse(end)? },
        ))
    }).collect()
}

fn flag(el: ElementRef<'_>, attr: &str) -> bool {
    el.value().attr(attr)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn item_from_node(node: ElementRef<'_>) -> Option<Item> {
    let name = first_text(node, &ITEM_NAME_SELECTOR)?;
    let calories = first_text(node, &CALORIES_SELECTOR)
        .and_then(|v| v.split_whitespace().next().map(ToOwned::to_owned));
    let description = first_text(node, &DESCRIPTION_SELECTOR)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "N/A".into());

    let badges: Vec<&str> = node.select(&BADGE_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .collect();
    let has_badge = |icon: &str| badges.iter().any(|v| *v == icon);

    Some(Item {
        name,
        description,
        nutrition: Nutrition {
            is_vegan: flag(node, "isvegan"),
            is_vegetarian: flag(node, "isvegetarian"),
            calories,
            is_eat_well: has_badge(EAT_WELL_ICON),
            is_plant_forward: has_badge(PLANT_FORWARD_ICON),
            is_whole_grain: has_badge(WHOLE_GRAIN_ICON),
            ..Nutrition::default()
        },
    })
}

/// Walks station, category and item nodes in page order.
pub fn parse_menu(html: &str) -> Vec<MenuEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for station_node in document.select(&STATION_SELECTOR) {
        let Some(station) = first_text(station_node, &STATION_TITLE_SELECTOR) else {
            tracing::warn!("station without title, skipping");
            continue;
        };
        let station = normalize_station_name(&station);

        for category_node in station_node.select(&CATEGORY_SELECTOR) {
            let category = first_text(category_node, &CATEGORY_NAME_SELECTOR)
                .unwrap_or_default();

            for item_node in category_node.select(&ITEM_SELECTOR) {
                let Some(item) = item_from_node(item_node) else {
                    tracing::warn!("item without name in {station}/{category}");
                    continue;
                };
                entries.push(MenuEntry {
                    station: station.clone(),
                    category: category.clone(),
                    item,
                });
            }
        }
    }

    entries
}

#[async_trait]
impl MenuSource for ScrapeSource {
    async fn fetch_schedule(
        &self, location: &Location, date: NaiveDate,
    ) -> Result<Schedule, FetchError> {
        // the overview page only shows the current day
        tracing::debug!("scraping today's schedule for {} (requested {date})", location.key);
        let html = self.upstream.get_text(&location.overview_path(), NO_QUERY).await?;
        parse_schedule(&html)
    }

    async fn fetch_events(
        &self, location: &Location, today: NaiveDate,
    ) -> Result<Vec<Event>, FetchError> {
        self.upstream.events(location, today).await
    }

    async fn fetch_menu(
        &self, location: &Location, meal: MealPeriod, date: NaiveDate,
    ) -> Result<Vec<MenuEntry>, FetchError> {
        let html = self.upstream.get_text(
            &location.overview_path(),
            &raw::PageQuery::new(location.upstream_id, meal.period_id(), format_date(date)),
        ).await?;
        Ok(parse_menu(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERVIEW: &str = r#"
        <html><body>
          <div class="location__hours">
            <div><span class="mealPeriod">Breakfast</span><span class="location__times">7:15 am - 11:00 am</span></div>
            <div><span class="mealPeriod">Lunch</span><span class="location__times">11:00 am - 4:30 pm</span></div>
            <div><span class="mealPeriod">Dinner</span><span class="location__times">4:30 pm - 8:00 pm</span></div>
            <div><span class="mealPeriod">Latenight</span><span class="location__times extra">8:00 pm - 11:00 pm</span></div>
          </div>
        </body></html>
    "#;

    const MENU: &str = r#"
        <html><body>
          <div class="menu__station">
            <div class="station-header-title">Hearth/ Pizza</div>
            <div class="menu__parentCategory">
              <span class="categoryName">Pizza</span>
              <ul>
                <li class="menu__item item" isvegan="false" isvegetarian="true">
                  <a class="viewItem">Cheese Pizza</a>
                  <span class="item__calories">290 Cal</span>
                  <p class="item__content">Mozzarella on house dough</p>
                  <ul class="unstyled item__allergens allergenList">
                    <li><img src="/-/media/Global/All Divisions/Dietary Information/WholeGrains-80x80.png"></li>
                  </ul>
                </li>
                <li class="menu__item item" isvegan="true" isvegetarian="true">
                  <span class="item__name">Vegan Flatbread</span>
                  <ul class="unstyled item__allergens allergenList">
                    <li><img src="/-/media/Global/All Divisions/Dietary Information/PlantForward.png"></li>
                    <li><img src="/-/media/Global/All Divisions/Dietary Information/EatWell-80x80.png"></li>
                  </ul>
                </li>
              </ul>
            </div>
          </div>
          <div class="menu__station">
            <div class="station-header-title">Soups</div>
            <div class="menu__parentCategory">
              <span class="categoryName">Soups</span>
              <ul><li class="menu__item item"><a class="viewItem">Minestrone</a><p class="item__content"></p></li></ul>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn schedule_pairs_labels_with_times() {
        let schedule = parse_schedule(OVERVIEW).unwrap();
        // the last span has an extra class so it doesn't match the exact class selector
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.get("breakfast"), Some(&ServiceWindow { start: 715, end: 1100 }));
        assert_eq!(schedule.get("lunch"), Some(&ServiceWindow { start: 1100, end: 1630 }));
        assert_eq!(schedule.get("dinner"), Some(&ServiceWindow { start: 1630, end: 2000 }));
    }

    #[test]
    fn schedule_with_bad_times_is_malformed() {
        let html = r#"<span class="mealPeriod">Lunch</span><span class="location__times">all day</span>"#;
        assert!(parse_schedule(html).unwrap_err().is_malformed());
    }

    #[test]
    fn menu_items_in_page_order() {
        let entries = parse_menu(MENU);
        assert_eq!(entries.len(), 3);

        let pizza = &entries[0];
        assert_eq!(pizza.station, "Hearth / Pizza");
        assert_eq!(pizza.category, "Pizza");
        assert_eq!(pizza.item.name, "Cheese Pizza");
        assert_eq!(pizza.item.nutrition.calories.as_deref(), Some("290"));
        assert_eq!(pizza.item.description, "Mozzarella on house dough");
        assert!(!pizza.item.nutrition.is_vegan);
        assert!(pizza.item.nutrition.is_vegetarian);
        assert!(pizza.item.nutrition.is_whole_grain);
        assert!(!pizza.item.nutrition.is_eat_well);

        let flatbread = &entries[1].item;
        assert_eq!(flatbread.name, "Vegan Flatbread");
        assert_eq!(flatbread.description, "N/A");
        assert_eq!(flatbread.nutrition.calories, None);
        assert!(flatbread.nutrition.is_vegan);
        assert!(flatbread.nutrition.is_plant_forward && flatbread.nutrition.is_eat_well);

        let soup = &entries[2];
        assert_eq!(soup.station, "Soups");
        assert_eq!(soup.item.description, "N/A");
        assert!(!soup.item.nutrition.is_vegan && !soup.item.nutrition.is_whole_grain);
    }

    #[test]
    fn page_without_stations() {
        assert!(parse_menu("<html><body>Closed today</body></html>").is_empty());
    }
}
