use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The response served for one (location, date, meal).
///
/// Built once per request and never changed afterwards; cached copies are
/// served verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDocument {
    pub meal: u8,
    /// `MM/DD/YYYY`
    pub date: String,
    pub restaurant: String,
    /// unix seconds at generation
    pub refresh_time: i64,
    pub schedule: Schedule,
    pub current_meal: String,
    pub price: Prices,
    pub all: Vec<Station>,
    pub themed: Vec<Event>,
}

/// Meal name to service window. Keys serialize in sorted order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(BTreeMap<String, ServiceWindow>);

impl Schedule {
    pub fn contains(&self, meal: &str) -> bool {
        self.0.contains_key(meal)
    }

    pub fn get(&self, meal: &str) -> Option<&ServiceWindow> {
        self.0.get(meal)
    }

    /// replaces an existing window for the same meal
    pub fn insert(&mut self, meal: impl Into<String>, window: ServiceWindow) {
        self.0.insert(meal.into(), window);
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceWindow)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, ServiceWindow)> for Schedule {
    fn from_iter<T: IntoIterator<Item = (String, ServiceWindow)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `hour * 100 + minute` on both ends, same day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWindow {
    pub start: u16,
    pub end: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub breakfast: f64,
    pub lunch: f64,
    pub brunch: f64,
    pub dinner: f64,
}

pub const DEFAULT_PRICES: Prices = Prices {
    breakfast: 9.75,
    lunch: 13.75,
    brunch: 13.75,
    dinner: 14.75,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "station")]
    pub name: String,
    pub menu: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category")]
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub nutrition: Nutrition,
}

/// Nutrition facts as reported upstream (strings, `null` when not listed)
/// plus the dietary badges.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub serving_size: Option<String>,
    pub serving_unit: Option<String>,
    pub calories: Option<String>,
    pub calories_from_fat: Option<String>,
    pub total_fat: Option<String>,
    pub trans_fat: Option<String>,
    pub cholesterol: Option<String>,
    pub sodium: Option<String>,
    pub total_carbohydrates: Option<String>,
    pub dietary_fiber: Option<String>,
    pub sugars: Option<String>,
    pub protein: Option<String>,
    pub vitamin_a: Option<String>,
    pub vitamin_c: Option<String>,
    pub calcium: Option<String>,
    pub iron: Option<String>,
    pub saturated_fat: Option<String>,
    pub is_eat_well: bool,
    pub is_plant_forward: bool,
    pub is_whole_grain: bool,
}

impl Nutrition {
    fn placeholder() -> Self {
        let s = |v: &str| Some(v.to_owned());
        Self {
            is_vegan: true,
            is_vegetarian: true,
            serving_size: s("2"),
            serving_unit: s("tablespoons"),
            calories: s("60"),
            calories_from_fat: s("45"),
            total_fat: s("5"),
            trans_fat: s("0"),
            cholesterol: s("0"),
            sodium: s("200"),
            total_carbohydrates: s("4"),
            dietary_fiber: s("0"),
            sugars: s("4"),
            protein: s("0"),
            saturated_fat: s("0.5"),
            ..Self::default()
        }
    }
}

/// A themed dining event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// `MM/DD/YYYY`
    pub date: String,
    pub name: String,
    pub service_start: u16,
    pub service_end: u16,
}

/// One item with the station and category it is served under, in upstream
/// order. Both fetch strategies produce this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub station: String,
    pub category: String,
    pub item: Item,
}

pub const ERROR_STATION: &str = "Error";
const ERROR_CATEGORY: &str = "Error Description";

impl Station {
    /// single station/category/item explaining why there is no menu
    pub fn placeholder(message: &str, description: &str) -> Self {
        Self {
            name: ERROR_STATION.into(),
            menu: vec![Category {
                name: ERROR_CATEGORY.into(),
                items: vec![Item {
                    name: message.into(),
                    description: description.into(),
                    nutrition: Nutrition::placeholder(),
                }],
            }],
        }
    }

    pub fn fetch_failed() -> Self {
        Self::placeholder(
            "We encountered an error getting the menu data. If the campusdish \
             website has the menu but we don't, please let us know and we'll \
             look into a fix.",
            "?????????????",
        )
    }

    pub fn empty_menu() -> Self {
        Self::placeholder("The menu is empty for today", "????")
    }
}

/// served as `themed` when the event page can't be read or lists nothing
pub fn events_placeholder() -> Vec<Event> {
    vec![Event {
        date: String::new(),
        name: "No themed events scheduled".into(),
        service_start: 0,
        service_end: 0,
    }]
}
