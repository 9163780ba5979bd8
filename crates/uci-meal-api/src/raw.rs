//! Upstream JSON shapes of the campusdish menu api.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    location_id: u32,
    period_id: u32,
    date: String,
}

impl MenuQuery {
    pub fn new(location_id: u32, period_id: u32, date: impl Into<String>) -> Self {
        Self { location_id, period_id, date: date.into() }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    location_id: u32,
    date: String,
}

impl ScheduleQuery {
    pub fn new(location_id: u32, date: impl Into<String>) -> Self {
        Self { location_id, date: date.into() }
    }
}

/// Query of the html menu page used by the scrape strategy.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    location_id: u32,
    store_ids: String,
    mode: String,
    period_id: u32,
    date: String,
}

impl PageQuery {
    pub fn new(location_id: u32, period_id: u32, date: impl Into<String>) -> Self {
        Self {
            location_id,
            period_id,
            date: date.into(),
            store_ids: String::new(),
            mode: "Daily".into(),
        }
    }
}

/// `Menu` is optional so that a body without it is reported as malformed
/// instead of a generic decode error.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiMenuResult {
    #[serde(rename = "Menu")]
    pub menu: Option<ApiMenu>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiMenu {
    #[serde(default)]
    pub menu_stations: Vec<ApiStation>,
    #[serde(default)]
    pub menu_products: Vec<ApiMenuProduct>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiStation {
    pub station_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiMenuProduct {
    pub station_id: String,
    pub product: ApiProduct,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiProduct {
    pub marketing_name: String,
    pub short_description: Option<String>,
    #[serde(default)]
    pub categories: Vec<ApiCategory>,
    /// `null` upstream when the item has no badges
    #[serde(default)]
    pub dietary_information: Option<Vec<ApiDietaryInfo>>,

    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
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
    #[serde(rename = "VitaminA")] pub vitamin_a: Option<String>,
    #[serde(rename = "VitaminC")] pub vitamin_c: Option<String>,
    pub calcium: Option<String>,
    pub iron: Option<String>,
    pub saturated_fat: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiCategory {
    pub display_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiDietaryInfo {
    pub icon_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiScheduleResult {
    #[serde(rename = "Result")]
    pub result: Option<Vec<ApiPeriod>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ApiPeriod {
    pub period_name: String,
    pub utc_meal_period_start_time: String,
    pub utc_meal_period_end_time: String,
}
