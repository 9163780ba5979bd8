//! Turns upstream product records into ordered stations.

use std::collections::HashMap;

use crate::{
    processed::{Category, Item, MenuEntry, Nutrition, Station},
    raw,
};

/// Stations in display order. Anything not listed gets rank -1 and ends up
/// in front of every listed station.
pub const STATION_ORDER: &[&str] = &[
    "Home",
    "Oven",
    "Fire And Ice Round Grill",
    "Grubb / Mainline",
    "Compass",
    "Hearth/Pizza",
    "Deli",
    "The Farm Stand / Deli",
    "Crossroads",
    "Sizzle Grill",
    "Ember/Grill",
    "Vegan",
    "Bakery",
    "Honeycakes/Bakery",
    "Soups",
    "Farmer's Market",
    "The Farm Stand / Salad Bar",
];

pub fn station_rank(name: &str) -> i32 {
    match STATION_ORDER.iter().position(|v| *v == name) {
        Some(i) => i as i32,
        None => {
            tracing::debug!("station {name:?} has no rank");
            -1
        },
    }
}

/// upstream writes some station names as `X/ Y`
pub fn normalize_station_name(name: &str) -> String {
    name.replace("/ ", " / ")
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn has_badge(icons: &[raw::ApiDietaryInfo], badge: &str) -> bool {
    icons.iter().any(|v| v.icon_url.contains(badge))
}

impl From<&raw::ApiProduct> for Item {
    fn from(p: &raw::ApiProduct) -> Self {
        let icons = p.dietary_information.as_deref().unwrap_or_default();
        Item {
            name: p.marketing_name.clone(),
            description: p.short_description.clone().unwrap_or_default(),
            nutrition: Nutrition {
                is_vegan: p.is_vegan,
                is_vegetarian: p.is_vegetarian,
                serving_size: non_empty(&p.serving_size),
                serving_unit: non_empty(&p.serving_unit),
                calories: non_empty(&p.calories),
                calories_from_fat: non_empty(&p.calories_from_fat),
                total_fat: non_empty(&p.total_fat),
                trans_fat: non_empty(&p.trans_fat),
                cholesterol: non_empty(&p.cholesterol),
                sodium: non_empty(&p.sodium),
                total_carbohydrates: non_empty(&p.total_carbohydrates),
                dietary_fiber: non_empty(&p.dietary_fiber),
                sugars: non_empty(&p.sugars),
                protein: non_empty(&p.protein),
                vitamin_a: non_empty(&p.vitamin_a),
                vitamin_c: non_empty(&p.vitamin_c),
                calcium: non_empty(&p.calcium),
                iron: non_empty(&p.iron),
                saturated_fat: non_empty(&p.saturated_fat),
                is_eat_well: has_badge(icons, "EatWell"),
                is_plant_forward: has_badge(icons, "PlantForward"),
                is_whole_grain: has_badge(icons, "WholeGrain"),
            },
        }
    }
}

/// Flattens an api menu into entries, resolving station ids to names.
/// Products with an unknown station or without a category are skipped.
pub fn entries_from_api(menu: &raw::ApiMenu) -> Vec<MenuEntry> {
    let stations: HashMap<&str, &str> = menu.menu_stations.iter()
        .map(|v| (v.station_id.as_str(), v.name.as_str()))
        .collect();

    menu.menu_products.iter().filter_map(|entry| {
        let Some(station) = stations.get(entry.station_id.as_str()) else {
            tracing::warn!("product {:?} references unknown station {}",
                entry.product.marketing_name, entry.station_id);
            return None;
        };
        let Some(category) = entry.product.categories.first() else {
            tracing::warn!("product {:?} has no category", entry.product.marketing_name);
            return None;
        };

        Some(MenuEntry {
            station: normalize_station_name(station),
            category: category.display_name.clone(),
            item: Item::from(&entry.product),
        })
    }).collect()
}

/// Groups entries by station then category, keeping first-seen order for
/// both and upstream order for items, then sorts stations by rank.
pub fn group_stations(entries: impl IntoIterator<Item = MenuEntry>) -> Vec<Station> {
    let mut stations: Vec<Station> = Vec::new();

    for MenuEntry { station, category, item } in entries {
        let i = match stations.iter().position(|v| v.name == station) {
            Some(i) => i,
            None => {
                stations.push(Station { name: station, menu: Vec::new() });
                stations.len() - 1
            },
        };
        let station = &mut stations[i];

        match station.menu.iter_mut().find(|v| v.name == category) {
            Some(c) => c.items.push(item),
            None => station.menu.push(Category { name: category, items: vec![item] }),
        }
    }

    sort_stations(&mut stations, station_rank);
    stations
}

/// Ranks each station once. Stable, so equal ranks keep encounter order.
fn sort_stations(stations: &mut [Station], mut rank: impl FnMut(&str) -> i32) {
    stations.sort_by_cached_key(|v| rank(&v.name));
}
