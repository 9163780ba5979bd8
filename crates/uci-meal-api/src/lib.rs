//! Menus, schedules and themed events for the UCI dining halls, normalized
//! into one stable document per location, date and meal.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod location;
pub mod meal;
pub mod normalize;
pub mod processed;
pub mod raw;
pub mod resolver;
pub mod time;
pub mod week;

pub use cache::{CacheKey, MemoryCache, MenuCache};
pub use fetch::{ApiSource, FetchError, MenuSource, ScrapeSource, Upstream};
pub use location::{Location, LOCATIONS};
pub use meal::MealPeriod;
pub use processed::{Category, Event, Item, MenuDocument, MenuEntry, Nutrition, Schedule, ServiceWindow, Station};
pub use resolver::{MenuResolver, ResolveError};
pub use time::CampusClock;
