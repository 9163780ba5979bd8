use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{location::Location, meal::MealPeriod, processed::MenuDocument};

/// `{location}/{MM|DD|YYYY}/{meal code}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(location: &Location, date: &str, meal: MealPeriod) -> Self {
        Self(format!("{}/{}/{}", location.key, date.replace('/', "|"), meal.code()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat key to document store.
///
/// Concurrent requests for the same cold key may both compute and both
/// store; the last write wins. Entries are never invalidated here.
/// Implementations log their own failures and report them as a miss.
#[async_trait]
pub trait MenuCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<MenuDocument>;
    async fn set(&self, key: &CacheKey, document: &MenuDocument);
}

/// two locations, four meals, a bit over two months of days
pub const DEFAULT_MEMORY_CAPACITY: usize = 512;

/// In-process store holding at most `capacity` documents.
///
/// Once full, the oldest inserted key is dropped to make room. Anything
/// that must outlive that belongs in a persistent layer behind this one.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    data: Arc<RwLock<Entries>>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Entries {
    docs: HashMap<CacheKey, MenuDocument>,
    order: VecDeque<CacheKey>,
}

impl Default for MemoryCache {
    fn default() -> Self { Self::with_capacity(DEFAULT_MEMORY_CAPACITY) }
}

impl MemoryCache {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize { self.capacity }

    pub async fn len(&self) -> usize {
        self.data.read().await.docs.len()
    }
}

#[async_trait]
impl MenuCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<MenuDocument> {
        self.data.read().await.docs.get(key).cloned()
    }

    async fn set(&self, key: &CacheKey, document: &MenuDocument) {
        let mut data = self.data.write().await;
        if data.docs.insert(key.clone(), document.clone()).is_none() {
            data.order.push_back(key.clone());
        }

        while data.docs.len() > self.capacity {
            let Some(oldest) = data.order.pop_front() else { break };
            data.docs.remove(&oldest);
            tracing::debug!("evicted {oldest} from memory cache");
        }
    }
}
