use async_trait::async_trait;
use mongodb::{bson::doc, options::ReplaceOptions, Collection};
use uci_meal_api::{CacheKey, MemoryCache, MenuCache, MenuDocument};

mod data;
use data::*;

/// Menu cache backed by memory and, when configured, the database.
///
/// Reads check memory first and promote database hits into memory. Writes
/// land in memory immediately; the database write runs in the background.
#[derive(Clone, Default)]
pub struct MenuStore {
    memory: MemoryCache,
    collections: Option<MenuCollections>,
}

impl MenuStore {
    pub fn new(collections: Option<MenuCollections>, memory_capacity: usize) -> Self {
        Self { memory: MemoryCache::with_capacity(memory_capacity), collections }
    }
}

#[async_trait]
impl MenuCache for MenuStore {
    async fn get(&self, key: &CacheKey) -> Option<MenuDocument> {
        if let Some(doc) = self.memory.get(key).await {
            return Some(doc);
        }

        let collections = self.collections.as_ref()?;
        match collections.get_menu(key).await {
            Ok(Some(doc)) => {
                self.memory.set(key, &doc).await;
                Some(doc)
            },
            Ok(None) => None,
            Err(err) => {
                tracing::error!("could not read {key} from db: {err}");
                None
            },
        }
    }

    async fn set(&self, key: &CacheKey, document: &MenuDocument) {
        self.memory.set(key, document).await;

        if let Some(collections) = self.collections.clone() {
            let (key, document) = (key.clone(), document.clone());
            tokio::spawn(async move {
                if let Err(err) = collections.store_menu(&key, document).await {
                    tracing::error!("could not store {key}: {err}");
                }
            });
        }
    }
}

#[derive(Clone)]
pub struct MenuCollections {
    menus: Collection<CachedMenu>,
}

impl MenuCollections {
    pub fn new(db: &mongodb::Database, collection: &str) -> Self {
        Self { menus: db.collection(collection) }
    }

    async fn get_menu(
        &self, key: &CacheKey,
    ) -> mongodb::error::Result<Option<MenuDocument>> {
        Ok(self.menus.find_one(doc! {
            "key": key.as_str(),
        }, None).await?.map(|v| v.document))
    }

    async fn store_menu(
        &self, key: &CacheKey, document: MenuDocument,
    ) -> mongodb::error::Result<()> {
        self.menus.replace_one(doc! {
            "key": key.as_str(),
        }, CachedMenu {
            key: key.to_string(),
            document,
        }, ReplaceOptions::builder()
            .upsert(true)
        .build()).await?;

        Ok(())
    }
}
