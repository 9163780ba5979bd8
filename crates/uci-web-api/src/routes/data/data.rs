use serde::{Deserialize, Serialize};
use uci_meal_api::MenuDocument;

/// One cached document, stored under its cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedMenu {
    pub key: String,
    pub document: MenuDocument,
}
