use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};
use crate::types::ItemKey;

/// Quantity and serial IDs currently held in the store for one item key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: ItemKey,
    pub in_stock: u32,
    #[serde(default)]
    pub item_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl StockEntry {
    pub fn empty(key: ItemKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            in_stock: 0,
            item_ids: vec![],
            updated_at: Utc::now(),
        }
    }
}

impl Document for StockEntry {
    const COLLECTION: Collection = Collection::Stock;

    fn id(&self) -> Uuid {
        self.id
    }
}
