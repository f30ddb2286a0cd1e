use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};
use crate::types::{ApprovalStatus, AssetType, ItemKey};

/// One line of a purchase bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub item_name: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub item_description: Option<String>,
    pub quantity_received: u32,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub total_price: Decimal,
    /// Serial IDs, permanent assets only
    #[serde(default)]
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub amc_date: Option<NaiveDate>,
}

impl PurchaseItem {
    pub fn computed_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity_received)
    }
}

/// Purchase record entered from a supplier bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub asset_type: AssetType,
    pub asset_category: String,
    pub entry_date: NaiveDate,
    pub purchase_date: Option<NaiveDate>,
    pub supplier_name: String,
    pub supplier_address: Option<String>,
    pub source: Option<String>,
    pub mode_of_purchase: Option<String>,
    pub bill_no: Option<String>,
    pub received_by: Option<String>,
    pub bill_photo_url: Option<String>,
    pub items: Vec<PurchaseItem>,
    pub status: ApprovalStatus,
    pub entered_by: String,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn item_key(&self, item: &PurchaseItem) -> ItemKey {
        ItemKey::new(
            self.asset_type,
            self.asset_category.clone(),
            item.item_name.clone(),
            item.sub_category.clone(),
            item.item_description.clone(),
        )
    }

    pub fn total_cost(&self) -> Decimal {
        self.items.iter().map(|i| i.total_price).sum()
    }

    pub fn all_item_ids(&self) -> Vec<String> {
        self.items.iter().flat_map(|i| i.item_ids.iter().cloned()).collect()
    }
}

impl Document for Asset {
    const COLLECTION: Collection = Collection::Purchases;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Request body for `POST /api/assets/store` and for proposed updates
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchase {
    pub asset_type: AssetType,
    pub asset_category: String,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_address: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub mode_of_purchase: Option<String>,
    #[serde(default)]
    pub bill_no: Option<String>,
    #[serde(default)]
    pub received_by: Option<String>,
    #[serde(default)]
    pub bill_photo_url: Option<String>,
    pub items: Vec<PurchaseItem>,
}
