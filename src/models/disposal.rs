use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};
use crate::types::{ApprovalStatus, ItemKey};

/// Where the condemned items are taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposalSource {
    /// Still counted in store stock until approval
    Store,
    /// Already out of stock, came back in a return marked for disposal
    Return,
}

/// Condemnation request; approved ones form the disposal register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposalRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: ItemKey,
    pub quantity: u32,
    #[serde(default)]
    pub item_ids: Vec<String>,
    pub source: DisposalSource,
    pub return_id: Option<Uuid>,
    pub purchase_value: Option<Decimal>,
    pub book_value: Option<Decimal>,
    pub inspection_date: Option<NaiveDate>,
    pub condemnation_reason: String,
    pub remarks: Option<String>,
    pub status: ApprovalStatus,
    pub requested_by: String,
    pub reviewed_by: Option<String>,
    pub disposed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for DisposalRequest {
    const COLLECTION: Collection = Collection::Disposals;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDisposal {
    #[serde(flatten)]
    pub key: ItemKey,
    pub quantity: u32,
    #[serde(default)]
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub purchase_value: Option<Decimal>,
    #[serde(default)]
    pub book_value: Option<Decimal>,
    #[serde(default)]
    pub inspection_date: Option<NaiveDate>,
    pub condemnation_reason: String,
    #[serde(default)]
    pub remarks: Option<String>,
}
