use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};
use crate::types::{ApprovalStatus, ItemKey};

/// Issue waiting for receipt acknowledgement and approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempIssue {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: ItemKey,
    pub location: String,
    pub issued_to: Option<String>,
    pub purpose: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub issued_ids: Vec<String>,
    pub acknowledged: bool,
    pub receipt_url: Option<String>,
    pub status: ApprovalStatus,
    pub requested_by: String,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for TempIssue {
    const COLLECTION: Collection = Collection::TempIssues;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// What a location currently holds of one item key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: ItemKey,
    pub location: String,
    pub quantity: u32,
    #[serde(default)]
    pub issued_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Document for IssuedRecord {
    const COLLECTION: Collection = Collection::Issued;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssue {
    #[serde(flatten)]
    pub key: ItemKey,
    pub location: String,
    #[serde(default)]
    pub issued_to: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub issued_ids: Vec<String>,
}
