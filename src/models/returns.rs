use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};
use crate::types::{ApprovalStatus, ItemKey};

/// Condition recorded when items come back from a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCondition {
    Good,
    ToBeServiced,
    ToBeDisposed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: ItemKey,
    pub location: String,
    pub quantity: u32,
    #[serde(default)]
    pub returned_ids: Vec<String>,
    pub condition: ReturnCondition,
    pub remark: Option<String>,
    pub status: ApprovalStatus,
    pub requested_by: String,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for ReturnRequest {
    const COLLECTION: Collection = Collection::Returns;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReturn {
    #[serde(flatten)]
    pub key: ItemKey,
    pub location: String,
    pub quantity: u32,
    #[serde(default)]
    pub returned_ids: Vec<String>,
    pub condition: ReturnCondition,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    InService,
    Completed,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::InService => "in_service",
            ServiceStatus::Completed => "completed",
        }
    }
}

/// Items sent for servicing after a return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub key: ItemKey,
    pub quantity: u32,
    #[serde(default)]
    pub item_ids: Vec<String>,
    pub returned_from: String,
    pub return_id: Uuid,
    pub service_status: ServiceStatus,
    pub service_notes: Option<String>,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Document for ServiceRecord {
    const COLLECTION: Collection = Collection::Services;

    fn id(&self) -> Uuid {
        self.id
    }
}
