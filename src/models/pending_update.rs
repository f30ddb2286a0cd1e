use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::Asset;
use crate::store::{Collection, Document};
use crate::types::ApprovalStatus;

/// Proposed edit of an approved purchase, held until an approver decides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub original_data: Asset,
    pub updated_data: Asset,
    pub status: ApprovalStatus,
    pub requested_by: String,
    pub reviewed_by: Option<String>,
    pub rejection_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for PendingUpdate {
    const COLLECTION: Collection = Collection::PendingUpdates;

    fn id(&self) -> Uuid {
        self.id
    }
}
