use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::{Collection, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionSource {
    Purchase,
    Issue,
    Return,
    Disposal,
    Faculty,
}

impl RejectionSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(Self::Purchase),
            "issue" => Some(Self::Issue),
            "return" => Some(Self::Return),
            "disposal" => Some(Self::Disposal),
            "faculty" => Some(Self::Faculty),
            _ => None,
        }
    }
}

/// Copy of a rejected submission, kept after the original is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedAsset {
    pub id: Uuid,
    pub source: RejectionSource,
    pub original_id: Uuid,
    pub original: Value,
    pub rejection_remarks: String,
    pub rejected_by: String,
    pub rejected_at: DateTime<Utc>,
}

impl Document for RejectedAsset {
    const COLLECTION: Collection = Collection::Rejected;

    fn id(&self) -> Uuid {
        self.id
    }
}
