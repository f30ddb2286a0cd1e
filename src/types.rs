/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval state carried by every workflow document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Only `pending -> approved | rejected` is a legal transition.
    pub fn can_transition_to(&self, next: ApprovalStatus) -> bool {
        matches!(
            (self, next),
            (ApprovalStatus::Pending, ApprovalStatus::Approved)
                | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
        )
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permanent assets are tracked per serial ID, consumables by quantity only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Permanent,
    Consumable,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Permanent => "Permanent",
            AssetType::Consumable => "Consumable",
        }
    }

    pub fn tracks_ids(&self) -> bool {
        matches!(self, AssetType::Permanent)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one stock line in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub asset_type: AssetType,
    pub asset_category: String,
    pub item_name: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub item_description: Option<String>,
}

impl ItemKey {
    pub fn new(
        asset_type: AssetType,
        asset_category: impl Into<String>,
        item_name: impl Into<String>,
        sub_category: Option<String>,
        item_description: Option<String>,
    ) -> Self {
        Self {
            asset_type,
            asset_category: asset_category.into().trim().to_string(),
            item_name: item_name.into().trim().to_string(),
            sub_category: normalize_optional(sub_category),
            item_description: normalize_optional(item_description),
        }
    }

    /// Re-apply trimming after deserializing from a request body
    pub fn normalized(self) -> Self {
        Self::new(
            self.asset_type,
            self.asset_category,
            self.item_name,
            self.sub_category,
            self.item_description,
        )
    }

    /// Equality filter pairs used to look the line up in a store
    pub fn filter_fields(&self) -> Vec<(String, serde_json::Value)> {
        vec![
            ("asset_type".to_string(), serde_json::json!(self.asset_type)),
            ("asset_category".to_string(), serde_json::json!(self.asset_category)),
            ("item_name".to_string(), serde_json::json!(self.item_name)),
            ("sub_category".to_string(), serde_json::json!(self.sub_category)),
            ("item_description".to_string(), serde_json::json!(self.item_description)),
        ]
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.asset_type, self.asset_category, self.item_name)?;
        if let Some(sub) = &self.sub_category {
            write!(f, "/{}", sub)?;
        }
        Ok(())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_documents_transition() {
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Approved));
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Rejected));
        assert!(!ApprovalStatus::Approved.can_transition_to(ApprovalStatus::Rejected));
        assert!(!ApprovalStatus::Rejected.can_transition_to(ApprovalStatus::Approved));
    }

    #[test]
    fn item_key_trims_and_drops_blank_parts() {
        let key = ItemKey::new(
            AssetType::Permanent,
            " IT ",
            "Laptop ",
            Some("   ".to_string()),
            Some(" 14 inch ".to_string()),
        );
        assert_eq!(key.asset_category, "IT");
        assert_eq!(key.item_name, "Laptop");
        assert_eq!(key.sub_category, None);
        assert_eq!(key.item_description.as_deref(), Some("14 inch"));
    }
}
