pub mod disposal_service;
pub mod faculty_service;
pub mod issue_service;
pub mod purchase_service;
pub mod report_service;
pub mod return_service;
pub mod stock;
pub mod update_service;
pub mod user_service;

pub use disposal_service::DisposalService;
pub use faculty_service::FacultyService;
pub use issue_service::IssueService;
pub use purchase_service::PurchaseService;
pub use report_service::ReportService;
pub use return_service::ReturnService;
pub use stock::StockLedger;
pub use update_service::UpdateService;
pub use user_service::UserService;

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::roles::Role;
use crate::config::WorkflowConfig;
use crate::inventory::InventoryError;
use crate::models::{RejectedAsset, RejectionSource};
use crate::store::{DocFilter, DocumentStore, Repository, StoreError};
use crate::types::{ApprovalStatus, ItemKey};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(StoreError),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                ServiceError::NotFound(format!("No {} record with id {}", collection, id))
            }
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The staff member performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            name: name.into(),
            role,
        }
    }

    /// Used by the CLI for loads that bypass the HTTP layer
    pub fn system() -> Self {
        Self::new(Uuid::nil(), "system", Role::Admin)
    }
}

/// Shared handles every service is built from
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn DocumentStore>,
    pub workflow: WorkflowConfig,
    /// Serialises read-validate-write sequences that touch stock within this process
    pub lock: Arc<Mutex<()>>,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn DocumentStore>, workflow: WorkflowConfig) -> Self {
        Self {
            store,
            workflow,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn repo<T: crate::store::Document>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}

pub(crate) fn key_filter(key: &ItemKey) -> DocFilter {
    DocFilter {
        equals: key.filter_fields(),
        ..Default::default()
    }
}

pub(crate) fn ensure_pending(status: ApprovalStatus, what: &str, id: Uuid) -> ServiceResult<()> {
    if status.can_transition_to(ApprovalStatus::Approved) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "{} {} is already {}",
            what, id, status
        )))
    }
}

pub(crate) fn require_text(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::Validation(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn trim_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Keep a copy of a rejected submission before the original is removed
pub(crate) async fn record_rejection<T: Serialize + Sync>(
    rejected: &Repository<RejectedAsset>,
    source: RejectionSource,
    original_id: Uuid,
    original: &T,
    remarks: &str,
    actor: &Actor,
) -> ServiceResult<RejectedAsset> {
    let remarks = require_text(remarks, "Rejection remarks")?;
    let record = RejectedAsset {
        id: Uuid::new_v4(),
        source,
        original_id,
        original: serde_json::to_value(original).map_err(StoreError::from)?,
        rejection_remarks: remarks,
        rejected_by: actor.name.clone(),
        rejected_at: Utc::now(),
    };
    rejected.insert(&record).await?;
    Ok(record)
}
