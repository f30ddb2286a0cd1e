use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    ensure_pending, key_filter, record_rejection, require_text, trim_optional, Actor,
    ServiceContext, ServiceError, ServiceResult, StockLedger,
};
use crate::inventory;
use crate::models::{CreateIssue, IssuedRecord, RejectedAsset, RejectionSource, TempIssue};
use crate::store::{DocFilter, Repository};
use crate::types::{ApprovalStatus, ItemKey};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    pub status: Option<ApprovalStatus>,
    pub location: Option<String>,
    pub asset_category: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl IssueFilter {
    fn to_doc_filter(&self) -> DocFilter {
        DocFilter::new()
            .eq_opt("status", self.status.map(|s| s.as_str()))
            .eq_opt("location", self.location.clone())
            .eq_opt("asset_category", self.asset_category.clone())
            .paged(self.limit, self.offset)
    }
}

/// What can still be issued from one stock line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableIds {
    pub in_stock: u32,
    pub available_quantity: u32,
    pub available_ids: Vec<String>,
}

/// Store-to-location issues: request, receipt acknowledgement, approval
#[derive(Clone)]
pub struct IssueService {
    ctx: ServiceContext,
    issues: Repository<TempIssue>,
    issued: Repository<IssuedRecord>,
    rejected: Repository<RejectedAsset>,
    ledger: StockLedger,
}

impl IssueService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            issues: ctx.repo(),
            issued: ctx.repo(),
            rejected: ctx.repo(),
            ledger: StockLedger::new(&ctx),
            ctx,
        }
    }

    pub async fn issue(&self, input: CreateIssue, actor: &Actor) -> ServiceResult<TempIssue> {
        let key = input.key.normalized();
        require_text(&key.item_name, "Item name")?;
        let location = require_text(&input.location, "Location")?;
        let ids = inventory::normalize_ids(&input.issued_ids)?;
        inventory::validate_movement_ids(key.asset_type, input.quantity, &ids)?;

        let _guard = self.ctx.lock.lock().await;
        let pool = self.ledger.availability(&key, None).await?;
        pool.check_take(input.quantity, &ids).map_err(|e| {
            debug!(key = %key, error = %e, "Issue request exceeds available stock");
            e
        })?;

        let now = Utc::now();
        let issue = TempIssue {
            id: Uuid::new_v4(),
            key,
            location,
            issued_to: trim_optional(input.issued_to),
            purpose: trim_optional(input.purpose),
            quantity: input.quantity,
            issued_ids: ids,
            acknowledged: false,
            receipt_url: None,
            status: ApprovalStatus::Pending,
            requested_by: actor.name.clone(),
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.issues.insert(&issue).await?;

        info!(issue = %issue.id, key = %issue.key, location = %issue.location, user = %actor.name, "Issue requested");
        Ok(issue)
    }

    pub async fn acknowledge_issue(
        &self,
        id: Uuid,
        receipt_url: Option<String>,
        actor: &Actor,
    ) -> ServiceResult<TempIssue> {
        let _guard = self.ctx.lock.lock().await;
        let mut issue = self.issues.select_404(id).await?;
        ensure_pending(issue.status, "Issue", id)?;

        issue.acknowledged = true;
        issue.receipt_url = trim_optional(receipt_url).or(issue.receipt_url);
        issue.updated_at = Utc::now();
        self.issues.replace(&issue).await?;

        info!(issue = %id, user = %actor.name, "Issue receipt acknowledged");
        Ok(issue)
    }

    pub async fn approve_issue(&self, id: Uuid, actor: &Actor) -> ServiceResult<TempIssue> {
        let _guard = self.ctx.lock.lock().await;
        let mut issue = self.issues.select_404(id).await?;
        ensure_pending(issue.status, "Issue", id)?;

        if self.ctx.workflow.require_issue_acknowledgement && !issue.acknowledged {
            return Err(ServiceError::InvalidState(format!(
                "Issue {} has not been acknowledged by the receiving location",
                id
            )));
        }

        let pool = self.ledger.availability(&issue.key, Some(id)).await?;
        pool.check_take(issue.quantity, &issue.issued_ids)?;
        self.ledger.debit(&issue.key, issue.quantity, &issue.issued_ids).await?;
        self.add_to_holding(&issue).await?;

        issue.status = ApprovalStatus::Approved;
        issue.reviewed_by = Some(actor.name.clone());
        issue.updated_at = Utc::now();
        self.issues.replace(&issue).await?;

        info!(issue = %id, location = %issue.location, quantity = issue.quantity, user = %actor.name, "Issue approved");
        Ok(issue)
    }

    pub async fn reject_issue(&self, id: Uuid, remarks: &str, actor: &Actor) -> ServiceResult<RejectedAsset> {
        let _guard = self.ctx.lock.lock().await;
        let issue = self.issues.select_404(id).await?;
        ensure_pending(issue.status, "Issue", id)?;

        let record = record_rejection(&self.rejected, RejectionSource::Issue, id, &issue, remarks, actor).await?;
        self.issues.delete(id).await?;

        info!(issue = %id, user = %actor.name, "Issue rejected");
        Ok(record)
    }

    pub async fn list_issues(&self, filter: &IssueFilter) -> ServiceResult<Vec<TempIssue>> {
        Ok(self.issues.select_any(&filter.to_doc_filter()).await?)
    }

    /// Current holdings per location
    pub async fn list_issued(&self, filter: &IssueFilter) -> ServiceResult<Vec<IssuedRecord>> {
        let filter = DocFilter::new()
            .eq_opt("location", filter.location.clone())
            .eq_opt("asset_category", filter.asset_category.clone())
            .paged(filter.limit, filter.offset);
        Ok(self.issued.select_any(&filter).await?)
    }

    pub async fn available_ids(&self, key: ItemKey) -> ServiceResult<AvailableIds> {
        let key = key.normalized();
        let pool = self.ledger.availability(&key, None).await?;
        Ok(AvailableIds {
            in_stock: pool.total,
            available_quantity: pool.available_quantity(),
            available_ids: pool.available_ids(),
        })
    }

    async fn add_to_holding(&self, issue: &TempIssue) -> ServiceResult<()> {
        let filter = key_filter(&issue.key).eq("location", issue.location.clone());
        match self.issued.select_first(&filter).await? {
            Some(mut holding) => {
                holding.quantity = holding.quantity.saturating_add(issue.quantity);
                holding.issued_ids = inventory::merge(&holding.issued_ids, &issue.issued_ids);
                holding.updated_at = Utc::now();
                self.issued.replace(&holding).await?;
            }
            None => {
                let holding = IssuedRecord {
                    id: Uuid::new_v4(),
                    key: issue.key.clone(),
                    location: issue.location.clone(),
                    quantity: issue.quantity,
                    issued_ids: issue.issued_ids.clone(),
                    updated_at: Utc::now(),
                };
                self.issued.insert(&holding).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryError;
    use crate::config::WorkflowConfig;
    use crate::testing::{issue_request, laptop_key, TestServices};

    #[tokio::test]
    async fn issue_exceeding_stock_is_refused() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2"]).await;

        let res = t.issues.issue(issue_request(&["L1", "L2", "L3"], "Library"), &t.clerk).await;
        assert!(matches!(
            res,
            Err(ServiceError::Inventory(InventoryError::InsufficientQuantity { requested: 3, available: 2 }))
        ));
    }

    #[tokio::test]
    async fn pending_issue_reserves_its_ids() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2", "L3"]).await;

        t.issues.issue(issue_request(&["L1"], "Library"), &t.clerk).await.unwrap();
        let again = t.issues.issue(issue_request(&["L1"], "Hostel"), &t.clerk).await;
        assert!(matches!(
            again,
            Err(ServiceError::Inventory(InventoryError::AlreadyReserved(_)))
        ));

        let available = t.issues.available_ids(laptop_key()).await.unwrap();
        assert_eq!(available.in_stock, 3);
        assert_eq!(available.available_quantity, 2);
        assert_eq!(available.available_ids, vec!["L2", "L3"]);
    }

    #[tokio::test]
    async fn approval_requires_acknowledgement() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2"]).await;
        let issue = t.issues.issue(issue_request(&["L1"], "Library"), &t.clerk).await.unwrap();

        let res = t.issues.approve_issue(issue.id, &t.manager).await;
        assert!(matches!(res, Err(ServiceError::InvalidState(_))));

        t.issues
            .acknowledge_issue(issue.id, Some("https://files.local/receipt-1.pdf".into()), &t.clerk)
            .await
            .unwrap();
        let approved = t.issues.approve_issue(issue.id, &t.manager).await.unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert_eq!(approved.receipt_url.as_deref(), Some("https://files.local/receipt-1.pdf"));
    }

    #[tokio::test]
    async fn approved_issues_accumulate_in_one_holding() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2", "L3"]).await;

        t.issue_to("Library", &["L1"]).await;
        t.issue_to("Library", &["L3"]).await;

        let filter = IssueFilter { location: Some("Library".into()), ..Default::default() };
        let held = t.issues.list_issued(&filter).await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].quantity, 2);
        assert_eq!(held[0].issued_ids, vec!["L1", "L3"]);

        let stock = t.ledger.entry(&laptop_key()).await.unwrap().unwrap();
        assert_eq!(stock.in_stock, 1);
        assert_eq!(stock.item_ids, vec!["L2"]);
    }

    #[tokio::test]
    async fn rejected_issue_releases_its_reservation() {
        let t = TestServices::new();
        t.stock_laptops(&["L1"]).await;
        let issue = t.issues.issue(issue_request(&["L1"], "Library"), &t.clerk).await.unwrap();

        t.issues.reject_issue(issue.id, "Wrong location", &t.manager).await.unwrap();

        assert!(t.issues.list_issues(&IssueFilter::default()).await.unwrap().is_empty());
        assert_eq!(t.issues.available_ids(laptop_key()).await.unwrap().available_quantity, 1);
    }

    #[tokio::test]
    async fn acknowledgement_can_be_switched_off() {
        let t = TestServices::with_workflow(WorkflowConfig { require_issue_acknowledgement: false });
        t.stock_laptops(&["L1", "L2"]).await;
        let issue = t.issues.issue(issue_request(&["L2"], "Library"), &t.clerk).await.unwrap();

        let approved = t.issues.approve_issue(issue.id, &t.manager).await.unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert!(!approved.acknowledged);

        let stock = t.ledger.entry(&laptop_key()).await.unwrap().unwrap();
        assert_eq!(stock.item_ids, vec!["L1"]);
    }
}
