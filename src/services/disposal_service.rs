use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    ensure_pending, record_rejection, require_text, trim_optional, Actor, ServiceContext,
    ServiceError, ServiceResult, StockLedger,
};
use crate::inventory;
use crate::models::{CreateDisposal, DisposalRequest, DisposalSource, RejectedAsset, RejectionSource};
use crate::store::{DocFilter, Repository};
use crate::types::ApprovalStatus;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisposalFilter {
    pub status: Option<ApprovalStatus>,
    pub source: Option<DisposalSource>,
    pub asset_category: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl DisposalFilter {
    fn to_doc_filter(&self) -> DocFilter {
        let source = self.source.map(|s| match s {
            DisposalSource::Store => "store",
            DisposalSource::Return => "return",
        });
        DocFilter::new()
            .eq_opt("status", self.status.map(|s| s.as_str()))
            .eq_opt("source", source)
            .eq_opt("asset_category", self.asset_category.clone())
            .paged(self.limit, self.offset)
    }
}

/// Condemnation of store stock and of items returned for disposal
#[derive(Clone)]
pub struct DisposalService {
    ctx: ServiceContext,
    disposals: Repository<DisposalRequest>,
    rejected: Repository<RejectedAsset>,
    ledger: StockLedger,
}

impl DisposalService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            disposals: ctx.repo(),
            rejected: ctx.repo(),
            ledger: StockLedger::new(&ctx),
            ctx,
        }
    }

    pub async fn request_disposal(&self, input: CreateDisposal, actor: &Actor) -> ServiceResult<DisposalRequest> {
        let key = input.key.normalized();
        require_text(&key.item_name, "Item name")?;
        let reason = require_text(&input.condemnation_reason, "Condemnation reason")?;
        let ids = inventory::normalize_ids(&input.item_ids)?;
        inventory::validate_movement_ids(key.asset_type, input.quantity, &ids)?;

        let _guard = self.ctx.lock.lock().await;
        let pool = self.ledger.availability(&key, None).await?;
        pool.check_take(input.quantity, &ids).map_err(|e| {
            debug!(key = %key, error = %e, "Disposal exceeds available stock");
            e
        })?;

        let now = Utc::now();
        let disposal = DisposalRequest {
            id: Uuid::new_v4(),
            key,
            quantity: input.quantity,
            item_ids: ids,
            source: DisposalSource::Store,
            return_id: None,
            purchase_value: input.purchase_value,
            book_value: input.book_value,
            inspection_date: input.inspection_date,
            condemnation_reason: reason,
            remarks: trim_optional(input.remarks),
            status: ApprovalStatus::Pending,
            requested_by: actor.name.clone(),
            reviewed_by: None,
            disposed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.disposals.insert(&disposal).await?;

        info!(disposal = %disposal.id, key = %disposal.key, user = %actor.name, "Disposal requested");
        Ok(disposal)
    }

    pub async fn approve_disposal(&self, id: Uuid, actor: &Actor) -> ServiceResult<DisposalRequest> {
        let _guard = self.ctx.lock.lock().await;
        let mut disposal = self.disposals.select_404(id).await?;
        ensure_pending(disposal.status, "Disposal", id)?;

        // Return-sourced items already left stock when the return was approved
        if disposal.source == DisposalSource::Store {
            let pool = self.ledger.availability(&disposal.key, Some(id)).await?;
            pool.check_take(disposal.quantity, &disposal.item_ids)?;
            self.ledger.debit(&disposal.key, disposal.quantity, &disposal.item_ids).await?;
        }

        let now = Utc::now();
        disposal.status = ApprovalStatus::Approved;
        disposal.reviewed_by = Some(actor.name.clone());
        disposal.disposed_at = Some(now);
        disposal.updated_at = now;
        self.disposals.replace(&disposal).await?;

        info!(disposal = %id, quantity = disposal.quantity, user = %actor.name, "Disposal approved");
        Ok(disposal)
    }

    pub async fn reject_disposal(&self, id: Uuid, remarks: &str, actor: &Actor) -> ServiceResult<RejectedAsset> {
        let _guard = self.ctx.lock.lock().await;
        let disposal = self.disposals.select_404(id).await?;
        ensure_pending(disposal.status, "Disposal", id)?;

        let record = record_rejection(&self.rejected, RejectionSource::Disposal, id, &disposal, remarks, actor).await?;
        if disposal.source == DisposalSource::Return {
            self.ledger.credit(&disposal.key, disposal.quantity, &disposal.item_ids).await?;
        }
        self.disposals.delete(id).await?;

        info!(disposal = %id, source = ?disposal.source, user = %actor.name, "Disposal rejected");
        Ok(record)
    }

    pub async fn get_disposal(&self, id: Uuid) -> ServiceResult<DisposalRequest> {
        Ok(self.disposals.select_404(id).await?)
    }

    pub async fn list_disposals(&self, filter: &DisposalFilter) -> ServiceResult<Vec<DisposalRequest>> {
        Ok(self.disposals.select_any(&filter.to_doc_filter()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryError;
    use crate::models::ReturnCondition;
    use crate::testing::{disposal_request, issue_request, laptop_key, return_request, TestServices};

    #[tokio::test]
    async fn store_disposal_debits_stock_on_approval() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2"]).await;

        let disposal = t.disposals.request_disposal(disposal_request(&["L2"]), &t.keeper).await.unwrap();
        assert_eq!(t.ledger.entry(&laptop_key()).await.unwrap().unwrap().in_stock, 2);

        let approved = t.disposals.approve_disposal(disposal.id, &t.manager).await.unwrap();
        assert!(approved.disposed_at.is_some());

        let stock = t.ledger.entry(&laptop_key()).await.unwrap().unwrap();
        assert_eq!(stock.in_stock, 1);
        assert_eq!(stock.item_ids, vec!["L1"]);
    }

    #[tokio::test]
    async fn pending_disposal_blocks_issue_of_same_ids() {
        let t = TestServices::new();
        t.stock_laptops(&["L1"]).await;
        t.disposals.request_disposal(disposal_request(&["L1"]), &t.keeper).await.unwrap();

        let res = t.issues.issue(issue_request(&["L1"], "Library"), &t.clerk).await;
        assert!(matches!(
            res,
            Err(ServiceError::Inventory(InventoryError::InsufficientQuantity { .. }))
        ));
    }

    #[tokio::test]
    async fn rejecting_return_disposal_restocks_items() {
        let t = TestServices::new();
        t.stock_laptops(&["L1"]).await;
        t.issue_to("Lab", &["L1"]).await;
        let ret = t
            .returns
            .request_return(return_request("Lab", &["L1"], ReturnCondition::ToBeDisposed), &t.clerk)
            .await
            .unwrap();
        t.returns.approve_return(ret.id, &t.manager).await.unwrap();

        let pending = t.disposals.list_disposals(&DisposalFilter::default()).await.unwrap();
        t.disposals
            .reject_disposal(pending[0].id, "Repairable", &t.manager)
            .await
            .unwrap();

        let stock = t.ledger.entry(&laptop_key()).await.unwrap().unwrap();
        assert_eq!(stock.item_ids, vec!["L1"]);
        assert!(t.disposals.list_disposals(&DisposalFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_lists_only_approved() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2"]).await;
        let first = t.disposals.request_disposal(disposal_request(&["L1"]), &t.keeper).await.unwrap();
        t.disposals.request_disposal(disposal_request(&["L2"]), &t.keeper).await.unwrap();
        t.disposals.approve_disposal(first.id, &t.manager).await.unwrap();

        let register = DisposalFilter { status: Some(ApprovalStatus::Approved), ..Default::default() };
        let listed = t.disposals.list_disposals(&register).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].item_ids, vec!["L1"]);
    }
}
