use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    ensure_pending, record_rejection, require_text, trim_optional, Actor, ServiceContext,
    ServiceError, ServiceResult, StockLedger,
};
use crate::inventory::{self, InventoryError};
use crate::models::{Asset, CreatePurchase, PurchaseItem, RejectedAsset, RejectionSource};
use crate::store::{DocFilter, Repository};
use crate::types::{ApprovalStatus, AssetType};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseFilter {
    pub status: Option<ApprovalStatus>,
    pub asset_type: Option<AssetType>,
    pub asset_category: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PurchaseFilter {
    fn to_doc_filter(&self) -> DocFilter {
        DocFilter::new()
            .eq_opt("status", self.status.map(|s| s.as_str()))
            .eq_opt("asset_type", self.asset_type.map(|t| t.as_str()))
            .eq_opt("asset_category", self.asset_category.clone())
            .paged(self.limit, self.offset)
    }
}

/// Purchase entry and its approval into store stock
#[derive(Clone)]
pub struct PurchaseService {
    ctx: ServiceContext,
    purchases: Repository<Asset>,
    rejected: Repository<RejectedAsset>,
    ledger: StockLedger,
}

impl PurchaseService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            purchases: ctx.repo(),
            rejected: ctx.repo(),
            ledger: StockLedger::new(&ctx),
            ctx,
        }
    }

    pub async fn store_purchase(&self, input: CreatePurchase, actor: &Actor) -> ServiceResult<Asset> {
        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4(),
            asset_type: input.asset_type,
            asset_category: require_text(&input.asset_category, "Asset category")?,
            entry_date: input.entry_date.unwrap_or_else(|| now.date_naive()),
            purchase_date: input.purchase_date,
            supplier_name: require_text(&input.supplier_name, "Supplier name")?,
            supplier_address: trim_optional(input.supplier_address),
            source: trim_optional(input.source),
            mode_of_purchase: trim_optional(input.mode_of_purchase),
            bill_no: trim_optional(input.bill_no),
            received_by: trim_optional(input.received_by),
            bill_photo_url: trim_optional(input.bill_photo_url),
            items: build_items(input.asset_type, input.items)?,
            status: ApprovalStatus::Pending,
            entered_by: actor.name.clone(),
            approved_by: None,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.ctx.lock.lock().await;
        self.ledger.ensure_unrecorded(&asset.all_item_ids(), None).await?;
        self.purchases.insert(&asset).await?;

        info!(purchase = %asset.id, user = %actor.name, items = asset.items.len(), "Purchase stored for approval");
        Ok(asset)
    }

    pub async fn approve_purchase(&self, id: Uuid, actor: &Actor) -> ServiceResult<Asset> {
        let _guard = self.ctx.lock.lock().await;
        let mut asset = self.purchases.select_404(id).await?;
        ensure_pending(asset.status, "Purchase", id)?;

        // IDs may have been taken by another purchase approved in the meantime
        self.ledger.ensure_unrecorded(&asset.all_item_ids(), Some(id)).await?;

        for item in &asset.items {
            let key = asset.item_key(item);
            self.ledger.credit(&key, item.quantity_received, &item.item_ids).await?;
        }

        asset.status = ApprovalStatus::Approved;
        asset.approved_by = Some(actor.name.clone());
        asset.updated_at = Utc::now();
        self.purchases.replace(&asset).await?;

        info!(purchase = %id, user = %actor.name, "Purchase approved into stock");
        Ok(asset)
    }

    pub async fn reject_purchase(&self, id: Uuid, remarks: &str, actor: &Actor) -> ServiceResult<RejectedAsset> {
        let _guard = self.ctx.lock.lock().await;
        let asset = self.purchases.select_404(id).await?;
        ensure_pending(asset.status, "Purchase", id)?;

        let record = record_rejection(&self.rejected, RejectionSource::Purchase, id, &asset, remarks, actor).await?;
        self.purchases.delete(id).await?;

        info!(purchase = %id, user = %actor.name, "Purchase rejected");
        Ok(record)
    }

    pub async fn get_purchase(&self, id: Uuid) -> ServiceResult<Asset> {
        Ok(self.purchases.select_404(id).await?)
    }

    pub async fn list_purchases(&self, filter: &PurchaseFilter) -> ServiceResult<Vec<Asset>> {
        Ok(self.purchases.select_any(&filter.to_doc_filter()).await?)
    }
}

/// Validate and normalise the lines of a purchase bill
pub(crate) fn build_items(asset_type: AssetType, items: Vec<PurchaseItem>) -> ServiceResult<Vec<PurchaseItem>> {
    if items.is_empty() {
        return Err(ServiceError::Validation("A purchase needs at least one item".to_string()));
    }

    let mut built = Vec::with_capacity(items.len());
    for item in items {
        let item_name = require_text(&item.item_name, "Item name")?;
        let item_ids = inventory::normalize_ids(&item.item_ids)?;
        inventory::validate_declared_ids(asset_type, item.quantity_received, &item_ids).map_err(|e| {
            debug!(item = %item_name, error = %e, "Rejected purchase line");
            e
        })?;
        if item.unit_price.is_sign_negative() {
            return Err(ServiceError::Validation(format!("Unit price of {} cannot be negative", item_name)));
        }

        let mut line = PurchaseItem {
            item_name,
            sub_category: trim_optional(item.sub_category),
            item_description: trim_optional(item.item_description),
            item_ids,
            ..item
        };
        line.total_price = line.computed_total();
        built.push(line);
    }

    let all_ids: Vec<String> = built.iter().flat_map(|i| i.item_ids.iter().cloned()).collect();
    let dups = inventory::find_duplicates(&all_ids);
    if !dups.is_empty() {
        return Err(InventoryError::DuplicateIds(dups).into());
    }

    Ok(built)
}
