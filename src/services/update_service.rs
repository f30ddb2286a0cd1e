use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::purchase_service::build_items;
use super::{
    ensure_pending, require_text, trim_optional, Actor, ServiceContext, ServiceError,
    ServiceResult, StockLedger,
};
use crate::inventory::{self, LineDelta};
use crate::models::{Asset, CreatePurchase, PendingUpdate};
use crate::store::{DocFilter, Repository};
use crate::types::{ApprovalStatus, ItemKey};

/// Body of `POST /api/assets/update`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub asset_id: Uuid,
    pub updated_data: CreatePurchase,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFilter {
    pub status: Option<ApprovalStatus>,
    pub asset_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Edits of approved purchases, applied to stock only once approved
#[derive(Clone)]
pub struct UpdateService {
    ctx: ServiceContext,
    updates: Repository<PendingUpdate>,
    purchases: Repository<Asset>,
    ledger: StockLedger,
}

impl UpdateService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            updates: ctx.repo(),
            purchases: ctx.repo(),
            ledger: StockLedger::new(&ctx),
            ctx,
        }
    }

    pub async fn request_update(&self, request: UpdateRequest, actor: &Actor) -> ServiceResult<PendingUpdate> {
        let _guard = self.ctx.lock.lock().await;
        let original = self.purchases.select_404(request.asset_id).await?;
        if original.status != ApprovalStatus::Approved {
            return Err(ServiceError::InvalidState(format!(
                "Purchase {} is {}; only approved purchases can be updated",
                original.id, original.status
            )));
        }

        let pending = DocFilter::new()
            .eq("asset_id", original.id.to_string())
            .eq("status", ApprovalStatus::Pending.as_str());
        if self.updates.count(&pending).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Purchase {} already has an update awaiting approval",
                original.id
            )));
        }

        let updated = apply_changes(&original, request.updated_data)?;

        let added: Vec<String> = inventory::subtract(&updated.all_item_ids(), &original.all_item_ids());
        self.ledger.ensure_unrecorded(&added, None).await?;

        let now = Utc::now();
        let update = PendingUpdate {
            id: Uuid::new_v4(),
            asset_id: original.id,
            original_data: original,
            updated_data: updated,
            status: ApprovalStatus::Pending,
            requested_by: actor.name.clone(),
            reviewed_by: None,
            rejection_remarks: None,
            created_at: now,
            updated_at: now,
        };
        self.updates.insert(&update).await?;

        info!(update = %update.id, purchase = %update.asset_id, user = %actor.name, "Purchase update requested");
        Ok(update)
    }

    pub async fn approve_update(&self, id: Uuid, actor: &Actor) -> ServiceResult<PendingUpdate> {
        let _guard = self.ctx.lock.lock().await;
        let mut update = self.updates.select_404(id).await?;
        ensure_pending(update.status, "Update", id)?;

        let current = self.purchases.select_404(update.asset_id).await?;
        if current.updated_at != update.original_data.updated_at {
            return Err(ServiceError::Conflict(format!(
                "Purchase {} changed after update {} was requested",
                current.id, id
            )));
        }

        let deltas = stock_deltas(&current, &update.updated_data);

        // validate every line before touching stock
        for (key, delta) in &deltas {
            if delta.removed_quantity > 0 || !delta.removed_ids.is_empty() {
                let pool = self.ledger.availability(key, None).await?;
                pool.check_take(delta.removed_quantity, &delta.removed_ids)?;
            }
        }
        // IDs that only moved between lines of this purchase are not new
        let added_ids = inventory::subtract(&update.updated_data.all_item_ids(), &current.all_item_ids());
        self.ledger.ensure_unrecorded(&added_ids, None).await?;

        // debits first so IDs moving between lines leave the old line before they land
        for (key, delta) in &deltas {
            if delta.removed_quantity > 0 || !delta.removed_ids.is_empty() {
                self.ledger.debit(key, delta.removed_quantity, &delta.removed_ids).await?;
            }
        }
        for (key, delta) in &deltas {
            if delta.added_quantity > 0 || !delta.added_ids.is_empty() {
                self.ledger.credit(key, delta.added_quantity, &delta.added_ids).await?;
            }
        }

        let now = Utc::now();
        let mut asset = update.updated_data.clone();
        asset.updated_at = now;
        self.purchases.replace(&asset).await?;

        update.updated_data = asset;
        update.status = ApprovalStatus::Approved;
        update.reviewed_by = Some(actor.name.clone());
        update.updated_at = now;
        self.updates.replace(&update).await?;

        info!(update = %id, purchase = %update.asset_id, lines = deltas.len(), user = %actor.name, "Purchase update applied");
        Ok(update)
    }

    /// Rejected updates stay in the collection with their remarks
    pub async fn reject_update(&self, id: Uuid, remarks: &str, actor: &Actor) -> ServiceResult<PendingUpdate> {
        let remarks = require_text(remarks, "Rejection remarks")?;
        let _guard = self.ctx.lock.lock().await;
        let mut update = self.updates.select_404(id).await?;
        ensure_pending(update.status, "Update", id)?;

        update.status = ApprovalStatus::Rejected;
        update.rejection_remarks = Some(remarks);
        update.reviewed_by = Some(actor.name.clone());
        update.updated_at = Utc::now();
        self.updates.replace(&update).await?;

        info!(update = %id, user = %actor.name, "Purchase update rejected");
        Ok(update)
    }

    pub async fn list_updates(&self, filter: &UpdateFilter) -> ServiceResult<Vec<PendingUpdate>> {
        let filter = DocFilter::new()
            .eq_opt("status", filter.status.map(|s| s.as_str()))
            .eq_opt("asset_id", filter.asset_id.map(|id| id.to_string()))
            .paged(filter.limit, filter.offset);
        Ok(self.updates.select_any(&filter).await?)
    }
}

/// The purchase as it would read after the edit; identity and approval are kept
fn apply_changes(original: &Asset, input: CreatePurchase) -> ServiceResult<Asset> {
    if input.asset_type != original.asset_type {
        return Err(ServiceError::Validation(
            "Asset type of an approved purchase cannot be changed".to_string(),
        ));
    }

    Ok(Asset {
        id: original.id,
        asset_type: original.asset_type,
        asset_category: require_text(&input.asset_category, "Asset category")?,
        entry_date: input.entry_date.unwrap_or(original.entry_date),
        purchase_date: input.purchase_date,
        supplier_name: require_text(&input.supplier_name, "Supplier name")?,
        supplier_address: trim_optional(input.supplier_address),
        source: trim_optional(input.source),
        mode_of_purchase: trim_optional(input.mode_of_purchase),
        bill_no: trim_optional(input.bill_no),
        received_by: trim_optional(input.received_by),
        bill_photo_url: trim_optional(input.bill_photo_url),
        items: build_items(original.asset_type, input.items)?,
        status: original.status,
        entered_by: original.entered_by.clone(),
        approved_by: original.approved_by.clone(),
        created_at: original.created_at,
        updated_at: original.updated_at,
    })
}

/// Per stock line change between two versions of a purchase
fn stock_deltas(before: &Asset, after: &Asset) -> Vec<(ItemKey, LineDelta)> {
    fn totals(asset: &Asset) -> HashMap<ItemKey, (u32, Vec<String>)> {
        let mut lines: HashMap<ItemKey, (u32, Vec<String>)> = HashMap::new();
        for item in &asset.items {
            let entry = lines.entry(asset.item_key(item)).or_default();
            entry.0 += item.quantity_received;
            entry.1.extend(item.item_ids.iter().cloned());
        }
        lines
    }

    let old = totals(before);
    let new = totals(after);
    let empty = (0, Vec::new());

    let mut keys: Vec<&ItemKey> = old.keys().collect();
    keys.extend(new.keys().filter(|k| !old.contains_key(*k)));

    keys.into_iter()
        .filter_map(|key| {
            let (old_q, old_ids) = old.get(key).unwrap_or(&empty);
            let (new_q, new_ids) = new.get(key).unwrap_or(&empty);
            let delta = LineDelta::between(*old_q, old_ids, *new_q, new_ids);
            (!delta.is_empty()).then(|| (key.clone(), delta))
        })
        .collect()
}
