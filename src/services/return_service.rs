use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    ensure_pending, key_filter, record_rejection, require_text, trim_optional, Actor,
    ServiceContext, ServiceError, ServiceResult, StockLedger,
};
use crate::inventory::{self, Availability, InventoryError, Reservations};
use crate::models::{
    CreateReturn, DisposalRequest, DisposalSource, IssuedRecord, RejectedAsset, RejectionSource,
    ReturnCondition, ReturnRequest, ServiceRecord, ServiceStatus,
};
use crate::store::{DocFilter, Repository};
use crate::types::{ApprovalStatus, ItemKey};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnFilter {
    pub status: Option<ApprovalStatus>,
    pub location: Option<String>,
    pub condition: Option<ReturnCondition>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFilter {
    pub service_status: Option<ServiceStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Location-to-store returns and the servicing of returned items
#[derive(Clone)]
pub struct ReturnService {
    ctx: ServiceContext,
    returns: Repository<ReturnRequest>,
    issued: Repository<IssuedRecord>,
    services: Repository<ServiceRecord>,
    disposals: Repository<DisposalRequest>,
    rejected: Repository<RejectedAsset>,
    ledger: StockLedger,
}

impl ReturnService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            returns: ctx.repo(),
            issued: ctx.repo(),
            services: ctx.repo(),
            disposals: ctx.repo(),
            rejected: ctx.repo(),
            ledger: StockLedger::new(&ctx),
            ctx,
        }
    }

    pub async fn request_return(&self, input: CreateReturn, actor: &Actor) -> ServiceResult<ReturnRequest> {
        let key = input.key.normalized();
        require_text(&key.item_name, "Item name")?;
        let location = require_text(&input.location, "Location")?;
        let ids = inventory::normalize_ids(&input.returned_ids)?;
        inventory::validate_movement_ids(key.asset_type, input.quantity, &ids)?;

        let _guard = self.ctx.lock.lock().await;
        let pool = self.holding_availability(&key, &location, None).await?;
        pool.check_take(input.quantity, &ids).map_err(|e| {
            debug!(key = %key, location = %location, error = %e, "Return exceeds location holding");
            e
        })?;

        let now = Utc::now();
        let request = ReturnRequest {
            id: Uuid::new_v4(),
            key,
            location,
            quantity: input.quantity,
            returned_ids: ids,
            condition: input.condition,
            remark: trim_optional(input.remark),
            status: ApprovalStatus::Pending,
            requested_by: actor.name.clone(),
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.returns.insert(&request).await?;

        info!(return_id = %request.id, location = %request.location, user = %actor.name, "Return requested");
        Ok(request)
    }

    pub async fn approve_return(&self, id: Uuid, actor: &Actor) -> ServiceResult<ReturnRequest> {
        let _guard = self.ctx.lock.lock().await;
        let mut request = self.returns.select_404(id).await?;
        ensure_pending(request.status, "Return", id)?;

        let pool = self.holding_availability(&request.key, &request.location, Some(id)).await?;
        pool.check_take(request.quantity, &request.returned_ids)?;
        self.take_from_holding(&request).await?;

        match request.condition {
            ReturnCondition::Good => {
                self.ledger
                    .credit(&request.key, request.quantity, &request.returned_ids)
                    .await?;
            }
            ReturnCondition::ToBeServiced => {
                let record = ServiceRecord {
                    id: Uuid::new_v4(),
                    key: request.key.clone(),
                    quantity: request.quantity,
                    item_ids: request.returned_ids.clone(),
                    returned_from: request.location.clone(),
                    return_id: request.id,
                    service_status: ServiceStatus::InService,
                    service_notes: None,
                    completed_by: None,
                    completed_at: None,
                    created_at: Utc::now(),
                };
                self.services.insert(&record).await?;
            }
            ReturnCondition::ToBeDisposed => {
                let now = Utc::now();
                let disposal = DisposalRequest {
                    id: Uuid::new_v4(),
                    key: request.key.clone(),
                    quantity: request.quantity,
                    item_ids: request.returned_ids.clone(),
                    source: DisposalSource::Return,
                    return_id: Some(request.id),
                    purchase_value: None,
                    book_value: None,
                    inspection_date: None,
                    condemnation_reason: request
                        .remark
                        .clone()
                        .unwrap_or_else(|| format!("Returned from {} for disposal", request.location)),
                    remarks: None,
                    status: ApprovalStatus::Pending,
                    requested_by: actor.name.clone(),
                    reviewed_by: None,
                    disposed_at: None,
                    created_at: now,
                    updated_at: now,
                };
                self.disposals.insert(&disposal).await?;
            }
        }

        request.status = ApprovalStatus::Approved;
        request.reviewed_by = Some(actor.name.clone());
        request.updated_at = Utc::now();
        self.returns.replace(&request).await?;

        info!(return_id = %id, condition = ?request.condition, user = %actor.name, "Return approved");
        Ok(request)
    }

    pub async fn reject_return(&self, id: Uuid, remarks: &str, actor: &Actor) -> ServiceResult<RejectedAsset> {
        let _guard = self.ctx.lock.lock().await;
        let request = self.returns.select_404(id).await?;
        ensure_pending(request.status, "Return", id)?;

        let record = record_rejection(&self.rejected, RejectionSource::Return, id, &request, remarks, actor).await?;
        self.returns.delete(id).await?;

        info!(return_id = %id, user = %actor.name, "Return rejected");
        Ok(record)
    }

    /// Serviced items go back into store stock
    pub async fn complete_service(
        &self,
        id: Uuid,
        notes: Option<String>,
        actor: &Actor,
    ) -> ServiceResult<ServiceRecord> {
        let _guard = self.ctx.lock.lock().await;
        let mut record = self.services.select_404(id).await?;
        if record.service_status != ServiceStatus::InService {
            return Err(ServiceError::InvalidState(format!("Service record {} is already completed", id)));
        }

        self.ledger.credit(&record.key, record.quantity, &record.item_ids).await?;

        record.service_status = ServiceStatus::Completed;
        record.service_notes = trim_optional(notes);
        record.completed_by = Some(actor.name.clone());
        record.completed_at = Some(Utc::now());
        self.services.replace(&record).await?;

        info!(service = %id, user = %actor.name, "Service completed, items restocked");
        Ok(record)
    }

    pub async fn list_returns(&self, filter: &ReturnFilter) -> ServiceResult<Vec<ReturnRequest>> {
        let condition = match filter.condition {
            Some(c) => Some(serde_json::to_value(c).map_err(crate::store::StoreError::from)?),
            None => None,
        };
        let filter = DocFilter::new()
            .eq_opt("status", filter.status.map(|s| s.as_str()))
            .eq_opt("location", filter.location.clone())
            .eq_opt("condition", condition)
            .paged(filter.limit, filter.offset);
        Ok(self.returns.select_any(&filter).await?)
    }

    pub async fn list_services(&self, filter: &ServiceFilter) -> ServiceResult<Vec<ServiceRecord>> {
        let filter = DocFilter::new()
            .eq_opt("service_status", filter.service_status.map(|s| s.as_str()))
            .paged(filter.limit, filter.offset);
        Ok(self.services.select_any(&filter).await?)
    }

    async fn holding(&self, key: &ItemKey, location: &str) -> ServiceResult<Option<IssuedRecord>> {
        let filter = key_filter(key).eq("location", location);
        Ok(self.issued.select_first(&filter).await?)
    }

    /// The location's holding less what pending returns already claim
    async fn holding_availability(
        &self,
        key: &ItemKey,
        location: &str,
        exclude: Option<Uuid>,
    ) -> ServiceResult<Availability> {
        let (total, ids) = match self.holding(key, location).await? {
            Some(h) => (h.quantity, h.issued_ids),
            None => (0, vec![]),
        };

        let pending = key_filter(key)
            .eq("location", location)
            .eq("status", ApprovalStatus::Pending.as_str());
        let mut reserved = Reservations::default();
        for other in self.returns.select_any(&pending).await? {
            if Some(other.id) != exclude {
                reserved.add(other.quantity, &other.returned_ids);
            }
        }

        Ok(Availability::new(total, ids, reserved))
    }

    async fn take_from_holding(&self, request: &ReturnRequest) -> ServiceResult<()> {
        let mut holding = self
            .holding(&request.key, &request.location)
            .await?
            .ok_or(InventoryError::InsufficientQuantity {
                requested: request.quantity,
                available: 0,
            })?;

        holding.quantity = holding.quantity.saturating_sub(request.quantity);
        holding.issued_ids = inventory::subtract(&holding.issued_ids, &request.returned_ids);

        if holding.quantity == 0 {
            self.issued.delete(holding.id).await?;
        } else {
            holding.updated_at = Utc::now();
            self.issued.replace(&holding).await?;
        }
        Ok(())
    }
}
