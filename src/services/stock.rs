use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

use super::{key_filter, ServiceContext, ServiceResult};
use crate::inventory::{self, Availability, InventoryError, Reservations};
use crate::models::{
    Asset, DisposalRequest, DisposalSource, IssuedRecord, ServiceRecord, ServiceStatus, StockEntry,
    TempIssue,
};
use crate::store::{DocFilter, Repository};
use crate::types::{ApprovalStatus, ItemKey};

/// Store stock lines and the reservations pending requests hold against them
#[derive(Clone)]
pub struct StockLedger {
    stock: Repository<StockEntry>,
    issues: Repository<TempIssue>,
    disposals: Repository<DisposalRequest>,
    issued: Repository<IssuedRecord>,
    services: Repository<ServiceRecord>,
    purchases: Repository<Asset>,
}

impl StockLedger {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            stock: ctx.repo(),
            issues: ctx.repo(),
            disposals: ctx.repo(),
            issued: ctx.repo(),
            services: ctx.repo(),
            purchases: ctx.repo(),
        }
    }

    pub async fn entry(&self, key: &ItemKey) -> ServiceResult<Option<StockEntry>> {
        Ok(self.stock.select_first(&key_filter(key)).await?)
    }

    pub async fn list(&self, filter: &DocFilter) -> ServiceResult<Vec<StockEntry>> {
        Ok(self.stock.select_any(filter).await?)
    }

    /// Pending issues and pending store disposals of `key`, skipping `exclude`
    pub async fn reservations(&self, key: &ItemKey, exclude: Option<Uuid>) -> ServiceResult<Reservations> {
        let pending = key_filter(key).eq("status", ApprovalStatus::Pending.as_str());
        let mut reserved = Reservations::default();

        for issue in self.issues.select_any(&pending).await? {
            if Some(issue.id) != exclude {
                reserved.add(issue.quantity, &issue.issued_ids);
            }
        }

        let store_disposals = pending.eq("source", "store");
        for disposal in self.disposals.select_any(&store_disposals).await? {
            if Some(disposal.id) != exclude {
                reserved.add(disposal.quantity, &disposal.item_ids);
            }
        }

        Ok(reserved)
    }

    pub async fn availability(&self, key: &ItemKey, exclude: Option<Uuid>) -> ServiceResult<Availability> {
        let reserved = self.reservations(key, exclude).await?;
        let (total, ids) = match self.entry(key).await? {
            Some(entry) => (entry.in_stock, entry.item_ids),
            None => (0, vec![]),
        };
        Ok(Availability::new(total, ids, reserved))
    }

    /// Add units to the store, opening the stock line on first receipt
    pub async fn credit(&self, key: &ItemKey, quantity: u32, ids: &[String]) -> ServiceResult<StockEntry> {
        match self.entry(key).await? {
            Some(mut entry) => {
                entry.in_stock = entry.in_stock.saturating_add(quantity);
                entry.item_ids = inventory::merge(&entry.item_ids, ids);
                entry.updated_at = Utc::now();
                self.stock.replace(&entry).await?;
                Ok(entry)
            }
            None => {
                let mut entry = StockEntry::empty(key.clone());
                entry.in_stock = quantity;
                entry.item_ids = inventory::merge(&[], ids);
                self.stock.insert(&entry).await?;
                Ok(entry)
            }
        }
    }

    /// Remove units from the store. Callers validate availability first.
    pub async fn debit(&self, key: &ItemKey, quantity: u32, ids: &[String]) -> ServiceResult<StockEntry> {
        let mut entry = self.entry(key).await?.ok_or(InventoryError::InsufficientQuantity {
            requested: quantity,
            available: 0,
        })?;

        if quantity > entry.in_stock {
            return Err(InventoryError::InsufficientQuantity {
                requested: quantity,
                available: entry.in_stock,
            }
            .into());
        }
        let missing = inventory::missing_from(ids, &entry.item_ids);
        if !missing.is_empty() {
            return Err(InventoryError::NotAvailable(missing).into());
        }

        entry.in_stock -= quantity;
        entry.item_ids = inventory::subtract(&entry.item_ids, ids);
        entry.updated_at = Utc::now();
        self.stock.replace(&entry).await?;
        Ok(entry)
    }

    /// Every serial ID the office already knows about, wherever it currently is.
    /// `skip_purchase` leaves out one purchase's own pending IDs.
    pub async fn recorded_ids(&self, skip_purchase: Option<Uuid>) -> ServiceResult<HashSet<String>> {
        let everything = DocFilter::new();
        let mut known = HashSet::new();

        for entry in self.stock.select_any(&everything).await? {
            known.extend(entry.item_ids);
        }
        for holding in self.issued.select_any(&everything).await? {
            known.extend(holding.issued_ids);
        }
        let in_service = DocFilter::new().eq("service_status", ServiceStatus::InService.as_str());
        for record in self.services.select_any(&in_service).await? {
            known.extend(record.item_ids);
        }
        for disposal in self.disposals.select_any(&everything).await? {
            // store-sourced pending disposals are still counted in stock
            if disposal.source == DisposalSource::Return || disposal.status == ApprovalStatus::Approved {
                known.extend(disposal.item_ids);
            }
        }
        let pending = DocFilter::new().eq("status", ApprovalStatus::Pending.as_str());
        for purchase in self.purchases.select_any(&pending).await? {
            if Some(purchase.id) != skip_purchase {
                known.extend(purchase.all_item_ids());
            }
        }

        Ok(known)
    }

    /// Fails when any of `ids` is already recorded somewhere
    pub async fn ensure_unrecorded(&self, ids: &[String], skip_purchase: Option<Uuid>) -> ServiceResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let known = self.recorded_ids(skip_purchase).await?;
        let clashes: Vec<String> = ids.iter().filter(|id| known.contains(*id)).cloned().collect();
        if clashes.is_empty() {
            Ok(())
        } else {
            Err(InventoryError::AlreadyRecorded(clashes).into())
        }
    }
}
