use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ServiceContext, ServiceResult};
use crate::models::{
    Asset, DisposalRequest, DisposalSource, Faculty, IssuedRecord, PendingUpdate, RejectedAsset, RejectionSource,
    ReturnRequest, ServiceRecord, ServiceStatus, StockEntry, TempIssue, User,
};
use crate::store::{DocFilter, Repository};
use crate::types::{ApprovalStatus, AssetType};

/// Quantities of one asset category, wherever the units currently are
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub asset_type: AssetType,
    pub asset_category: String,
    pub in_stock: u64,
    pub issued: u64,
    pub in_service: u64,
    /// Returned for disposal, waiting on approval; no longer in stock or at a location
    pub awaiting_disposal: u64,
    pub disposed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingCounts {
    pub purchases: usize,
    pub issues: usize,
    pub returns: usize,
    pub disposals: usize,
    pub updates: usize,
    pub faculty: usize,
    pub users: usize,
}

impl PendingCounts {
    pub fn total(&self) -> usize {
        self.purchases + self.issues + self.returns + self.disposals + self.updates + self.faculty + self.users
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockFilter {
    pub asset_type: Option<AssetType>,
    pub asset_category: Option<String>,
    pub item_name: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Read-only views for dashboards and the CLI
#[derive(Clone)]
pub struct ReportService {
    stock: Repository<StockEntry>,
    issued: Repository<IssuedRecord>,
    services: Repository<ServiceRecord>,
    disposals: Repository<DisposalRequest>,
    purchases: Repository<Asset>,
    issues: Repository<TempIssue>,
    returns: Repository<ReturnRequest>,
    updates: Repository<PendingUpdate>,
    faculty: Repository<Faculty>,
    users: Repository<User>,
    rejected: Repository<RejectedAsset>,
}

impl ReportService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            stock: ctx.repo(),
            issued: ctx.repo(),
            services: ctx.repo(),
            disposals: ctx.repo(),
            purchases: ctx.repo(),
            issues: ctx.repo(),
            returns: ctx.repo(),
            updates: ctx.repo(),
            faculty: ctx.repo(),
            users: ctx.repo(),
            rejected: ctx.repo(),
        }
    }

    pub async fn asset_summary(&self) -> ServiceResult<Vec<CategorySummary>> {
        let all = DocFilter::new();
        let mut rows: BTreeMap<(&'static str, String), CategorySummary> = BTreeMap::new();

        for entry in self.stock.select_any(&all).await? {
            summary_row(&mut rows, entry.key.asset_type, &entry.key.asset_category).in_stock += u64::from(entry.in_stock);
        }
        for holding in self.issued.select_any(&all).await? {
            summary_row(&mut rows, holding.key.asset_type, &holding.key.asset_category).issued += u64::from(holding.quantity);
        }
        let in_service = DocFilter::new().eq("service_status", ServiceStatus::InService.as_str());
        for record in self.services.select_any(&in_service).await? {
            summary_row(&mut rows, record.key.asset_type, &record.key.asset_category).in_service += u64::from(record.quantity);
        }
        for disposal in self.disposals.select_any(&all).await? {
            let row = summary_row(&mut rows, disposal.key.asset_type, &disposal.key.asset_category);
            match (disposal.status, disposal.source) {
                (ApprovalStatus::Approved, _) => row.disposed += u64::from(disposal.quantity),
                (ApprovalStatus::Pending, DisposalSource::Return) => {
                    row.awaiting_disposal += u64::from(disposal.quantity)
                }
                // pending store disposals are still in stock; rejected ones went back
                _ => {}
            }
        }

        Ok(rows.into_values().collect())
    }

    pub async fn pending_counts(&self) -> ServiceResult<PendingCounts> {
        let pending = DocFilter::new().eq("status", ApprovalStatus::Pending.as_str());
        Ok(PendingCounts {
            purchases: self.purchases.count(&pending).await?,
            issues: self.issues.count(&pending).await?,
            returns: self.returns.count(&pending).await?,
            disposals: self.disposals.count(&pending).await?,
            updates: self.updates.count(&pending).await?,
            faculty: self.faculty.count(&pending).await?,
            users: self.users.count(&pending).await?,
        })
    }

    pub async fn list_rejected(&self, source: Option<RejectionSource>) -> ServiceResult<Vec<RejectedAsset>> {
        let filter = match source {
            Some(source) => DocFilter::new().eq(
                "source",
                serde_json::to_value(source).map_err(crate::store::StoreError::from)?,
            ),
            None => DocFilter::new(),
        };
        Ok(self.rejected.select_any(&filter).await?)
    }

    pub async fn stock(&self, filter: &StockFilter) -> ServiceResult<Vec<StockEntry>> {
        let filter = DocFilter::new()
            .eq_opt("asset_type", filter.asset_type.map(|t| t.as_str()))
            .eq_opt("asset_category", filter.asset_category.clone())
            .eq_opt("item_name", filter.item_name.clone())
            .paged(filter.limit, filter.offset);
        Ok(self.stock.select_any(&filter).await?)
    }
}

fn summary_row<'a>(
    rows: &'a mut BTreeMap<(&'static str, String), CategorySummary>,
    asset_type: AssetType,
    category: &str,
) -> &'a mut CategorySummary {
    rows.entry((asset_type.as_str(), category.to_string()))
        .or_insert_with(|| CategorySummary {
            asset_type,
            asset_category: category.to_string(),
            in_stock: 0,
            issued: 0,
            in_service: 0,
            awaiting_disposal: 0,
            disposed: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReturnCondition;
    use crate::testing::{disposal_request, paper_purchase, return_request, TestServices};

    #[tokio::test]
    async fn summary_tracks_units_across_locations() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2", "L3", "L4"]).await;
        t.issue_to("Lab", &["L1", "L2"]).await;

        let ret = t
            .returns
            .request_return(return_request("Lab", &["L2"], ReturnCondition::ToBeServiced), &t.clerk)
            .await
            .unwrap();
        t.returns.approve_return(ret.id, &t.manager).await.unwrap();

        let disposal = t.disposals.request_disposal(disposal_request(&["L4"]), &t.keeper).await.unwrap();
        t.disposals.approve_disposal(disposal.id, &t.manager).await.unwrap();

        let paper = t.purchases.store_purchase(paper_purchase(50), &t.clerk).await.unwrap();
        t.purchases.approve_purchase(paper.id, &t.manager).await.unwrap();

        let summary = t.reports.asset_summary().await.unwrap();
        assert_eq!(summary.len(), 2);

        let it = summary.iter().find(|r| r.asset_category == "IT").unwrap();
        assert_eq!((it.in_stock, it.issued, it.in_service, it.disposed), (1, 1, 1, 1));
        assert_eq!(it.awaiting_disposal, 0);

        let stationery = summary.iter().find(|r| r.asset_category == "Stationery").unwrap();
        assert_eq!(stationery.asset_type, AssetType::Consumable);
        assert_eq!(stationery.in_stock, 50);
    }

    #[tokio::test]
    async fn pending_counts_cover_every_queue() {
        let t = TestServices::new();
        t.purchases.store_purchase(paper_purchase(5), &t.clerk).await.unwrap();
        let rejected = t.purchases.store_purchase(paper_purchase(7), &t.clerk).await.unwrap();
        t.purchases.reject_purchase(rejected.id, "Duplicate bill", &t.manager).await.unwrap();

        let counts = t.reports.pending_counts().await.unwrap();
        assert_eq!(counts.purchases, 1);
        assert_eq!(counts.total(), 1);

        let listed = t.reports.list_rejected(Some(RejectionSource::Purchase)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(t.reports.list_rejected(Some(RejectionSource::Issue)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn returned_for_disposal_units_stay_in_the_summary() {
        let t = TestServices::new();
        t.stock_laptops(&["L1", "L2", "L3"]).await;
        t.issue_to("Hostel", &["L1", "L2"]).await;

        let ret = t
            .returns
            .request_return(return_request("Hostel", &["L1"], ReturnCondition::ToBeDisposed), &t.clerk)
            .await
            .unwrap();
        t.returns.approve_return(ret.id, &t.manager).await.unwrap();

        let summary = t.reports.asset_summary().await.unwrap();
        let it = summary.iter().find(|r| r.asset_category == "IT").unwrap();
        assert_eq!((it.in_stock, it.issued, it.awaiting_disposal, it.disposed), (1, 1, 1, 0));
        assert_eq!(it.in_stock + it.issued + it.in_service + it.awaiting_disposal + it.disposed, 3);
    }
}
