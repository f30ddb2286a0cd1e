use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::services::{
    DisposalService, FacultyService, IssueService, PurchaseService, ReportService, ReturnService,
    ServiceContext, StockLedger, UpdateService, UserService,
};
use crate::store::DocumentStore;

/// Everything a handler needs, shared through an axum `Extension`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub purchases: PurchaseService,
    pub issues: IssueService,
    pub returns: ReturnService,
    pub disposals: DisposalService,
    pub updates: UpdateService,
    pub faculty: FacultyService,
    pub users: UserService,
    pub reports: ReportService,
    pub ledger: StockLedger,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, workflow: WorkflowConfig) -> Self {
        let ctx = ServiceContext::new(store.clone(), workflow);
        Self {
            purchases: PurchaseService::new(ctx.clone()),
            issues: IssueService::new(ctx.clone()),
            returns: ReturnService::new(ctx.clone()),
            disposals: DisposalService::new(ctx.clone()),
            updates: UpdateService::new(ctx.clone()),
            faculty: FacultyService::new(ctx.clone()),
            users: UserService::new(ctx.clone()),
            reports: ReportService::new(ctx.clone()),
            ledger: StockLedger::new(&ctx),
            store,
        }
    }
}
