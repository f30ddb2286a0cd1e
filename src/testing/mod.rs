//! Fixtures for service tests: an in-memory state with one actor per role
//! and request builders for the common workflow steps.

use rust_decimal::Decimal;
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::roles::Role;
use crate::config::WorkflowConfig;
use crate::models::{
    Asset, CreateDisposal, CreateIssue, CreatePurchase, CreateReturn, FacultyInput, FacultyType,
    PurchaseItem, ReturnCondition,
};
use crate::services::Actor;
use crate::state::AppState;
use crate::store::MemoryStore;
use crate::types::{AssetType, ItemKey};

pub struct TestServices {
    state: AppState,
    pub admin: Actor,
    pub manager: Actor,
    pub principal: Actor,
    pub keeper: Actor,
    pub clerk: Actor,
}

impl Deref for TestServices {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}

impl TestServices {
    pub fn new() -> Self {
        Self::with_workflow(WorkflowConfig {
            require_issue_acknowledgement: true,
        })
    }

    pub fn with_workflow(workflow: WorkflowConfig) -> Self {
        Self {
            state: AppState::new(Arc::new(MemoryStore::new()), workflow),
            admin: Actor::new(Uuid::new_v4(), "admin", Role::Admin),
            manager: Actor::new(Uuid::new_v4(), "manager", Role::AssetManager),
            principal: Actor::new(Uuid::new_v4(), "principal", Role::Principal),
            keeper: Actor::new(Uuid::new_v4(), "keeper", Role::Storekeeper),
            clerk: Actor::new(Uuid::new_v4(), "clerk", Role::DataEntry),
        }
    }

    /// Store and approve a laptop purchase carrying `ids`
    pub async fn stock_laptops(&self, ids: &[&str]) -> Asset {
        let asset = self
            .purchases
            .store_purchase(laptop_purchase(ids), &self.clerk)
            .await
            .expect("store laptops");
        self.purchases
            .approve_purchase(asset.id, &self.manager)
            .await
            .expect("approve laptops")
    }

    /// Issue, acknowledge and approve laptops to `location`
    pub async fn issue_to(&self, location: &str, ids: &[&str]) {
        let issue = self
            .issues
            .issue(issue_request(ids, location), &self.clerk)
            .await
            .expect("issue");
        self.issues
            .acknowledge_issue(issue.id, None, &self.clerk)
            .await
            .expect("acknowledge");
        self.issues
            .approve_issue(issue.id, &self.manager)
            .await
            .expect("approve issue");
    }
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

pub fn laptop_key() -> ItemKey {
    ItemKey::new(AssetType::Permanent, "IT", "Laptop", Some("Dell".into()), None)
}

pub fn laptop_purchase(ids: &[&str]) -> CreatePurchase {
    CreatePurchase {
        asset_type: AssetType::Permanent,
        asset_category: "IT".into(),
        entry_date: None,
        purchase_date: None,
        supplier_name: "Techno Traders".into(),
        supplier_address: Some("Coimbatore".into()),
        source: Some("GeM".into()),
        mode_of_purchase: Some("Tender".into()),
        bill_no: Some("TT-204".into()),
        received_by: Some("keeper".into()),
        bill_photo_url: None,
        items: vec![PurchaseItem {
            item_name: "Laptop".into(),
            sub_category: Some("Dell".into()),
            item_description: None,
            quantity_received: ids.len() as u32,
            unit_price: Decimal::new(5500000, 2),
            total_price: Decimal::ZERO,
            item_ids: strings(ids),
            amc_date: None,
        }],
    }
}

pub fn paper_purchase(quantity: u32) -> CreatePurchase {
    CreatePurchase {
        asset_type: AssetType::Consumable,
        asset_category: "Stationery".into(),
        entry_date: None,
        purchase_date: None,
        supplier_name: "Paper House".into(),
        supplier_address: None,
        source: None,
        mode_of_purchase: Some("Direct".into()),
        bill_no: None,
        received_by: None,
        bill_photo_url: None,
        items: vec![PurchaseItem {
            item_name: "A4 Paper".into(),
            sub_category: None,
            item_description: Some("500 sheet ream".into()),
            quantity_received: quantity,
            unit_price: Decimal::new(25050, 2),
            total_price: Decimal::ZERO,
            item_ids: vec![],
            amc_date: None,
        }],
    }
}

pub fn issue_request(ids: &[&str], location: &str) -> CreateIssue {
    CreateIssue {
        key: laptop_key(),
        location: location.into(),
        issued_to: Some("Course Director".into()),
        purpose: None,
        quantity: ids.len() as u32,
        issued_ids: strings(ids),
    }
}

pub fn return_request(location: &str, ids: &[&str], condition: ReturnCondition) -> CreateReturn {
    CreateReturn {
        key: laptop_key(),
        location: location.into(),
        quantity: ids.len() as u32,
        returned_ids: strings(ids),
        condition,
        remark: None,
    }
}

pub fn disposal_request(ids: &[&str]) -> CreateDisposal {
    CreateDisposal {
        key: laptop_key(),
        quantity: ids.len() as u32,
        item_ids: strings(ids),
        purchase_value: Some(Decimal::new(5500000, 2)),
        book_value: None,
        inspection_date: None,
        condemnation_reason: "Beyond economical repair".into(),
        remarks: None,
    }
}

pub fn faculty_input(name: &str, faculty_type: FacultyType) -> FacultyInput {
    FacultyInput {
        faculty_type,
        name: name.into(),
        cadre: None,
        year_of_allotment: None,
        email: Some(format!("{}@casfos.test", name.to_lowercase().replace([' ', '.'], ""))),
        mobile_number: None,
        photo_url: None,
        institution: match faculty_type {
            FacultyType::External => Some("Forest Research Institute".into()),
            FacultyType::Internal => None,
        },
        domain_knowledge: vec![],
        areas_of_expertise: vec![],
        courses_handled: vec![],
        publications: vec![],
        awards: vec![],
        other_responsibilities: vec![],
    }
}
