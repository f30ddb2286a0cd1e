// handlers/protected/assets/mod.rs - /api/assets/*
//
// Submissions, approvals and reports for the asset workflow.

pub mod disposals;
pub mod issues;
pub mod purchases;
pub mod reports;
pub mod returns;
pub mod updates;
