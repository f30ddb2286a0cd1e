use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::{open_state, output_success};
use crate::cli::OutputFormat;
use crate::models::{CreatePurchase, FacultyInput, RegisterUser};
use crate::services::{Actor, ServiceError};
use crate::state::AppState;

/// Seed file layout; every section is optional
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<RegisterUser>,
    #[serde(default)]
    pub purchases: Vec<CreatePurchase>,
    #[serde(default)]
    pub faculty: Vec<FacultyInput>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_skipped: usize,
    pub purchases: usize,
    pub faculty: usize,
}

pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", file.display(), e))?;
    let seed: SeedFile = serde_yaml::from_str(&raw)?;

    let state = open_state().await?;
    let report = apply(&state, seed).await?;

    output_success(
        output_format,
        &format!(
            "Seeded {} user(s), {} purchase(s), {} faculty profile(s)",
            report.users_created, report.purchases, report.faculty
        ),
        Some(json!({
            "users_created": report.users_created,
            "users_skipped": report.users_skipped,
            "purchases": report.purchases,
            "faculty": report.faculty,
        })),
    )
}

/// Users are created approved, purchases and faculty are approved on load.
/// Existing user names are skipped so a seed file can be re-applied.
pub async fn apply(state: &AppState, seed: SeedFile) -> anyhow::Result<SeedReport> {
    let actor = Actor::system();
    let mut report = SeedReport::default();

    for user in seed.users {
        let name = user.name.clone();
        match state.users.create_user(user).await {
            Ok(_) => report.users_created += 1,
            Err(ServiceError::Conflict(_)) => {
                tracing::warn!(user = %name, "User exists, skipped");
                report.users_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    for purchase in seed.purchases {
        let asset = state.purchases.store_purchase(purchase, &actor).await?;
        state.purchases.approve_purchase(asset.id, &actor).await?;
        report.purchases += 1;
    }

    for input in seed.faculty {
        let faculty = state.faculty.save_faculty(input, &actor).await?;
        state.faculty.approve_faculty(faculty.id, &actor).await?;
        report.faculty += 1;
    }

    Ok(report)
}
