use serde_json::json;

use crate::auth::roles::{AccessArea, Role};
use crate::cli::utils::{open_state, output_success};
use crate::cli::OutputFormat;
use crate::models::RegisterUser;

pub async fn handle(
    name: String,
    password: String,
    role: Role,
    access: Vec<AccessArea>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let state = open_state().await?;
    let user = state
        .users
        .create_user(RegisterUser { name, password, role, access })
        .await?;

    output_success(
        output_format,
        &format!("Created {} account '{}'", user.role.as_str(), user.name),
        Some(json!(user)),
    )
}
