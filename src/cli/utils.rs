use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config;
use crate::state::AppState;
use crate::store;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "message": message
            });
            if let Some(code) = error_code {
                response["code"] = json!(code);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Services over the configured store, the same wiring the server uses
pub async fn open_state() -> anyhow::Result<AppState> {
    let settings = config::config();
    let store = store::open(&settings.database).await?;
    Ok(AppState::new(store, settings.workflow.clone()))
}
