use serde_json::json;

use crate::cli::utils::open_state;
use crate::cli::OutputFormat;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let state = open_state().await?;
    let rows = state.reports.asset_summary().await?;
    let pending = state.reports.pending_counts().await?;

    match output_format {
        OutputFormat::Json => {
            let body = json!({
                "success": true,
                "data": { "categories": rows, "pending": pending }
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No assets recorded");
            } else {
                println!(
                    "{:<11} {:<24} {:>9} {:>7} {:>10} {:>17} {:>9}",
                    "TYPE", "CATEGORY", "IN STOCK", "ISSUED", "IN SERVICE", "AWAITING DISPOSAL", "DISPOSED"
                );
                for row in &rows {
                    println!(
                        "{:<11} {:<24} {:>9} {:>7} {:>10} {:>17} {:>9}",
                        row.asset_type.as_str(),
                        row.asset_category,
                        row.in_stock,
                        row.issued,
                        row.in_service,
                        row.awaiting_disposal,
                        row.disposed
                    );
                }
            }
            println!("{} request(s) awaiting approval", pending.total());
        }
    }
    Ok(())
}
