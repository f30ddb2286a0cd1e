use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::store::PgStore;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let settings = config::config();
    let Some(url) = settings.database.url.as_deref() else {
        output_error(output_format, "DATABASE_URL is not set; nothing to migrate", Some("NO_DATABASE"))?;
        anyhow::bail!("DATABASE_URL is not set");
    };

    let store = PgStore::connect(url, &settings.database).await?;
    store.migrate().await?;
    store.close().await;

    output_success(output_format, "Document schema is up to date", None)
}
