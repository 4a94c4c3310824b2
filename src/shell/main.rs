use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use campus_notifier::shell::context::AppContext;
use campus_notifier::shell::settings::{load_settings, service_account_from_env};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings().context("failed to load settings")?;
    let key = service_account_from_env()?;
    let project_id = key.project_id.clone();
    let context = AppContext::build(settings, key).context("failed to build HTTP client")?;

    tracing::info!(
        %project_id,
        interval_secs = context.settings.poll_interval_secs,
        watermark_path = %context.settings.watermark_path,
        "firestore notification watcher started"
    );

    context.runner().run(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
