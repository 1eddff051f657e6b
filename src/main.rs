use solo_tracker::{
    ApiClient, AppState, Config, Dashboard, FileStore, router,
    reminders::{LogNotifier, ReminderScheduler},
};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let store = FileStore::load(&config.data_path).await;
    let client = ApiClient::new(&config.api_url)?;
    let reminders = ReminderScheduler::new(Arc::new(LogNotifier::new(config.notifications)));
    let dashboard = Dashboard::new(client, Arc::new(store), reminders);

    info!("using tracker backend at {}", config.api_url);
    if let Err(err) = dashboard.refresh().await {
        warn!("initial refresh failed: {err}");
    }

    let app = router(AppState::new(dashboard));
    let addr = config.bind_addr();

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
