use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use dubrelay::application::services::{DubbingService, RetentionScheduler};
use dubrelay::infrastructure::dubbing::DubbingClientFactory;
use dubrelay::infrastructure::observability::{TracingConfig, init_tracing};
use dubrelay::infrastructure::storage::MediaStoreFactory;
use dubrelay::presentation::config::DubbingProviderSetting;
use dubrelay::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig::from_settings(&settings.logging, environment.as_str()),
        settings.server.port,
    );

    if environment.is_production() && settings.dubbing.provider == DubbingProviderSetting::Mock {
        anyhow::bail!("the mock dubbing provider cannot run in prod");
    }

    let media_store = MediaStoreFactory::create(&settings.storage)?;
    let dubbing_client = DubbingClientFactory::create(&settings.dubbing)?;

    let retention_delay = settings.storage.retention();
    let (retention, retention_worker) =
        RetentionScheduler::new(Arc::clone(&media_store), retention_delay);
    tokio::spawn(retention_worker.run());

    let poll_policy = settings.dubbing.poll_policy();
    tracing::info!(
        storage = ?settings.storage.provider,
        retention_secs = retention_delay.as_secs(),
        poll_interval_secs = poll_policy.interval.as_secs(),
        poll_bounded = poll_policy.is_bounded(),
        "Dubbing pipeline configured"
    );

    let dubbing_service = Arc::new(DubbingService::new(
        dubbing_client,
        media_store,
        retention,
        poll_policy,
    ));

    let state = AppState::new(dubbing_service, settings.server.max_upload_bytes());
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server running at {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
