use anyhow::Context;
use lotladder::engine::SystemClock;
use lotladder::{
    api, config::Config, db::init_db, DataSource, RecommendationService, Repository,
    SnapshotCache, SqliteDataSource,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("failed to initialize database at {}", config.database_path))?;

    let repo = Arc::new(Repository::new(pool));
    let clock = Arc::new(SystemClock);
    let datasource: Arc<dyn DataSource> =
        Arc::new(SqliteDataSource::new(repo, config.atr_period).with_clock(clock.clone()));
    let cache = Arc::new(SnapshotCache::new(config.cache_capacity));
    let service = Arc::new(RecommendationService::new(datasource, cache, clock));

    let app = api::create_router(api::AppState::new(service, config.clone()));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!(
        cache_capacity = config.cache_capacity.get(),
        atr_period = config.atr_period,
        "Server listening on {}",
        addr
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
