use api_client::{DataSource, YahooClient};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::{AnalysisSettings, Settings};
use database::{CachedDataSource, DbRepository};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod service;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub source: Arc<dyn DataSource>,
    pub analysis: AnalysisSettings,
}

/// Builds the price source described by the settings.
///
/// With a `[database]` section the provider is wrapped in the read-through
/// cache. If the database cannot be reached the service still starts, uncached.
pub async fn build_source(settings: &Settings) -> anyhow::Result<Arc<dyn DataSource>> {
    let upstream = YahooClient::new(&settings.data_source)?;

    let Some(db) = &settings.database else {
        return Ok(Arc::new(upstream));
    };

    let pool = match database::connect(db).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Price cache unavailable; continuing without it.");
            return Ok(Arc::new(upstream));
        }
    };
    database::run_migrations(&pool).await?;

    let ttl = Duration::from_secs(db.cache_ttl_secs);
    Ok(Arc::new(CachedDataSource::new(upstream, DbRepository::new(pool), ttl)))
}

/// Defines the application routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/tools/analyze_stock", post(handlers::analyze_stock))
        .route("/api/analysis/:ticker", get(handlers::get_analysis))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialised by the caller.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let source = build_source(&settings).await?;
    let state = Arc::new(AppState {
        source,
        analysis: settings.analysis.clone(),
    });
    let app = build_router(state);

    let addr = (settings.server.host.as_str(), settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
