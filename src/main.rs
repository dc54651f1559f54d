mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::artifacts::{routes as artifacts_routes, ArtifactService};
use crate::features::clients::{routes as clients_routes, ClientService};
use crate::features::inputs::{
    routes as inputs_routes, IngestionService, InputStore, PgInputStore,
};
use crate::features::opportunities::{routes as opportunities_routes, OpportunityService};
use crate::features::upload_proxy::{routes as upload_proxy_routes, UploadProxyService};
use axum::{middleware::from_fn, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    // Upload proxy
    let upload_proxy = Arc::new(
        UploadProxyService::new(&config.proxy)
            .map_err(|e| anyhow::anyhow!("Failed to build webhook client: {}", e))?,
    );
    if config.proxy.is_configured() {
        tracing::info!(
            "Upload proxy relaying to webhook (deadline {:?})",
            config.proxy.deadline
        );
    } else {
        tracing::warn!(
            "UPLOAD_WEBHOOK_URL is not set; upload requests will fail with a configuration error"
        );
    }

    // Tracker API (only with a database)
    let tracker = match &config.database {
        Some(db_config) => {
            let pool = database::create_pool(db_config).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            Some(tracker_routes(pool, Arc::clone(&upload_proxy)))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; running the upload proxy only");
            None
        }
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let mut cors_routes = Router::new().merge(swagger).merge(health_route);
    if let Some(tracker) = tracker {
        cors_routes = cors_routes.merge(tracker);
    }

    // The proxy answers CORS itself, including pre-flight, so it sits outside the CorsLayer
    let app = Router::new()
        .merge(cors_routes.layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        )))
        .merge(upload_proxy_routes(upload_proxy))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Clients, opportunities, inputs and artifacts over one pool
fn tracker_routes(pool: PgPool, upload_proxy: Arc<UploadProxyService>) -> Router {
    let input_store: Arc<dyn InputStore> = Arc::new(PgInputStore::new(pool.clone()));
    let client_service = Arc::new(ClientService::new(pool.clone()));
    let artifact_service = Arc::new(ArtifactService::new(pool.clone()));
    let opportunity_service = Arc::new(OpportunityService::new(
        pool,
        Arc::clone(&input_store),
        Arc::clone(&artifact_service),
    ));
    let ingestion_service = Arc::new(IngestionService::new(input_store, upload_proxy));
    tracing::info!("Tracker services initialized");

    Router::new()
        .merge(clients_routes(client_service))
        .merge(opportunities_routes(opportunity_service))
        .merge(inputs_routes(ingestion_service))
        .merge(artifacts_routes(artifact_service))
}
