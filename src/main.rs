use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use repairmart::config::AppConfig;
use repairmart::db;
use repairmart::handlers;
use repairmart::services::clients::remote::{RemoteAddressApi, RemoteBookingApi};
use repairmart::services::store::BookingStore;
use repairmart::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    tracing::info!(
        booking_api = %config.booking_api_url,
        address_api = %config.address_api_url,
        "wiring remote collaborators"
    );
    let booking_api = RemoteBookingApi::new(config.booking_api_url.clone());
    let address_api = RemoteAddressApi::new(config.address_api_url.clone());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        booking_api: Box::new(booking_api),
        address_api: Box::new(address_api),
        store: BookingStore::new(),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/booking/:session", get(handlers::booking::get_state))
        .route("/api/booking/:session", post(handlers::booking::update_state))
        .route(
            "/api/booking/:session/schedule",
            post(handlers::booking::set_schedule),
        )
        .route(
            "/api/booking/:session/flow/service",
            post(handlers::booking::set_service_flow),
        )
        .route(
            "/api/booking/:session/flow/provider",
            post(handlers::booking::set_provider_flow),
        )
        .route("/api/booking/:session/submit", post(handlers::booking::submit))
        .route(
            "/api/booking/:session/events",
            get(handlers::booking::events_stream),
        )
        .route("/api/addresses/:user", get(handlers::addresses::list_addresses))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
