use crate::config::RelayConfig;
use crate::tmdb::{RelayUpstream, TmdbClient, UpstreamResponse};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

pub const POPULAR_ERROR: &str = "Failed to fetch popular movies";
pub const SEARCH_ERROR: &str = "Failed to search movies";

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn RelayUpstream>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    query: String,
}

pub async fn run_server(config: RelayConfig) -> Result<()> {
    let upstream: Arc<dyn RelayUpstream> = Arc::new(TmdbClient::for_relay(&config)?);
    info!("Relaying catalog requests to {}", config.tmdb_base_url);

    let app = build_router(AppState { upstream });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server running on port {}", config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/popular", get(popular))
        .route("/api/search", get(search))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn popular(State(state): State<AppState>) -> Response {
    match state.upstream.popular_raw().await {
        Ok(res) => passthrough(res),
        Err(e) => {
            error!("Popular movies request failed: {:#}", e);
            failure(POPULAR_ERROR)
        }
    }
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    debug!("Search request for '{}'", params.query);
    match state.upstream.search_raw(&params.query).await {
        Ok(res) => passthrough(res),
        Err(e) => {
            error!("Search request failed: {:#}", e);
            failure(SEARCH_ERROR)
        }
    }
}

fn passthrough(res: UpstreamResponse) -> Response {
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::OK);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        res.body,
    )
        .into_response()
}

fn failure(message: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
