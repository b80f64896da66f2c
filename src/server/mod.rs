mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::target::{NominatimReverse, TargetSelector};

pub fn build_router(selector: TargetSelector<NominatimReverse>) -> Router {
    let state = Arc::new(AppState { selector });

    Router::new()
        .route("/api/target", get(handlers::target))
        .route("/api/resolve", get(handlers::resolve))
        .route("/api/catalog", get(handlers::catalog))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(selector: TargetSelector<NominatimReverse>, host: &str, port: u16) {
    let app = build_router(selector);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Terra Dart server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
