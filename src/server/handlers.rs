use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::target::{Coordinate, FallbackEntry, TargetLocation};

use super::state::AppState;

/// Upper bound for a per-request attempt override.
const MAX_ATTEMPTS_PARAM: u32 = 50;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/target ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TargetQuery {
    pub attempts: Option<u32>,
}

#[derive(Serialize)]
pub struct TargetResponse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub formatted_coords: String,
    pub source: String,
    pub attempts: u32,
}

impl From<TargetLocation> for TargetResponse {
    fn from(target: TargetLocation) -> Self {
        Self {
            name: target.name,
            lat: target.coordinate.lat,
            lon: target.coordinate.lon,
            formatted_coords: target.coordinate.to_string(),
            source: target.source.to_string(),
            attempts: target.attempts,
        }
    }
}

pub async fn target(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TargetQuery>,
) -> Result<Json<TargetResponse>, Response> {
    let start = Instant::now();

    if let Some(attempts) = params.attempts {
        if !(1..=MAX_ATTEMPTS_PARAM).contains(&attempts) {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("attempts must be between 1 and {}", MAX_ATTEMPTS_PARAM),
            )
            .into_response());
        }
    }

    // Selection blocks on up to a dozen oracle round-trips.
    let attempts_override = params.attempts;
    let task_state = state.clone();
    let picked = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::from_entropy();
        match attempts_override {
            Some(ceiling) => task_state.selector.select_with_attempts(&mut rng, ceiling),
            None => task_state.selector.select(&mut rng),
        }
    })
    .await
    .map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("selection task failed: {}", e),
        )
        .into_response()
    })?;

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/target -> {} [{}] ({} attempts, {:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        picked.name,
        picked.source,
        picked.attempts,
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(TargetResponse::from(picked)))
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub formatted_coords: String,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, Response> {
    let start = Instant::now();

    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Provide 'lat' and 'lon' parameters",
            )
            .into_response())
        }
    };
    if !Coordinate::in_range(lat, lon) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lon: -180..180",
        )
        .into_response());
    }
    let coordinate = Coordinate::new(lat, lon);

    let task_state = state.clone();
    let resolved = tokio::task::spawn_blocking(move || task_state.selector.resolve(coordinate))
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("resolve task failed: {}", e),
            )
            .into_response()
        })?;

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/resolve?lat={}&lon={} -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        lat,
        lon,
        resolved.as_deref().unwrap_or("uninhabited"),
        elapsed.as_secs_f64() * 1000.0,
    );

    match resolved {
        Some(name) => Ok(Json(ResolveResponse {
            name,
            lat,
            lon,
            formatted_coords: coordinate.to_string(),
        })),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No habitable place at {}", coordinate),
        )
        .into_response()),
    }
}

// ─── GET /api/catalog ────────────────────────────────────────────

pub async fn catalog(State(state): State<Arc<AppState>>) -> Json<Vec<FallbackEntry>> {
    Json(state.selector.catalog().entries().to_vec())
}
