// Audience Ranking - Web Server
// Read-only JSON API over the leaderboards (Axum)

use anyhow::Context;
use audience_ranking::{
    init_logging, load_entrants, load_latest_snapshot, Entrant, JoinEngine, Leaderboard,
    RankingConfig, RankingError, ResultClassifier, Round, SortSpec, StatsSnapshot,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Loaded once at startup, shared read-only by every request
struct Dataset {
    entrants: Vec<Entrant>,
    snapshot: StatsSnapshot,
    engine: JoinEngine,
    default_sort: SortSpec,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    data: Arc<Dataset>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Per-round overview
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundSummary {
    round: Round,
    rows: usize,
    unmatched_count: usize,
    total_views: u64,
}

/// ?sort=viewCount&dir=desc&type=number
#[derive(Debug, Deserialize)]
struct RankingQuery {
    sort: Option<String>,
    dir: Option<String>,
    #[serde(rename = "type")]
    value_type: Option<String>,
}

impl RankingQuery {
    fn to_spec(&self, default: SortSpec) -> Result<SortSpec, RankingError> {
        default.overlay(
            self.sort.as_deref(),
            self.dir.as_deref(),
            self.value_type.as_deref(),
        )
    }
}

fn bad_request(err: RankingError) -> axum::response::Response {
    tracing::debug!(error = %err, "rejected ranking request");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::err(err.to_string())),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/rounds - Row and view totals for every round
async fn get_rounds(State(state): State<AppState>) -> impl IntoResponse {
    let data = &state.data;

    let summaries: Vec<RoundSummary> = Round::ALL
        .iter()
        .map(|round| {
            let board = Leaderboard::build(
                &data.engine,
                *round,
                &data.entrants,
                &data.snapshot,
                data.default_sort,
            );
            RoundSummary {
                round: *round,
                rows: board.rows.len(),
                unmatched_count: board.unmatched_count,
                total_views: board.total_views(),
            }
        })
        .collect();

    Json(ApiResponse::ok(summaries))
}

/// GET /api/rounds/:round/rankings - Sorted leaderboard for one round
async fn get_rankings(
    State(state): State<AppState>,
    Path(round): Path<String>,
    Query(query): Query<RankingQuery>,
) -> impl IntoResponse {
    let data = &state.data;

    let round: Round = match round.parse() {
        Ok(round) => round,
        Err(e) => return bad_request(e),
    };

    let sort = match query.to_spec(data.default_sort) {
        Ok(sort) => sort,
        Err(e) => return bad_request(e),
    };

    let board = Leaderboard::build(&data.engine, round, &data.entrants, &data.snapshot, sort);
    (StatusCode::OK, Json(ApiResponse::ok(board))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(1);

    println!("🌐 Audience Ranking - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config_path = std::env::var("RANKING_CONFIG").ok();
    let config = RankingConfig::load(config_path.as_deref().map(std::path::Path::new))?;

    let entrants = load_entrants(&config.competitors_path)?;
    let snapshot = load_latest_snapshot(&config.stats_path)?;
    println!(
        "✓ {} entrants, snapshot {} ({} videos)",
        entrants.len(),
        snapshot.date,
        snapshot.videos.len()
    );

    let engine = JoinEngine::new(config.reference_date)
        .with_classifier(ResultClassifier::with_labels(config.labels.clone()));

    // Create shared state
    let state = AppState {
        data: Arc::new(Dataset {
            entrants,
            snapshot,
            engine,
            default_sort: config.sort,
        }),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/rounds", get(get_rounds))
        .route("/rounds/:round/rankings", get(get_rankings))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = std::env::var("RANKING_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/rounds/final/rankings?sort=viewCount&dir=desc", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server stopped with an error")?;

    Ok(())
}
