use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cut_packer::PackError;
use cut_packer::solver::Packer;
use cut_packer::types::{Bin, Demand, SearchBudget, SearchStats, Solution};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    capacity: f64,
    cuts: Vec<Demand>,
    #[serde(default)]
    buffer: f64,
    #[serde(flatten)]
    budget: SearchBudget,
}

#[derive(Debug, Serialize)]
struct OptimizeResponse {
    bins: Vec<Bin>,
    capacity: f64,
    buffer: f64,
    bin_count: usize,
    total_unused: f64,
    waste_percent: f64,
    stats: SearchStats,
}

impl From<Solution> for OptimizeResponse {
    fn from(solution: Solution) -> Self {
        Self {
            bin_count: solution.bin_count(),
            total_unused: solution.total_unused(),
            waste_percent: solution.total_waste_percent(),
            capacity: solution.capacity,
            buffer: solution.buffer,
            stats: solution.stats,
            bins: solution.bins,
        }
    }
}

fn error_status(err: &PackError) -> StatusCode {
    if err.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

fn solve(req: OptimizeRequest) -> Result<OptimizeResponse, (StatusCode, String)> {
    let packer = Packer::new(req.capacity, req.buffer).with_budget(req.budget);
    packer
        .pack_demands(&req.cuts)
        .map(OptimizeResponse::from)
        .map_err(|e| (error_status(&e), e.to_string()))
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let response = tokio::task::spawn_blocking(move || solve(req))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let _sentry = sentry::init(sentry::ClientOptions {
        dsn: std::env::var("SENTRY_DSN").ok().and_then(|dsn| dsn.parse().ok()),
        release: sentry::release_name!(),
        ..Default::default()
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
