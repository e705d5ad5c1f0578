use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use clap::Parser;
use panel_planner::config::PlannerConfig;
use panel_planner::types::{CalculationRequest, CalculationResponse};
use panel_planner::{PlanError, Planner, Strategy};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Parser)]
#[command(name = "server", about = "HTTP front end for the panel cutting planner")]
struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind: String,

    /// Append-only log destination
    #[arg(long, env = "LOG_FILE", default_value = "development.log")]
    log_file: String,

    #[command(flatten)]
    planner: PlannerConfig,
}

type SharedPlanner = Arc<Planner>;

#[derive(Deserialize)]
struct MethodQuery {
    method: String,
}

async fn calculate(
    State(planner): State<SharedPlanner>,
    Query(query): Query<MethodQuery>,
    Json(req): Json<CalculationRequest>,
) -> Result<Json<CalculationResponse>, (StatusCode, String)> {
    tracing::info!(
        method = %query.method,
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /calculate"
    );

    let strategy: Strategy = query
        .method
        .parse()
        .map_err(|e: PlanError| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // Packing is CPU-bound and blocking.
    let joined = tokio::task::spawn_blocking(move || planner.calculate_with(&req, strategy)).await;

    match joined {
        Ok(Ok(response)) => Ok(Json(response)),
        Ok(Err(e)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "calculation task aborted");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("calculation aborted: {e}"),
            ))
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cutting-optimizer",
    }))
}

fn app(planner: SharedPlanner) -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/health", get(health))
        .route("/calculate", post(calculate))
        .with_state(planner)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn main() {
    let config = ServerConfig::parse();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .unwrap_or_else(|e| {
            eprintln!("failed to open {}: {e}", config.log_file);
            std::process::exit(1);
        });

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("failed to start runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(serve(config));
}

async fn serve(config: ServerConfig) {
    let planner = Arc::new(config.planner.build(panel_planner::solver::GuillotinePacker::new()));
    let addr = format!("{}:{}", config.bind, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    eprintln!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app(planner)).await {
        tracing::error!(error = %e, "server stopped");
        eprintln!("server error: {e}");
    }
}
