use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::quiz::{QuestionPicker, RandomPicker};

use super::error::{ApiError, ApiResult};
use super::routes::{category_router, questions_router, quizzes_router};

pub type SharedPicker = Arc<dyn QuestionPicker>;

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
    picker: SharedPicker,
}

impl AppState {
    pub fn new(pool: SqlitePool, picker: SharedPicker) -> Self {
        Self { pool, picker }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::NotFound
        })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(settings: Settings, pool: SqlitePool) -> anyhow::Result<()> {
    let addr = settings.application.address()?;
    let picker: SharedPicker = match settings.quiz.seed {
        Some(seed) => Arc::new(RandomPicker::seeded(seed)),
        None => Arc::new(RandomPicker::from_entropy()),
    };
    let app = build_router(AppState::new(pool, picker));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder
        .encode(&metrics, &mut buf)
        .context("Failed to encode metrics")?;
    let content_type =
        HeaderValue::from_str(encoder.format_type()).context("Invalid metrics content type")?;
    Ok(([(header::CONTENT_TYPE, content_type)], buf))
}
