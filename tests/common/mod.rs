#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use trivia_api::config::DatabaseSettings;
use trivia_api::db::{self, transfer};
use trivia_api::quiz::RandomPicker;
use trivia_api::server::app::{build_router, AppState};

/// A migrated, seeded database in its own temporary directory plus a router over it.
pub struct TestApp {
    pub pool: SqlitePool,
    pub router: Router,
    _dir: TempDir,
}

pub fn seed_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

pub async fn empty_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("trivia_test.db").display());
    let settings = DatabaseSettings {
        url: SecretString::from(url),
        max_connections: 2,
    };
    let pool = db::establish_connection(&settings).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    (pool, dir)
}

impl TestApp {
    pub async fn seeded() -> Self {
        let (pool, dir) = empty_db().await;
        transfer::import_data(&pool, seed_dir()).await.unwrap();
        Self::with_pool(pool, dir)
    }

    pub async fn unseeded() -> Self {
        let (pool, dir) = empty_db().await;
        Self::with_pool(pool, dir)
    }

    fn with_pool(pool: SqlitePool, dir: TempDir) -> Self {
        let state = AppState::new(pool.clone(), Arc::new(RandomPicker::seeded(1)));
        Self {
            pool,
            router: build_router(state),
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}
