use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::{count_questions, get_questions_for_category},
        },
        Category,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResult},
        extractors::ApiPath,
    },
};

use super::questions::QuestionsResponse;

/// Category id to label, serialised as a JSON object in id order.
pub type CategoryMap = BTreeMap<i64, String>;

pub fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: CategoryMap,
}

async fn list_categories(State(pool): State<SqlitePool>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = get_all_categories(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

#[tracing::instrument(skip(pool))]
async fn questions_for_category(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<QuestionsResponse>> {
    let category = get_category(&pool, id).await?.ok_or(ApiError::NotFound)?;
    let questions = get_questions_for_category(&pool, category.id).await?;
    Ok(Json(QuestionsResponse {
        success: true,
        questions,
        total_questions: count_questions(&pool).await?,
        categories: None,
        current_category: Some(category.kind),
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
