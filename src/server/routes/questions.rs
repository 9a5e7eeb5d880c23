use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize, Serializer};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{category_exists, get_all_categories},
            questions::{self, count_questions, get_questions_page, search_questions},
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::{default_page, deserialize_page, FIRST_PAGE},
        error::{ApiError, ApiResult},
        extractors::{ApiJson, ApiPath, ApiQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::categories::{category_map, CategoryMap};

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// Body shared by the listing, search and per-category endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryMap>,
    #[serde(serialize_with = "false_if_none")]
    pub current_category: Option<String>,
}

// clients test `currentCategory` for truthiness, so "no category" is `false`
fn false_if_none<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(label) => serializer.serialize_str(label),
        None => serializer.serialize_bool(false),
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default = "default_page", deserialize_with = "deserialize_page")]
    page: i64,
}

// Every field is optional here so a missing or null value turns into a 422 envelope
// rather than a deserialization failure.
#[derive(Debug, Deserialize)]
struct CreateQuestionBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

impl CreateQuestionBody {
    fn validate(self) -> ApiResult<NewQuestion> {
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        match (
            non_blank(self.question),
            non_blank(self.answer),
            self.category,
            self.difficulty,
        ) {
            (Some(question), Some(answer), Some(category), Some(difficulty)) => Ok(NewQuestion {
                question,
                answer,
                category,
                difficulty,
            }),
            _ => Err(ApiError::Unprocessable),
        }
    }
}

#[derive(Serialize)]
struct CreatedResponse {
    success: bool,
    #[serde(flatten)]
    question: Question,
}

#[derive(Serialize)]
struct DeletedResponse {
    success: bool,
    deleted: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    #[serde(default)]
    search_term: Option<String>,
}

#[tracing::instrument(skip(pool))]
async fn list_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<QuestionsResponse>> {
    if query.page < FIRST_PAGE {
        return Err(ApiError::NotFound);
    }
    let offset = (query.page - 1)
        .checked_mul(QUESTIONS_PER_PAGE)
        .ok_or(ApiError::NotFound)?;
    let questions = get_questions_page(&pool, QUESTIONS_PER_PAGE, offset).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(QuestionsResponse {
        success: true,
        questions,
        total_questions: count_questions(&pool).await?,
        categories: Some(category_map(get_all_categories(&pool).await?)),
        current_category: None,
    }))
}

#[tracing::instrument(skip(pool))]
async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeletedResponse>> {
    if !questions::delete_question(&pool, id).await? {
        return Err(ApiError::Unprocessable);
    }
    QUESTIONS_DELETED.inc();
    tracing::info!("Deleted question {id}");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
    }))
}

#[tracing::instrument(skip(pool))]
async fn create_question(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<CreateQuestionBody>,
) -> ApiResult<Json<CreatedResponse>> {
    let new_question = body.validate()?;
    if !category_exists(&pool, new_question.category).await? {
        return Err(ApiError::Unprocessable);
    }
    let id = questions::create_question(&pool, &new_question).await?;
    QUESTIONS_CREATED.inc();
    tracing::info!("Created question {id}");
    Ok(Json(CreatedResponse {
        success: true,
        question: new_question.into_question(id),
    }))
}

#[tracing::instrument(skip(pool))]
async fn search(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<SearchBody>,
) -> ApiResult<Json<QuestionsResponse>> {
    let term = body.search_term.unwrap_or_default();
    let questions = search_questions(&pool, &term).await?;
    Ok(Json(QuestionsResponse {
        success: true,
        questions,
        total_questions: count_questions(&pool).await?,
        categories: None,
        current_category: None,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/create", post(create_question))
        .route("/questions/search", post(search))
        .with_state(state)
}
