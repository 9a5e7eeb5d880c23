use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{get_all_questions, get_questions_for_category},
        Question,
    },
    quiz::{next_question, ALL_CATEGORIES},
    server::{
        app::{AppState, SharedPicker},
        error::ApiResult,
        extractors::ApiJson,
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

#[derive(Debug, Deserialize)]
struct QuizBody {
    #[serde(default)]
    previous_questions: Option<Vec<i64>>,
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
}

// clients also send the category label as `type`, it carries no meaning here
#[derive(Debug, Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    id: Option<i64>,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

#[tracing::instrument(skip(pool, picker))]
async fn play_quiz(
    State(pool): State<SqlitePool>,
    State(picker): State<SharedPicker>,
    ApiJson(body): ApiJson<QuizBody>,
) -> ApiResult<Json<QuizResponse>> {
    let category = body
        .quiz_category
        .and_then(|c| c.id)
        .unwrap_or(ALL_CATEGORIES);
    let candidates = if category == ALL_CATEGORIES {
        get_all_questions(&pool).await?
    } else {
        get_questions_for_category(&pool, category).await?
    };
    let previous = body.previous_questions.unwrap_or_default();

    let question = next_question(candidates, &previous, picker.as_ref());
    match &question {
        Some(q) => {
            let label = if category == ALL_CATEGORIES {
                "all".to_owned()
            } else {
                category.to_string()
            };
            QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
            tracing::debug!("Serving question {}", q.id);
        }
        None => tracing::debug!("No questions left after {} asked", previous.len()),
    }
    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
