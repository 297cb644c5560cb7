use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, ApiPath, ApiQuery, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    models::{QuizResult, SubmitQuiz},
    services::Populated,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuery {
    pub quiz_id: Option<Uuid>,
}

/// Submit quiz answers. The score is always computed server-side.
#[tracing::instrument(name = "api.results.create", skip(state, ctx, input), fields(quiz_id = %input.quiz_id))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<SubmitQuiz>,
) -> Result<(StatusCode, Json<Envelope<QuizResult>>), ApiError> {
    let result = state.services.results.submit(ctx.require()?, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(result))))
}

#[tracing::instrument(name = "api.results.by_quiz", skip(state, ctx))]
pub async fn by_quiz(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiQuery(query): ApiQuery<ResultQuery>,
) -> Result<Json<Envelope<Vec<Populated<QuizResult>>>>, ApiError> {
    let quiz_id = query
        .quiz_id
        .ok_or_else(|| ApiError::validation("Quiz ID is required"))?;
    let results = state
        .services
        .results
        .by_quiz(ctx.require()?, quiz_id)
        .await?;
    Ok(Json(Envelope::list(results)))
}

#[tracing::instrument(name = "api.results.by_user", skip(state, ctx), fields(%user_id))]
pub async fn by_user(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Vec<QuizResult>>>, ApiError> {
    let results = state
        .services
        .results
        .by_user(ctx.require()?, user_id)
        .await?;
    Ok(Json(Envelope::list(results)))
}

#[tracing::instrument(name = "api.results.get", skip(state, ctx), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Populated<QuizResult>>>, ApiError> {
    let result = state.services.results.get(ctx.require()?, id).await?;
    Ok(Json(Envelope::data(result)))
}
