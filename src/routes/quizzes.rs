use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{ApiError, ApiPath, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    models::{CreateQuiz, Quiz, UpdateQuiz},
    services::Populated,
};

type QuizBody = Json<Envelope<Populated<Quiz>>>;
type QuizList = Json<Envelope<Vec<Populated<Quiz>>>>;

#[tracing::instrument(name = "api.quizzes.list", skip(state, ctx))]
pub async fn list(State(state): State<AppState>, ctx: CallerContext) -> Result<QuizList, ApiError> {
    let quizzes = state.services.quizzes.list(ctx.require()?).await?;
    Ok(Json(Envelope::list(quizzes)))
}

#[tracing::instrument(name = "api.quizzes.by_course", skip(state, ctx), fields(%course_id))]
pub async fn by_course(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<QuizList, ApiError> {
    let quizzes = state
        .services
        .quizzes
        .by_course(ctx.require()?, course_id)
        .await?;
    Ok(Json(Envelope::list(quizzes)))
}

#[tracing::instrument(name = "api.quizzes.get", skip(state, ctx), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<QuizBody, ApiError> {
    let quiz = state.services.quizzes.get(ctx.require()?, id).await?;
    Ok(Json(Envelope::data(quiz)))
}

#[tracing::instrument(name = "api.quizzes.create", skip(state, ctx, input), fields(course_id = %input.course_id))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<CreateQuiz>,
) -> Result<(StatusCode, QuizBody), ApiError> {
    let quiz = state.services.quizzes.create(ctx.require()?, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(quiz))))
}

#[tracing::instrument(name = "api.quizzes.update", skip(state, ctx, input), fields(%id))]
pub async fn update(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateQuiz>,
) -> Result<QuizBody, ApiError> {
    let quiz = state
        .services
        .quizzes
        .update(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(quiz)))
}

#[tracing::instrument(name = "api.quizzes.delete", skip(state, ctx), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.services.quizzes.delete(ctx.require()?, id).await?;
    Ok(Json(Envelope::message("Quiz removed")))
}
