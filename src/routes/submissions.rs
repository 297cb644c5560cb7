use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, ApiPath, ApiQuery, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    models::{CreateSubmission, GradeSubmission, Submission},
    services::Populated,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQuery {
    pub assignment_id: Option<Uuid>,
}

/// Submit work for an assignment before its deadline.
#[tracing::instrument(name = "api.submissions.create", skip(state, ctx, input), fields(assignment_id = %input.assignment_id))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<CreateSubmission>,
) -> Result<(StatusCode, Json<Envelope<Submission>>), ApiError> {
    let submission = state
        .services
        .submissions
        .submit(ctx.require()?, input, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(submission))))
}

/// Every submission for one assignment, with the submitting student.
#[tracing::instrument(name = "api.submissions.by_assignment", skip(state, ctx))]
pub async fn by_assignment(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiQuery(query): ApiQuery<SubmissionQuery>,
) -> Result<Json<Envelope<Vec<Populated<Submission>>>>, ApiError> {
    let assignment_id = query
        .assignment_id
        .ok_or_else(|| ApiError::validation("Assignment ID is required"))?;
    let submissions = state
        .services
        .submissions
        .by_assignment(ctx.require()?, assignment_id)
        .await?;
    Ok(Json(Envelope::list(submissions)))
}

#[tracing::instrument(name = "api.submissions.mine", skip(state, ctx))]
pub async fn mine(
    State(state): State<AppState>,
    ctx: CallerContext,
) -> Result<Json<Envelope<Vec<Submission>>>, ApiError> {
    let submissions = state.services.submissions.mine(ctx.require()?).await?;
    Ok(Json(Envelope::list(submissions)))
}

#[tracing::instrument(name = "api.submissions.get", skip(state, ctx), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Populated<Submission>>>, ApiError> {
    let submission = state.services.submissions.get(ctx.require()?, id).await?;
    Ok(Json(Envelope::data(submission)))
}

#[tracing::instrument(name = "api.submissions.grade", skip(state, ctx, input), fields(%id, grade = input.grade))]
pub async fn grade(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<GradeSubmission>,
) -> Result<Json<Envelope<Populated<Submission>>>, ApiError> {
    let submission = state
        .services
        .submissions
        .grade(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(submission)))
}
