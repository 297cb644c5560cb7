use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{ApiError, ApiPath, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    models::{Assignment, CreateAssignment, UpdateAssignment},
    services::Populated,
};

type AssignmentBody = Json<Envelope<Populated<Assignment>>>;
type AssignmentList = Json<Envelope<Vec<Populated<Assignment>>>>;

/// All assignments. Students only see active ones.
#[tracing::instrument(name = "api.assignments.list", skip(state, ctx))]
pub async fn list(
    State(state): State<AppState>,
    ctx: CallerContext,
) -> Result<AssignmentList, ApiError> {
    let assignments = state.services.assignments.list(ctx.require()?).await?;
    Ok(Json(Envelope::list(assignments)))
}

#[tracing::instrument(name = "api.assignments.by_course", skip(state, ctx), fields(%course_id))]
pub async fn by_course(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<AssignmentList, ApiError> {
    let assignments = state
        .services
        .assignments
        .by_course(ctx.require()?, course_id)
        .await?;
    Ok(Json(Envelope::list(assignments)))
}

#[tracing::instrument(name = "api.assignments.get", skip(state, ctx), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<AssignmentBody, ApiError> {
    let assignment = state.services.assignments.get(ctx.require()?, id).await?;
    Ok(Json(Envelope::data(assignment)))
}

#[tracing::instrument(name = "api.assignments.create", skip(state, ctx, input), fields(course_id = %input.course_id))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<CreateAssignment>,
) -> Result<(StatusCode, AssignmentBody), ApiError> {
    let assignment = state
        .services
        .assignments
        .create(ctx.require()?, input)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(assignment))))
}

#[tracing::instrument(name = "api.assignments.update", skip(state, ctx, input), fields(%id))]
pub async fn update(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateAssignment>,
) -> Result<AssignmentBody, ApiError> {
    let assignment = state
        .services
        .assignments
        .update(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(assignment)))
}

#[tracing::instrument(name = "api.assignments.delete", skip(state, ctx), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.services.assignments.delete(ctx.require()?, id).await?;
    Ok(Json(Envelope::message("Assignment removed")))
}
