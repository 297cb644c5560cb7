use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{ApiError, ApiPath, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    models::{CreateEnrollment, Enrollment, UpdateEnrollment},
    services::Populated,
};

type EnrollmentList = Json<Envelope<Vec<Populated<Enrollment>>>>;

/// Enroll the caller in an active course.
#[tracing::instrument(name = "api.enrollments.create", skip(state, ctx, input), fields(course_id = %input.course_id))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<CreateEnrollment>,
) -> Result<(StatusCode, Json<Envelope<Populated<Enrollment>>>), ApiError> {
    let enrollment = state
        .services
        .enrollments
        .enroll(ctx.require()?, input)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(enrollment))))
}

#[tracing::instrument(name = "api.enrollments.mine", skip(state, ctx))]
pub async fn mine(
    State(state): State<AppState>,
    ctx: CallerContext,
) -> Result<EnrollmentList, ApiError> {
    let enrollments = state.services.enrollments.mine(ctx.require()?).await?;
    Ok(Json(Envelope::list(enrollments)))
}

#[tracing::instrument(name = "api.enrollments.by_course", skip(state, ctx), fields(%course_id))]
pub async fn by_course(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<EnrollmentList, ApiError> {
    let enrollments = state
        .services
        .enrollments
        .by_course(ctx.require()?, course_id)
        .await?;
    Ok(Json(Envelope::list(enrollments)))
}

#[tracing::instrument(name = "api.enrollments.by_user", skip(state, ctx), fields(%user_id))]
pub async fn by_user(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<EnrollmentList, ApiError> {
    let enrollments = state
        .services
        .enrollments
        .by_user(ctx.require()?, user_id)
        .await?;
    Ok(Json(Envelope::list(enrollments)))
}

/// Record progress or a grade. Reaching 100% progress stamps `completedAt`.
#[tracing::instrument(name = "api.enrollments.update", skip(state, ctx, input), fields(%id))]
pub async fn update(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateEnrollment>,
) -> Result<Json<Envelope<Populated<Enrollment>>>, ApiError> {
    let enrollment = state
        .services
        .enrollments
        .update(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(enrollment)))
}

#[tracing::instrument(name = "api.enrollments.delete", skip(state, ctx), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.services.enrollments.delete(ctx.require()?, id).await?;
    Ok(Json(Envelope::message("Successfully unenrolled from course")))
}
