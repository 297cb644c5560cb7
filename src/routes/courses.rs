use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{ApiError, ApiPath, ApiQuery, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    db::PageParams,
    models::{Course, CourseFilter, CreateCourse, UpdateCourse},
    services::Populated,
};

type CourseBody = Json<Envelope<Populated<Course>>>;

/// Public catalog of active courses, with the instructor embedded.
#[tracing::instrument(name = "api.courses.list", skip(state, ctx))]
pub async fn list(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<CourseFilter>,
) -> Result<Json<Envelope<Vec<Populated<Course>>>>, ApiError> {
    let page = state
        .services
        .courses
        .list(ctx.caller(), filter, params)
        .await?;
    Ok(Json(page.into()))
}

#[tracing::instrument(name = "api.courses.by_category", skip(state, ctx), fields(%category))]
pub async fn by_category(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(category): ApiPath<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Envelope<Vec<Populated<Course>>>>, ApiError> {
    let page = state
        .services
        .courses
        .by_category(ctx.caller(), category, params)
        .await?;
    Ok(Json(page.into()))
}

/// Courses the caller teaches, or for students the courses they are enrolled in.
#[tracing::instrument(name = "api.courses.my_courses", skip(state, ctx))]
pub async fn my_courses(
    State(state): State<AppState>,
    ctx: CallerContext,
) -> Result<Json<Envelope<Vec<Populated<Course>>>>, ApiError> {
    let courses = state.services.courses.my_courses(ctx.require()?).await?;
    Ok(Json(Envelope::list(courses)))
}

#[tracing::instrument(name = "api.courses.get", skip(state, ctx), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<CourseBody, ApiError> {
    let course = state.services.courses.get(ctx.caller(), id).await?;
    Ok(Json(Envelope::data(course)))
}

#[tracing::instrument(name = "api.courses.create", skip(state, ctx, input), fields(title = %input.title))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<CreateCourse>,
) -> Result<(StatusCode, CourseBody), ApiError> {
    let course = state.services.courses.create(ctx.require()?, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(course))))
}

#[tracing::instrument(name = "api.courses.update", skip(state, ctx, input), fields(%id))]
pub async fn update(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateCourse>,
) -> Result<CourseBody, ApiError> {
    let course = state
        .services
        .courses
        .update(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(course)))
}

#[tracing::instrument(name = "api.courses.delete", skip(state, ctx), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.services.courses.delete(ctx.require()?, id).await?;
    Ok(Json(Envelope::message("Course removed")))
}
