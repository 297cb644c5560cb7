use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use uuid::Uuid;

use super::{ApiError, ApiPath, ApiQuery, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    models::{Attendance, AttendanceFilter, MarkAttendance},
    services::Populated,
};

type AttendanceList = Json<Envelope<Vec<Populated<Attendance>>>>;

/// Upsert one record per listed student for the given course and day.
#[tracing::instrument(
    name = "api.attendance.mark",
    skip(state, ctx, input),
    fields(course_id = %input.course_id, date = %input.date, students = input.attendance_records.len())
)]
pub async fn mark(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<MarkAttendance>,
) -> Result<(StatusCode, Json<Envelope<Vec<Attendance>>>), ApiError> {
    let records = state.services.attendance.mark(ctx.require()?, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::list(records))))
}

#[tracing::instrument(name = "api.attendance.by_course", skip(state, ctx), fields(%course_id))]
pub async fn by_course(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(course_id): ApiPath<Uuid>,
    ApiQuery(filter): ApiQuery<AttendanceFilter>,
) -> Result<AttendanceList, ApiError> {
    let records = state
        .services
        .attendance
        .by_course(ctx.require()?, course_id, filter.date)
        .await?;
    Ok(Json(Envelope::list(records)))
}

#[tracing::instrument(name = "api.attendance.by_student", skip(state, ctx), fields(%student_id))]
pub async fn by_student(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(student_id): ApiPath<Uuid>,
    ApiQuery(filter): ApiQuery<AttendanceFilter>,
) -> Result<AttendanceList, ApiError> {
    let records = state
        .services
        .attendance
        .by_student(ctx.require()?, student_id, filter.course_id)
        .await?;
    Ok(Json(Envelope::list(records)))
}

#[tracing::instrument(name = "api.attendance.by_date", skip(state, ctx), fields(%date))]
pub async fn by_date(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(date): ApiPath<NaiveDate>,
    ApiQuery(filter): ApiQuery<AttendanceFilter>,
) -> Result<AttendanceList, ApiError> {
    let records = state
        .services
        .attendance
        .by_date(ctx.require()?, date, filter.course_id)
        .await?;
    Ok(Json(Envelope::list(records)))
}
