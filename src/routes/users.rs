use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{ApiError, ApiPath, ApiQuery, Envelope, ValidJson};
use crate::{
    AppState,
    auth::CallerContext,
    db::PageParams,
    models::{ChangeRole, CreateUser, UpdateUser, User, UserFilter},
};

/// List users, newest first. Admin only.
#[tracing::instrument(name = "api.users.list", skip(state, ctx))]
pub async fn list(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> Result<Json<Envelope<Vec<User>>>, ApiError> {
    let page = state
        .services
        .users
        .list(ctx.require()?, filter, params)
        .await?;
    Ok(Json(page.into()))
}

#[tracing::instrument(name = "api.users.create", skip(state, ctx, input), fields(email = %input.email))]
pub async fn create(
    State(state): State<AppState>,
    ctx: CallerContext,
    ValidJson(input): ValidJson<CreateUser>,
) -> Result<(StatusCode, Json<Envelope<User>>), ApiError> {
    let user = state.services.users.create(ctx.require()?, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(user))))
}

#[tracing::instrument(name = "api.users.get", skip(state, ctx), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let user = state.services.users.get(ctx.require()?, id).await?;
    Ok(Json(Envelope::data(user)))
}

/// Update profile fields. Changing `role` or `isActive` requires an admin.
#[tracing::instrument(name = "api.users.update", skip(state, ctx, input), fields(%id))]
pub async fn update(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateUser>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let user = state
        .services
        .users
        .update(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(user)))
}

#[tracing::instrument(name = "api.users.delete", skip(state, ctx), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.services.users.delete(ctx.require()?, id).await?;
    Ok(Json(Envelope::message("User removed")))
}

#[tracing::instrument(name = "api.users.change_role", skip(state, ctx, input), fields(%id, role = %input.role))]
pub async fn change_role(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<ChangeRole>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let user = state
        .services
        .users
        .change_role(ctx.require()?, id, input)
        .await?;
    Ok(Json(Envelope::data(user)))
}
