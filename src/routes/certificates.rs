use axum::{Json, extract::State};
use chrono::Utc;
use uuid::Uuid;

use super::{ApiError, ApiPath, Envelope};
use crate::{AppState, auth::CallerContext, models::Certificate};

/// Build the completion certificate for a finished enrollment.
#[tracing::instrument(name = "api.certificates.generate", skip(state, ctx), fields(%enrollment_id))]
pub async fn generate(
    State(state): State<AppState>,
    ctx: CallerContext,
    ApiPath(enrollment_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<Certificate>>, ApiError> {
    let certificate = state
        .services
        .certificates
        .generate(ctx.require()?, enrollment_id, Utc::now())
        .await?;
    Ok(Json(
        Envelope::data(certificate).with_message("Certificate generated successfully"),
    ))
}
