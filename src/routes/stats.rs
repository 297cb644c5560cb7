use axum::{Json, extract::State};

use super::{ApiError, Envelope};
use crate::{AppState, auth::CallerContext, models::Stats};

/// Collection totals and breakdowns for the admin dashboard.
#[tracing::instrument(name = "api.admin.stats", skip(state, ctx))]
pub async fn overview(
    State(state): State<AppState>,
    ctx: CallerContext,
) -> Result<Json<Envelope<Stats>>, ApiError> {
    let stats = state.services.stats.overview(ctx.require()?).await?;
    Ok(Json(Envelope::data(stats)))
}
