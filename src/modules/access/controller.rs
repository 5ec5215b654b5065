use anyhow::anyhow;
use athenaeum_core::{AppError, ErrorBody};
use athenaeum_models::{Level, LevelAccessResponse};
use axum::Json;
use axum::extract::Path;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_level;

/// Check whether the caller may open resources tagged with `level`
#[utoipa::path(
    get,
    path = "/api/access/levels/{level}",
    params(("level" = Level, Path, description = "Resource level, e.g. L300")),
    responses(
        (status = 200, description = "Caller may access this level", body = LevelAccessResponse),
        (status = 400, description = "Unknown level", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Caller's level is too low", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Access"
)]
#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn check_level_access(
    AuthUser(user): AuthUser,
    Path(level): Path<String>,
) -> Result<Json<LevelAccessResponse>, AppError> {
    let level: Level = level
        .parse()
        .map_err(|e| AppError::bad_request(anyhow!("{}", e)))?;
    check_level(&user, level)?;

    Ok(Json(LevelAccessResponse {
        level,
        allowed: true,
    }))
}
