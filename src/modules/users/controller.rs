use athenaeum_core::{AppError, ErrorBody};
use athenaeum_models::{UpdateStatusRequest, UserProfile};
use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::role::RequireAdmin;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Activate or deactivate an account (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Account status updated", body = UserProfile),
        (status = 400, description = "Admins cannot deactivate themselves", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_user_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.users.set_active(&admin, id, dto.is_active).await?;
    Ok(Json(profile))
}
