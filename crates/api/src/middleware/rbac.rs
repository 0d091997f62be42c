//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not match. The lifecycle services repeat the check, so these only make
//! the rejection happen before any body is parsed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use errand_core::error::CoreError;
use errand_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != role {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "{role} role required"
        ))));
    }
    Ok(user)
}

/// Requires the `hosteller` role.
///
/// ```ignore
/// async fn post_request(RequireHosteller(user): RequireHosteller) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireHosteller(pub AuthUser);

impl FromRequestParts<AppState> for RequireHosteller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Hosteller)
            .await
            .map(RequireHosteller)
    }
}

/// Requires the `dayscholar` role.
pub struct RequireDayScholar(pub AuthUser);

impl FromRequestParts<AppState> for RequireDayScholar {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::DayScholar)
            .await
            .map(RequireDayScholar)
    }
}

/// Requires any authenticated user.
///
/// Equivalent to [`AuthUser`], named for routes where "authentication
/// required" should read explicitly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
