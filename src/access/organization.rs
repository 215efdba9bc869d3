use crate::entities::billing::organization_entity::OrganizationManagersView;
use crate::entities::user_auth::local_user_entity::UserView;
use crate::middleware::error::{AppError, AppResult};

/// Checks that `user` may manage billing for `organization`. Platform
/// admins manage every organization, everyone else must be listed in the
/// organization's managers. Denial is signalled as
/// [AppError::AuthorizationFail] so callers can distinguish it from other
/// failures.
pub fn valid_manager_for_organization(
    user: &UserView,
    organization: &OrganizationManagersView,
) -> AppResult<()> {
    if user.is_admin || organization.managers.contains(&user.id) {
        return Ok(());
    }
    Err(AppError::AuthorizationFail {
        required: format!("manager of {}", organization.slug),
    })
}
