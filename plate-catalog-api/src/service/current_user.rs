use uuid::Uuid;

use crate::error::ApiResult;

/// Ambient caller-identity lookup, consulted once per audit capture.
///
/// Implementations may fail (for example when no request context is
/// available); capture treats that as a capture failure for the transaction,
/// never as a reason to block the business write.
pub trait CurrentUserService: Send + Sync {
    /// The acting user, or the nil UUID when the caller is anonymous.
    fn get_user_id_or_default(&self) -> ApiResult<Uuid>;
}

/// Identity source bound to a fixed user, used for system jobs and tests.
pub struct FixedCurrentUser(pub Uuid);

impl CurrentUserService for FixedCurrentUser {
    fn get_user_id_or_default(&self) -> ApiResult<Uuid> {
        Ok(self.0)
    }
}
