//! Identity and authorization checks shared by every mutation.

use plaza_db::Database;
use plaza_types::models::Caller;
use tracing::warn;
use uuid::Uuid;

use crate::error::{CommunityError, Result};

/// Loads the user behind an authenticated token. A token whose user no longer
/// exists is treated like an invalid token.
pub fn resolve_caller(db: &Database, user_id: Uuid) -> Result<Caller> {
    let row = db
        .get_user_by_id(&user_id.to_string())?
        .ok_or(CommunityError::Unauthorized)?;
    Ok(Caller::from(row.into_user()?))
}

/// Restricted (banned) users may read but not write.
pub fn ensure_active(caller: &Caller) -> Result<()> {
    if caller.is_restricted {
        warn!("Rejected write from restricted user {}", caller.user_id);
        return Err(CommunityError::forbidden("user is restricted"));
    }
    Ok(())
}

pub fn ensure_admin(caller: &Caller) -> Result<()> {
    if !caller.is_admin {
        warn!("Rejected admin action from {}", caller.user_id);
        return Err(CommunityError::forbidden("admin role required"));
    }
    Ok(())
}

pub fn ensure_owner_or_admin(caller: &Caller, owner_id: Uuid, what: &str) -> Result<()> {
    if caller.user_id == owner_id || caller.is_admin {
        return Ok(());
    }
    warn!("User {} may not modify {}", caller.user_id, what);
    Err(CommunityError::forbidden(format!("only the author or an admin may modify {}", what)))
}

/// Trims and checks user-supplied text.
pub(crate) fn non_empty(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommunityError::invalid_input(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
