use chrono::Utc;
use plaza_db::models::UserRow;
use plaza_db::queries;
use plaza_types::models::{Role, User};
use tracing::{info, warn};
use uuid::Uuid;

use crate::Community;
use crate::error::{CommunityError, Result};

/// Normalized registration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub username: String,
}

/// Checks registration input before the password is hashed. Emails are
/// trimmed and lowercased.
pub fn validate_registration(email: &str, username: &str, password: &str) -> Result<Registration> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') || email.len() > 254 {
        return Err(CommunityError::invalid_input("email is not valid"));
    }
    let username = username.trim();
    let len = username.chars().count();
    if !(2..=32).contains(&len) {
        return Err(CommunityError::invalid_input("username must be 2 to 32 characters"));
    }
    if password.len() < 8 {
        return Err(CommunityError::invalid_input("password must be at least 8 characters"));
    }
    Ok(Registration {
        email,
        username: username.to_string(),
    })
}

impl Community {
    /// Stores a new account. The email uniqueness check and the insert share
    /// one transaction.
    pub fn register_user(&self, registration: &Registration, password_hash: &str, role: Role) -> Result<User> {
        let id = Uuid::new_v4().to_string();

        let user = self.db().with_tx(|tx| {
            if queries::query_user_by_email(tx, &registration.email)?.is_some() {
                warn!("Registration rejected, email already in use");
                return Err(CommunityError::conflict("email already registered"));
            }
            queries::insert_user(
                tx,
                &id,
                &registration.email,
                &registration.username,
                password_hash,
                role,
                Utc::now(),
            )?;
            let row = queries::query_user_by_id(tx, &id)?
                .ok_or_else(|| CommunityError::not_found(format!("user {}", id)))?;
            Ok(row.into_user()?)
        })?;

        info!("User {} registered as {}", user.id, user.role.as_str());
        Ok(user)
    }

    /// Looks up an account for login. Returns the raw row so the caller can
    /// verify the stored password hash.
    pub fn find_account(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self.db().get_user_by_email(&email.trim().to_lowercase())?)
    }
}
