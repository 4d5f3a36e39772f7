use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::{error, info, warn};
use uuid::Uuid;

use plaza_community::accounts::validate_registration;
use plaza_community::{Community, CommunityError};
use plaza_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use plaza_types::models::{Caller, Role};

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub community: Community,
    pub jwt_secret: String,
    /// Lowercased emails that register with the admin role.
    pub admin_emails: Vec<String>,
}

impl AppStateInner {
    pub fn new(community: Community, jwt_secret: String, admin_emails: Vec<String>) -> AppState {
        let admin_emails = admin_emails.into_iter().map(|e| e.trim().to_lowercase()).collect();
        Arc::new(Self {
            community,
            jwt_secret,
            admin_emails,
        })
    }

    fn role_for(&self, email: &str) -> Role {
        if self.admin_emails.iter().any(|e| e == email) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Runs a community call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Community) -> plaza_community::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let community = state.community.clone();
    tokio::task::spawn_blocking(move || f(&community))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal(e)
        })?
        .map_err(ApiError::from)
}

/// Like [`blocking`], but resolves the token's user to a [`Caller`] first.
pub(crate) async fn as_caller<F, T>(state: &AppState, claims: &Claims, f: F) -> ApiResult<T>
where
    F: FnOnce(&Community, Caller) -> plaza_community::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let user_id = claims.sub;
    blocking(state, move |community| {
        let caller = community.resolve_caller(user_id)?;
        f(community, caller)
    })
    .await
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registration = validate_registration(&req.email, &req.username, &req.password)?;
    let role = state.role_for(&registration.email);

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(ApiError::internal)?
        .to_string();

    let user = blocking(&state, move |c| c.register_user(&registration, &password_hash, role)).await?;

    let token = create_token(&state.jwt_secret, user.id, &user.email).map_err(ApiError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email;
    let user = blocking(&state, move |c| c.find_account(&email))
        .await?
        .ok_or(CommunityError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(ApiError::internal)?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Failed login for user {}", user.id);
        return Err(CommunityError::Unauthorized.into());
    }

    let user_id: Uuid = user.id.parse().map_err(ApiError::internal)?;
    let token = create_token(&state.jwt_secret, user_id, &user.email).map_err(ApiError::internal)?;
    info!("User {} logged in", user_id);

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
