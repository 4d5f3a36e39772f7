//! HTTP surface for the community subsystem: axum handlers, JWT middleware and
//! the mapping from typed failures to status codes.

pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod manage;
pub mod middleware;
pub mod posts;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};

pub use auth::{AppState, AppStateInner};
pub use error::{ApiError, ApiResult};

/// Builds every route. Reads are public; writes and moderation go through
/// [`middleware::require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{post_id}", get(posts::get_post))
        .route("/posts/{post_id}/comments", get(comments::list_comments))
        .route("/comments/{comment_id}/replies", get(comments::list_replies))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{post_id}", delete(posts::delete_post))
        .route("/posts/{post_id}/likes", post(posts::like_post).delete(posts::unlike_post))
        .route("/posts/{post_id}/comments", post(comments::write_comment))
        .route("/comments/{comment_id}/replies", post(comments::write_reply))
        .route(
            "/comments/{comment_id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/comments/{comment_id}/likes",
            post(comments::like_comment).delete(comments::unlike_comment),
        )
        .route("/manage/users", get(manage::list_users))
        .route("/manage/users/restricted", get(manage::list_restricted_users))
        .route("/manage/users/{user_id}/restriction", put(manage::set_restriction))
        .route("/manage/users/{user_id}/withdraw", post(manage::withdraw_user))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
