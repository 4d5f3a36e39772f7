use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use plaza_types::api::{CreatePostRequest, DeletePostResponse, LikeResponse, PostResponse};
use plaza_types::models::PostId;
use plaza_types::paging::PageRequest;

use crate::auth::{AppState, as_caller, blocking};
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::Claims;

pub async fn list_posts(
    State(state): State<AppState>,
    WithRejection(Query(page), _): QueryParams<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    let page = blocking(&state, move |c| c.list_posts(page)).await?;
    Ok(Json(page))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): JsonBody<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let post = as_caller(&state, &claims, move |c, caller| {
        let post = c.create_post(&caller, &req.title, &req.contents)?;
        Ok(PostResponse::new(post, caller.username))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): PathParam<PostId>,
) -> ApiResult<impl IntoResponse> {
    let post = blocking(&state, move |c| c.get_post(post_id)).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): PathParam<PostId>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let deleted_comments = as_caller(&state, &claims, move |c, caller| c.delete_post(&caller, post_id)).await?;
    Ok(Json(DeletePostResponse { deleted_comments }))
}

pub async fn like_post(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): PathParam<PostId>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let like_count = as_caller(&state, &claims, move |c, caller| c.like_post(&caller, post_id)).await?;
    Ok(Json(LikeResponse {
        liked: true,
        like_count,
    }))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): PathParam<PostId>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let like_count = as_caller(&state, &claims, move |c, caller| c.unlike_post(&caller, post_id)).await?;
    Ok(Json(LikeResponse {
        liked: false,
        like_count,
    }))
}
