use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use plaza_types::api::{CommentRequest, CommentResponse, DeleteCommentResponse, LikeResponse};
use plaza_types::models::{CommentId, PostId};
use plaza_types::paging::PageRequest;

use crate::auth::{AppState, as_caller, blocking};
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::Claims;

pub async fn list_comments(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): PathParam<PostId>,
    WithRejection(Query(page), _): QueryParams<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    let page = blocking(&state, move |c| c.list_comments(post_id, page)).await?;
    Ok(Json(page))
}

pub async fn write_comment(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): PathParam<PostId>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): JsonBody<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let comment = as_caller(&state, &claims, move |c, caller| {
        let comment = c.create_top_level(&caller, post_id, &req.contents)?;
        Ok(CommentResponse::new(comment, caller.username))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_replies(
    State(state): State<AppState>,
    WithRejection(Path(comment_id), _): PathParam<CommentId>,
    WithRejection(Query(page), _): QueryParams<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    let page = blocking(&state, move |c| c.list_replies(comment_id, page)).await?;
    Ok(Json(page))
}

pub async fn write_reply(
    State(state): State<AppState>,
    WithRejection(Path(comment_id), _): PathParam<CommentId>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): JsonBody<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let reply = as_caller(&state, &claims, move |c, caller| {
        let reply = c.create_reply(&caller, comment_id, &req.contents)?;
        Ok(CommentResponse::new(reply, caller.username))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    WithRejection(Path(comment_id), _): PathParam<CommentId>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): JsonBody<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    // An admin may be editing someone else's comment, so reload the author.
    let comment = as_caller(&state, &claims, move |c, caller| {
        c.update_comment(&caller, comment_id, &req.contents)?;
        c.comment_view(comment_id)
    })
    .await?;

    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    WithRejection(Path(comment_id), _): PathParam<CommentId>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let deleted = as_caller(&state, &claims, move |c, caller| c.delete_comment(&caller, comment_id)).await?;
    Ok(Json(DeleteCommentResponse::new(deleted)))
}

pub async fn like_comment(
    State(state): State<AppState>,
    WithRejection(Path(comment_id), _): PathParam<CommentId>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let like_count = as_caller(&state, &claims, move |c, caller| c.like_comment(&caller, comment_id)).await?;
    Ok(Json(LikeResponse {
        liked: true,
        like_count,
    }))
}

pub async fn unlike_comment(
    State(state): State<AppState>,
    WithRejection(Path(comment_id), _): PathParam<CommentId>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let like_count = as_caller(&state, &claims, move |c, caller| c.unlike_comment(&caller, comment_id)).await?;
    Ok(Json(LikeResponse {
        liked: false,
        like_count,
    }))
}
