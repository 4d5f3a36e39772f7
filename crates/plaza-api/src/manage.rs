use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use plaza_types::api::SetRestrictionRequest;
use plaza_types::paging::PageRequest;

use crate::auth::{AppState, as_caller};
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::Claims;

pub async fn list_users(
    State(state): State<AppState>,
    WithRejection(Query(page), _): QueryParams<PageRequest>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let page = as_caller(&state, &claims, move |c, caller| c.list_users(&caller, page)).await?;
    Ok(Json(page))
}

pub async fn list_restricted_users(
    State(state): State<AppState>,
    WithRejection(Query(page), _): QueryParams<PageRequest>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let page = as_caller(&state, &claims, move |c, caller| c.list_restricted_users(&caller, page)).await?;
    Ok(Json(page))
}

pub async fn set_restriction(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): PathParam<Uuid>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): JsonBody<SetRestrictionRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = as_caller(&state, &claims, move |c, caller| {
        c.set_restricted(&caller, user_id, req.restricted)
    })
    .await?;
    Ok(Json(user))
}

pub async fn withdraw_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): PathParam<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let summary = as_caller(&state, &claims, move |c, caller| c.withdraw_user(&caller, user_id)).await?;
    Ok(Json(summary))
}
