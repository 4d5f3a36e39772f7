//! Extractors whose rejections become `ApiError`s, so malformed paths, query
//! strings and bodies get the same JSON error shape as everything else.

use axum::Json;
use axum::extract::{Path, Query};
use axum_extra::extract::WithRejection;

use crate::error::ApiError;

pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;
pub type PathParam<T> = WithRejection<Path<T>, ApiError>;
pub type QueryParams<T> = WithRejection<Query<T>, ApiError>;
