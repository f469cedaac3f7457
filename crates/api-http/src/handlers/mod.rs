//! Route handlers, grouped by storefront area

pub mod account;
pub mod basket;
pub mod catalog;
pub mod orders;

use axum::extract::{Path, Query};
use axum::Json;
use axum_extra::extract::WithRejection;

use crate::error::ApiError;

/// JSON body whose rejection renders as an `ApiError`
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Path segment whose rejection renders as an `ApiError`
pub type PathParam<T> = WithRejection<Path<T>, ApiError>;

/// Query string whose rejection renders as an `ApiError`
pub type QueryParams<T> = WithRejection<Query<T>, ApiError>;
