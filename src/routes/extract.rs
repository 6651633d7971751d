use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// `Json` whose rejections render as `Error::Validation`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections render as `Error::Validation`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
