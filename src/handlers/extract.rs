use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json<T>` whose rejection renders as an `ApiError` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
