//! Per-request deadline.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

/// Aborts handlers that run past the deadline with `408 Request Timeout`.
///
/// Dropping the handler future cancels its pending store and cache calls.
///
/// # Integration
///
/// ```rust,ignore
/// router.layer(middleware::from_fn_with_state(deadline, timeout::layer))
/// ```
pub async fn layer(
    State(deadline): State<Duration>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    tokio::time::timeout(deadline, next.run(req))
        .await
        .map_err(|_| AppError::Timeout(deadline.as_millis()))
}
