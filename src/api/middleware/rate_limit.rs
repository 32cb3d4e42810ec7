//! Rate limit guard for the shorten endpoint.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

/// Takes one permit from the shared "shortener" bucket before the request
/// reaches the handler.
///
/// The bucket is global, not per client.
///
/// # Errors
///
/// Returns `429 Too Many Requests` with code `ERR_RATE_LIMIT_EXCEEDED` when
/// the bucket is empty.
///
/// # Example
///
/// ```rust,ignore
/// let limited = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    st.rate_limiter.check()?;

    Ok(next.run(req).await)
}
