use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::Session;
use crate::error::AppError;
use crate::state::AppState;

/// The resolved caller of a request, always present once the middleware ran.
#[derive(Debug, Clone, Default)]
pub struct RequestSession(pub Option<Session>);

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Resolve the caller once per request. A bad token leaves the caller
/// anonymous rather than failing the request, so public queries still work.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match bearer_token(&request) {
        Some(token) => match state.jwt_service().verify_token(token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "ignoring invalid bearer token");
                None
            }
        },
        None => None,
    };

    let session = Session::resolve(&state, claims.as_ref()).await?;
    request.extensions_mut().insert(RequestSession(session));
    Ok(next.run(request).await)
}
