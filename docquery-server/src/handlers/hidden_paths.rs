// Server related imports
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::handlers::json_error::{ErrorToResponse, JsonError};

/// Whether a path segment names a dotfile such as `.env` or `.git`
///
/// Percent-encoded dots are caught as well since `ServeDir` decodes them.
pub fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}

/// Refuse to serve dotfiles from the static directories
pub async fn reject_hidden_paths(req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        tracing::warn!("Refusing to serve hidden path {}", req.uri().path());
        return JsonError::new("Not found".to_string())
            .to_response(StatusCode::NOT_FOUND);
    }
    next.run(req).await
}
