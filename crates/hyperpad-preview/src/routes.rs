//! Request path resolution and the file handler.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::log::PreviewLog;
use crate::mime::mime_for;

/// Shared state passed to the handler.
#[derive(Debug, Clone)]
pub struct PreviewState {
    root: Arc<PathBuf>,
    index_file: Arc<str>,
    log: PreviewLog,
}

impl PreviewState {
    pub fn new(root: impl Into<PathBuf>, index_file: &str) -> Self {
        Self {
            root: Arc::new(root.into()),
            index_file: Arc::from(index_file),
            log: PreviewLog::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    pub fn log(&self) -> &PreviewLog {
        &self.log
    }
}

/// Why a request path was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("path escapes the project root: {0}")]
    ParentSegment(String),
}

/// Maps a request path onto a file under `root`. `/` is the index file.
pub fn resolve(root: &Path, index_file: &str, uri_path: &str) -> Result<PathBuf, ResolveError> {
    if uri_path.is_empty() || uri_path == "/" {
        return Ok(root.join(index_file));
    }

    let segments: Vec<&str> = uri_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.contains(&"..") {
        return Err(ResolveError::ParentSegment(uri_path.to_string()));
    }

    Ok(segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment)))
}

/// Builds the preview router.
pub fn router(state: PreviewState) -> Router {
    Router::new()
        .route("/", get(serve_file))
        .route("/*path", get(serve_file))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn serve_file(State(state): State<PreviewState>, uri: Uri) -> Response {
    let request_path = uri.path();

    let path = match resolve(state.root(), state.index_file(), request_path) {
        Ok(path) => path,
        Err(err) => {
            warn!(uri = %request_path, "refused preview request: {}", err);
            state.log.record(format!("{request_path}: {err}"));
            return (StatusCode::FORBIDDEN, err.to_string()).into_response();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, mime_for(request_path))], bytes).into_response(),
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to read preview file");
            state.log.record(format!("{}: {err}", path.display()));
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_resolve_index() {
        let root = Path::new("/srv/demo");
        assert_eq!(
            resolve(root, "index.html", "/").unwrap(),
            root.join("index.html")
        );
        assert_eq!(resolve(root, "home.htm", "").unwrap(), root.join("home.htm"));
    }

    #[test]
    fn test_resolve_nested() {
        let root = Path::new("/srv/demo");
        assert_eq!(
            resolve(root, "index.html", "/css//./site.css").unwrap(),
            root.join("css").join("site.css")
        );
    }

    #[test]
    fn test_resolve_refuses_parent_segments() {
        let root = Path::new("/srv/demo");
        assert!(matches!(
            resolve(root, "index.html", "/../etc/passwd"),
            Err(ResolveError::ParentSegment(_))
        ));
        assert!(resolve(root, "index.html", "/a/..\\b").is_err());
        // dots inside a name are fine
        assert!(resolve(root, "index.html", "/a..b.js").is_ok());
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden_and_logged() {
        let state = PreviewState::new("/srv/demo", "index.html");
        let log = state.log().clone();

        let request = Request::builder()
            .uri("/../secret.txt")
            .body(Body::empty())
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(log.len(), 1);
    }
}
