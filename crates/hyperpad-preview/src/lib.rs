//! # Hyperpad Preview
//!
//! Serves a project directory over HTTP so the page being edited can be
//! opened in a browser.
//!
//! ```text
//!   GET /            ──► <root>/index.html   text/html
//!   GET /css/a.css   ──► <root>/css/a.css    text/css
//!   GET /../secret   ──► 403
//!   GET /missing.js  ──► 404 + PreviewLog entry
//! ```
//!
//! The content type comes from the request path alone; file contents are
//! never sniffed.

pub mod log;
pub mod mime;
pub mod routes;
pub mod server;

pub use log::PreviewLog;
pub use mime::mime_for;
pub use routes::{PreviewState, ResolveError, resolve, router};
pub use server::PreviewServer;

use std::net::SocketAddr;
use std::path::PathBuf;

/// Result type for preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Errors that can occur while starting or stopping the preview server
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("Project root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
