//! # Hyperpad Core
//!
//! The editing-assist core: debounced re-highlighting, auto-indent, tag
//! completion and the line overlay.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              EditorSession (task)               │
//! │                                                 │
//! │  commands ──► ┌─────────────────────────────┐   │
//! │  deadline ──► │        EditPipeline         │   │
//! │               │ Idle ► Pending ► Highlight  │   │
//! │               ├─────────┬────────┬──────────┤   │
//! │               │Document │ indent │completion│   │
//! │               └─────────┴────────┴──────────┘   │
//! │                       │                         │
//! └───────────────────────┼─────────────────────────┘
//!                         ▼  EventBus / listener
//!               TextChanged, HighlightApplied
//! ```
//!
//! ## Learning: Time as an Argument
//!
//! [`EditPipeline`] never reads the clock. Every edit takes the current
//! [`tokio::time::Instant`] and the pipeline only remembers a deadline.
//! That keeps the debounce logic synchronous and testable; the async
//! [`EditorSession`] is a thin loop that sleeps until the deadline.

pub mod completion;
pub mod config;
pub mod document;
pub mod event;
pub mod indent;
pub mod overlay;
pub mod pipeline;
pub mod preferences;
pub mod session;

pub use completion::{Completer, CompletionToken, Suggestion};
pub use config::{Config, ConfigError, EditorConfig, PreviewConfig, VcsConfig};
pub use document::{Document, DocumentId};
pub use event::{EditorEvent, EventBus};
pub use indent::{IndentDecision, auto_indent};
pub use overlay::{MonospaceLayout, OverlayLine, TextLayout, compute_overlay, visual_lines};
pub use pipeline::{EditOp, EditPipeline, PipelineConfig, PipelineState, TextChangedListener};
pub use preferences::Preferences;
pub use session::{EditorSession, Snapshot};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unsupported file type: {0}")]
    UnsupportedLanguage(String),

    #[error("Nothing is selected")]
    EmptySelection,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Editor session has been detached")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] hyperpad_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
