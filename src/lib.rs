// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. drive::DriveApi)
    clippy::module_name_repetitions
)]

//! # Zenith
//!
//! A terminal markdown editor with live preview.
//!
//! Zenith edits markdown in a split view with:
//! - A rendered, syntax-highlighted preview kept in scroll sync
//! - A heading outline for navigation
//! - Undo/redo, list continuation and clickable task checkboxes
//! - Light and dark themes and a distraction-free zen mode
//! - Local files, Google Drive, and HTML/DOCX/PDF export
//!
//! ## Architecture
//!
//! Zenith uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop, input and side effects
//! - [`editor`]: Text buffer and markdown editing commands
//! - [`state`]: Editor, layout and Drive session state
//! - [`history`]: Bounded undo/redo log
//! - [`document`]: Preview rendering and outline extraction
//! - [`highlight`]: Syntax highlighting
//! - [`scroll_sync`]: Proportional scroll mirroring between panes
//! - [`storage`]: Local persistence
//! - [`drive`]: Google Drive client
//! - [`export`]: HTML, DOCX and PDF export
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults

pub mod app;
pub mod config;
pub mod document;
pub mod drive;
pub mod editor;
pub mod export;
pub mod highlight;
pub mod history;
pub mod scroll_sync;
pub mod state;
pub mod storage;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::state::EditorState;
    pub use crate::ui::viewport::Viewport;
}
