// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. document::DocumentError)
    clippy::module_name_repetitions
)]

//! # Parchment
//!
//! The document core of a chat-driven word processor.
//!
//! An agent edits a server-held document through a small tool API while a
//! browser polls for changes. Parchment provides:
//! - A paragraph-structured buffer addressed by one flat character index
//! - Paragraph-granular formatting (bold, italic, sub/superscript, styles)
//! - A version counter with a blocking, bounded wait for pollers
//! - Plain text, HTML and JSON save-format projections
//!
//! ## Architecture
//!
//! - **Buffer**: [`editor::TextBuffer`] owns the paragraphs and applies edits
//! - **Handle**: [`editor::DocumentHandle`] serializes edits behind one lock
//! - **Signal**: [`editor::ChangeSignal`] wakes pollers after each edit
//!
//! ## Modules
//!
//! - [`document`]: Paragraph records, rendering and the save format
//! - [`editor`]: The buffer, the change signal and the shared handle
//! - [`store`]: Named saves on disk
//! - [`console`]: Line-oriented command console
//! - [`config`]: Flag-file configuration
//! - [`error`]: Error types

pub mod config;
pub mod console;
pub mod document;
pub mod editor;
pub mod error;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Attribute, MarginSide, Style};
    pub use crate::editor::{DocumentHandle, TextBuffer};
    pub use crate::error::DocumentError;
}
