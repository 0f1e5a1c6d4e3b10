//! Paragraph model, rendering and the save format.
//!
//! This module handles:
//! - Paragraph records and their paragraph-granular formatting
//! - Projecting paragraphs to plain text and HTML
//! - Encoding and validating saved documents

mod persist;
mod render;
mod types;

pub use persist::SavedDocument;
pub use render::{plain_text, to_html};
pub use types::{
    Attribute, Format, MarginSide, Margins, Paragraph, ParagraphId, ParagraphView, Style,
};
