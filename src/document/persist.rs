//! The save format.
//!
//! A document is stored as pretty-printed JSON: the margins followed by the
//! paragraphs in document order. Field order is fixed by the struct layout,
//! so encoding the same document twice yields identical bytes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::{Margins, Paragraph, ParagraphId, ParagraphView};
use crate::error::DocumentError;

/// On-disk representation of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDocument {
    pub margins: Margins,
    pub paragraphs: Vec<ParagraphView>,
}

impl SavedDocument {
    pub fn capture(paragraphs: &[Paragraph], margins: &Margins) -> Self {
        Self {
            margins: *margins,
            paragraphs: paragraphs.iter().map(Paragraph::view).collect(),
        }
    }

    /// # Errors
    /// Fails only if JSON encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            DocumentError::InvalidArgument(format!("cannot encode document: {e}"))
        })
    }

    /// # Errors
    /// [`DocumentError::Deserialization`] when the bytes are not a save file.
    pub fn decode(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Validate the records and turn them into paragraphs.
    ///
    /// Stored `start`/`end` values are ignored; the buffer recomputes them.
    ///
    /// # Errors
    /// [`DocumentError::Deserialization`] describing the first violated rule.
    pub fn into_parts(self) -> Result<(Vec<Paragraph>, Margins), DocumentError> {
        let invalid = |msg: String| Err(DocumentError::Deserialization(msg));

        if !self.margins.is_valid() {
            return invalid("margins must be finite and non-negative".to_string());
        }
        if self.paragraphs.is_empty() {
            return invalid("document has no paragraphs".to_string());
        }

        let lone = self.paragraphs.len() == 1;
        let mut seen = HashSet::new();
        for view in &self.paragraphs {
            if view.id == ParagraphId::MAX {
                return invalid(format!("paragraph id {} is out of range", view.id));
            }
            if !seen.insert(view.id) {
                return invalid(format!("duplicate paragraph id {}", view.id));
            }
            if view.content.contains('\n') {
                return invalid(format!("paragraph {} contains a line break", view.id));
            }
            if view.content.is_empty() && !lone {
                return invalid(format!("paragraph {} is empty", view.id));
            }
            if view.subscript && view.superscript {
                return invalid(format!(
                    "paragraph {} is both subscript and superscript",
                    view.id
                ));
            }
        }

        let paragraphs = self
            .paragraphs
            .iter()
            .map(|view| Paragraph::new(view.id, &view.content, view.format()))
            .collect();
        Ok((paragraphs, self.margins))
    }
}
