use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::{debug, warn};

use super::{ChangeSignal, TextBuffer};
use crate::document::{Attribute, MarginSide, Paragraph, ParagraphView};
use crate::error::DocumentError;

/// Shared owner of the live document.
///
/// All mutations go through one write lock for the whole
/// mutate, bump, publish sequence; reads share the lock and always see a
/// finished edit. Waiting for a change only touches the [`ChangeSignal`], so
/// a blocked poller never holds up a writer. Share it with an `Arc`.
#[derive(Debug)]
pub struct DocumentHandle {
    buffer: RwLock<TextBuffer>,
    signal: ChangeSignal,
}

impl DocumentHandle {
    pub fn new(buffer: TextBuffer) -> Self {
        let signal = ChangeSignal::new(buffer.version());
        Self {
            buffer: RwLock::new(buffer),
            signal,
        }
    }

    /// Insert `text` at flat index `index`, returning the new version.
    ///
    /// # Errors
    /// See [`TextBuffer::insert`].
    pub fn insert(&self, text: &str, index: usize) -> Result<u64, DocumentError> {
        self.mutate("insert", |buf| buf.insert(text, index))
    }

    /// Delete `start..end`, returning the new version.
    ///
    /// # Errors
    /// See [`TextBuffer::delete`].
    pub fn delete(&self, start: usize, end: usize) -> Result<u64, DocumentError> {
        self.mutate("delete", |buf| buf.delete(start, end))
    }

    /// Toggle `attribute` over `start..end`, returning the new version.
    ///
    /// # Errors
    /// See [`TextBuffer::toggle_format`].
    pub fn toggle_format(
        &self,
        start: usize,
        end: usize,
        attribute: Attribute,
    ) -> Result<u64, DocumentError> {
        self.mutate("toggle_format", |buf| {
            buf.toggle_format(start, end, attribute)
        })
    }

    /// # Errors
    /// See [`TextBuffer::set_margin`].
    pub fn set_margin(&self, side: MarginSide, value_mm: f64) -> Result<u64, DocumentError> {
        self.mutate("set_margin", |buf| buf.set_margin(side, value_mm))
    }

    /// Replace the document with a deserialized one, returning the new version.
    ///
    /// Decoding happens before the lock is taken; a corrupt input leaves the
    /// live document and its version alone.
    ///
    /// # Errors
    /// [`DocumentError::Deserialization`] for invalid input.
    pub fn load(&self, bytes: &[u8]) -> Result<u64, DocumentError> {
        let loaded = match TextBuffer::deserialize(bytes) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(op = "load", %err, "document operation rejected");
                return Err(err);
            }
        };
        Ok(self.replace(loaded))
    }

    /// Swap in `buffer` as a single mutation and return the new version.
    ///
    /// Replacing cannot be rejected, so this skips the validating path.
    pub fn replace(&self, buffer: TextBuffer) -> u64 {
        let mut current = self.write();
        current.replace(buffer);
        self.publish("replace", &current)
    }

    pub fn find(&self, term: &str) -> Vec<(usize, usize)> {
        self.read().find(term)
    }

    pub fn plain_text(&self) -> String {
        self.read().plain_text()
    }

    pub fn markup(&self) -> String {
        self.read().markup()
    }

    pub fn version(&self) -> u64 {
        self.read().version()
    }

    pub fn paragraphs(&self) -> Vec<ParagraphView> {
        self.read().paragraphs().iter().map(Paragraph::view).collect()
    }

    /// # Errors
    /// See [`TextBuffer::serialize`].
    pub fn serialize(&self) -> Result<Vec<u8>, DocumentError> {
        self.read().serialize()
    }

    /// Run `f` against a consistent snapshot of the document.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&TextBuffer) -> R) -> R {
        f(&*self.read())
    }

    /// Block until the version passes `baseline` or `timeout` elapses.
    ///
    /// A timeout is not an error: the unchanged version comes back and the
    /// caller polls again.
    pub fn wait_for_change(&self, baseline: u64, timeout: Duration) -> u64 {
        let version = self.signal.wait_for_change(baseline, timeout);
        debug!(baseline, version, changed = version > baseline, "wait finished");
        version
    }

    fn read(&self) -> RwLockReadGuard<'_, TextBuffer> {
        // Edits validate before touching the buffer; a poisoned lock still
        // guards a whole document.
        self.buffer.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TextBuffer> {
        self.buffer.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut TextBuffer) -> Result<(), DocumentError>,
    ) -> Result<u64, DocumentError> {
        let mut buffer = self.write();
        match f(&mut *buffer) {
            Ok(()) => Ok(self.publish(op, &buffer)),
            Err(err) => {
                warn!(op, %err, "document operation rejected");
                Err(err)
            }
        }
    }

    /// Publish the version of an edited buffer. Callers still hold the write
    /// lock, so a woken reader blocks until the edit is visible.
    fn publish(&self, op: &'static str, buffer: &TextBuffer) -> u64 {
        let version = buffer.version();
        self.signal.publish(version);
        debug!(op, version, len = buffer.len(), "document mutated");
        version
    }
}

impl Default for DocumentHandle {
    fn default() -> Self {
        Self::new(TextBuffer::new())
    }
}
