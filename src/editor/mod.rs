//! The live document: buffer, change signal and the shared handle.
//!
//! Provides a paragraph-structured buffer addressed by flat character
//! index, a version-gated wait for pollers, and the locked handle that ties
//! the two together.

mod buffer;
mod handle;
mod signal;

pub use buffer::TextBuffer;
pub use handle::DocumentHandle;
pub use signal::ChangeSignal;
