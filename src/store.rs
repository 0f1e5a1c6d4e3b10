//! Named saves on disk.
//!
//! Documents are saved as JSON files inside one directory, addressed by a
//! plain file name. Loading goes through [`DocumentHandle::load`], so a
//! load is an ordinary mutation that wakes pollers.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::editor::DocumentHandle;
use crate::error::StoreError;

const SAVE_EXT: &str = "json";

/// A directory of saved documents.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the current document to `name`, creating the directory if needed.
    ///
    /// # Errors
    /// [`StoreError::InvalidName`] for names that are not plain file names,
    /// [`StoreError::Io`] when writing fails.
    pub fn save(&self, name: &str, handle: &DocumentHandle) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        let (bytes, version) =
            handle.with_buffer(|buf| buf.serialize().map(|bytes| (bytes, buf.version())))?;
        fs::create_dir_all(&self.root)?;
        fs::write(&path, bytes)?;
        info!(path = %path.display(), version, "document saved");
        Ok(path)
    }

    /// Replace the live document with the save called `name`.
    ///
    /// Returns the file read and the version the load produced.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when there is no such save,
    /// [`StoreError::Document`] when the file is not a valid document.
    pub fn load(
        &self,
        name: &str,
        handle: &DocumentHandle,
    ) -> Result<(PathBuf, u64), StoreError> {
        let path = self.path_for(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path));
            }
            Err(err) => return Err(err.into()),
        };
        let version = handle.load(&bytes)?;
        info!(path = %path.display(), version, "document loaded");
        Ok((path, version))
    }

    /// Names of all saves, sorted. A missing directory has no saves.
    ///
    /// # Errors
    /// [`StoreError::Io`] when the directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let name = name.trim();
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && Path::new(name).file_name().is_some_and(|f| f == name);
        if !plain {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        let file = if Path::new(name).extension().and_then(|e| e.to_str()) == Some(SAVE_EXT) {
            name.to_string()
        } else {
            format!("{name}.{SAVE_EXT}")
        };
        Ok(self.root.join(file))
    }
}
