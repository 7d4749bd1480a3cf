//! Rendered output files, held until every source has been converted

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Output files keyed by path relative to the mod root. Each path can be
/// registered once; nothing is written before [`commit`](Self::commit).
#[derive(Debug, Clone, Default)]
pub struct OutputSet {
    files: IndexMap<PathBuf, String>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `contents` for `path`, rejecting a second registration.
    pub fn register(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Result<()> {
        let path = path.into();
        if self.files.contains_key(&path) {
            return Err(Error::DuplicateOutput { path });
        }
        self.files.insert(path, contents.into());
        Ok(())
    }

    /// Register every `(path, contents)` pair.
    pub fn register_all(&mut self, files: impl IntoIterator<Item = (PathBuf, String)>) -> Result<()> {
        for (path, contents) in files {
            self.register(path, contents)?;
        }
        Ok(())
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `root` as UTF-8 without a BOM, creating
    /// directories as needed. Returns the relative paths written.
    pub fn commit(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (relative, contents) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, contents)?;
            tracing::debug!("Wrote {}", path.display());
            written.push(relative.clone());
        }
        tracing::info!("Wrote {} files to {}", written.len(), root.display());
        Ok(written)
    }
}
