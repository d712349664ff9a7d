//! This module provides an in-memory storage backend.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, anyhow};

use crate::core::{DfsBackend, FileList, Result};

type Files = BTreeMap<String, Vec<u8>>;

/// A storage backend that keeps every file in process memory.
///
/// `MapBackend` implements the whole [`DfsBackend`] contract without touching any real storage,
/// which makes it the backend of choice for tests, demos and sandboxes. Only the two
/// `copy_*_external` operations reach the host file system, since moving bytes in and out of
/// the managed storage is what they are for.
///
/// ### Internal state
///
/// * `scope` — Optional needle describing which paths this backend claims. When set,
///   [`supports`](DfsBackend::supports) is `true` for every path starting with it, and it is
///   reported as the backend's mount point. Without a scope the backend claims nothing, which is
///   what a default backend of a prefix registry usually looks like.
///
/// * `files` — The storage map.
///   - Key: the full path string as given by the caller (`one://docs/a.txt`). Paths are opaque
///     tokens here, nothing is normalized.
///   - Value: file content.
///   - Uses `BTreeMap` for deterministic, ordered listing.
///
/// ### Thread Safety
///
/// The map is guarded by a `RwLock`, so a single instance can be shared through an `Arc` by the
/// registry and by any number of threads.
///
/// ### Example
///
/// ```
/// use dfs_dispatch::{DfsBackend, MapBackend};
///
/// let backend = MapBackend::with_scope("one://");
/// backend.write("one://note.txt", b"Hello").unwrap();
///
/// assert!(backend.supports("one://note.txt"));
/// assert_eq!(backend.read("one://note.txt").unwrap(), b"Hello");
/// ```
#[derive(Debug, Default)]
pub struct MapBackend {
    scope: Option<String>,
    files: RwLock<Files>,
}

impl MapBackend {
    /// Creates an empty backend that does not claim any path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend claiming every path that starts with `scope`.
    pub fn with_scope<S: Into<String>>(scope: S) -> Self {
        Self {
            scope: Some(scope.into()),
            files: RwLock::new(Files::new()),
        }
    }

    /// Number of stored files.
    pub fn len(&self) -> Result<usize> {
        Ok(self.files()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.files()?.is_empty())
    }

    fn files(&self) -> Result<RwLockReadGuard<'_, Files>> {
        self.files
            .read()
            .map_err(|_| anyhow!("map backend lock poisoned"))
    }

    fn files_mut(&self) -> Result<RwLockWriteGuard<'_, Files>> {
        self.files
            .write()
            .map_err(|_| anyhow!("map backend lock poisoned"))
    }
}

impl DfsBackend for MapBackend {
    /// Duplicates `src` under `dst`.
    /// Returns `Ok(false)` if `src` does not exist.
    fn copy_between_managed_storage(&self, src: &str, dst: &str) -> Result<bool> {
        let mut files = self.files_mut()?;
        let Some(content) = files.get(src).cloned() else {
            return Ok(false);
        };
        files.insert(dst.to_string(), content);
        Ok(true)
    }

    /// Reads the host file `src` and stores it under `dst` (or under `src` itself).
    fn copy_in_from_external(&self, src: &str, dst: Option<&str>) -> Result<bool> {
        let content =
            std::fs::read(src).with_context(|| format!("unable to read host file {}", src))?;
        self.files_mut()?
            .insert(dst.unwrap_or(src).to_string(), content);
        Ok(true)
    }

    /// Writes the managed file `src` to the host path `dst` (or `src` itself).
    /// Returns `Ok(false)` if `src` does not exist.
    fn copy_out_to_external(&self, src: &str, dst: Option<&str>) -> Result<bool> {
        let Some(content) = self.files()?.get(src).cloned() else {
            return Ok(false);
        };
        let target = dst.unwrap_or(src);
        std::fs::write(target, content)
            .with_context(|| format!("unable to write host file {}", target))?;
        Ok(true)
    }

    /// Removes every path in `paths`.
    ///
    /// Missing paths don't stop the removal of the others, but make the result `false`.
    fn delete(&self, paths: &[&str]) -> Result<bool> {
        let mut files = self.files_mut()?;
        let mut all_removed = true;
        for path in paths {
            all_removed &= files.remove(*path).is_some();
        }
        Ok(all_removed)
    }

    /// Writes the `[offset, offset + length)` window of the file into `sink`.
    /// The window is clamped to the end of the file; `None` length means "up to the end".
    fn stream(
        &self,
        path: &str,
        offset: u64,
        length: Option<u64>,
        sink: &mut dyn Write,
    ) -> Result<bool> {
        let files = self.files()?;
        let Some(content) = files.get(path) else {
            return Ok(false);
        };
        let len = content.len() as u64;
        let start = offset.min(len);
        let end = match length {
            Some(length) => start.saturating_add(length).min(len),
            None => len,
        };
        sink.write_all(&content[start as usize..end as usize])?;
        Ok(true)
    }

    /// Returns a copy of the file content.
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - File content, empty for an empty file.
    /// * `Err(anyhow::Error)` - If the file does not exist (`... does not exist`).
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files()?
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("{} does not exist", path))
    }

    /// Creates the file or replaces its entire content.
    fn write(&self, path: &str, content: &[u8]) -> Result<bool> {
        self.files_mut()?.insert(path.to_string(), content.to_vec());
        Ok(true)
    }

    /// Moves the content of `old_path` to `new_path`, replacing any file there.
    /// Returns `Ok(false)` if `old_path` does not exist.
    fn rename(&self, old_path: &str, new_path: &str) -> Result<bool> {
        let mut files = self.files_mut()?;
        let Some(content) = files.remove(old_path) else {
            return Ok(false);
        };
        files.insert(new_path.to_string(), content);
        Ok(true)
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files()?.contains_key(path))
    }

    fn size(&self, path: &str) -> Result<u64> {
        self.files()?
            .get(path)
            .map(|content| content.len() as u64)
            .ok_or_else(|| anyhow!("{} does not exist", path))
    }

    /// Lists every stored path starting with `base_path`, in key order.
    ///
    /// The matching keys are taken as a snapshot, so the returned iterator holds no lock and
    /// later writes are not reflected in it.
    fn list_files(&self, base_path: &str) -> Result<FileList<'_>> {
        let paths: Vec<String> = self
            .files()?
            .keys()
            .filter(|path| path.starts_with(base_path))
            .cloned()
            .collect();
        Ok(Box::new(paths.into_iter().map(Ok::<_, anyhow::Error>)))
    }

    fn supports(&self, path: &str) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|scope| path.starts_with(scope))
    }

    fn mount_point(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}
