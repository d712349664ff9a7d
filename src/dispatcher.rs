//! Backend-agnostic façade over a registry of storage backends.
//!
//! Single-path operations are forwarded unchanged to the backend owning the path. Copy and
//! rename resolve both paths and, when two different backends are involved, are rebuilt from
//! primitive calls: the source content is read entirely into memory, then written to the
//! destination backend. Batch delete is split into one call per owning backend.
//!
//! Nothing here is transactional. A failed step is reported, never compensated, and backend
//! failures reach the caller exactly as the backend produced them.

use std::io::Write;

use tracing::{debug, warn};

use crate::config::{BackendFactory, RegistryConfig};
use crate::core::{BackendHandle, DfsBackend, FileList, Result, utils};
use crate::registry::Resolver;

/// Dispatches every [`DfsBackend`] operation to the backend(s) its paths resolve to.
///
/// The dispatcher is itself a [`DfsBackend`], so it can be registered inside another registry.
/// It never claims a path on its own (`supports()` is `false`) and has no mount point.
///
/// ### Example
///
/// ```
/// use dfs_dispatch::{DfsBackend, DfsDispatcher, MapBackend, PrefixRegistry, utils};
///
/// let one = utils::handle(MapBackend::new());
/// let fallback = utils::handle(MapBackend::new());
/// let dispatcher = DfsDispatcher::new(
///     PrefixRegistry::builder()
///         .path_backend("one://", one.clone())
///         .build(fallback.clone()),
/// );
///
/// dispatcher.write("one://a.txt", b"data").unwrap();
/// // crosses from `one` to the default backend
/// dispatcher.rename("one://a.txt", "b.txt").unwrap();
///
/// assert!(!one.exists("one://a.txt").unwrap());
/// assert_eq!(fallback.read("b.txt").unwrap(), b"data");
/// ```
#[derive(Debug)]
pub struct DfsDispatcher<R> {
    registry: R,
}

impl<R: Resolver> DfsDispatcher<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    fn handler(&self, path: &str) -> Result<&BackendHandle> {
        self.registry.resolve(path)
    }

    /// Reads `src` from `from` and creates `dst` on `to` with that content.
    fn transfer(
        &self,
        from: &BackendHandle,
        src: &str,
        to: &BackendHandle,
        dst: &str,
    ) -> Result<bool> {
        let content = from.read(src)?;
        debug!(src, dst, bytes = content.len(), "bridging content across backends");
        to.write(dst, &content)
    }

    /// Resolves each path and groups them by owning backend.
    ///
    /// Groups appear in the order their backend is first met; paths keep their input order
    /// inside a group. Every path is resolved before any group is returned.
    fn group_by_backend<'p>(
        &self,
        paths: &[&'p str],
    ) -> Result<Vec<(&BackendHandle, Vec<&'p str>)>> {
        let mut groups: Vec<(&BackendHandle, Vec<&'p str>)> = Vec::new();
        for &path in paths {
            let backend = self.handler(path)?;
            match groups
                .iter()
                .position(|(known, _)| utils::same_backend(known, backend))
            {
                Some(index) => groups[index].1.push(path),
                None => groups.push((backend, vec![path])),
            }
        }
        Ok(groups)
    }
}

impl DfsDispatcher<Box<dyn Resolver>> {
    /// Builds the configured registry (see [`RegistryConfig::build`]) and a dispatcher over it.
    pub fn from_config<F: BackendFactory>(config: &RegistryConfig, factory: F) -> Result<Self> {
        Ok(Self::new(config.build(factory)?))
    }
}

impl<R: Resolver> DfsBackend for DfsDispatcher<R> {
    /// Same backend: native copy. Different backends: read from the source, write to the
    /// destination, and return the write's result.
    fn copy_between_managed_storage(&self, src: &str, dst: &str) -> Result<bool> {
        let src_handler = self.handler(src)?;
        let dst_handler = self.handler(dst)?;

        if utils::same_backend(src_handler, dst_handler) {
            return src_handler.copy_between_managed_storage(src, dst);
        }

        let copied = self.transfer(src_handler, src, dst_handler, dst)?;
        if !copied {
            warn!(src, dst, "cross-backend copy: destination write failed");
        }
        Ok(copied)
    }

    /// Routed on the destination path, or on `src` when no destination is given.
    fn copy_in_from_external(&self, src: &str, dst: Option<&str>) -> Result<bool> {
        self.handler(dst.unwrap_or(src))?
            .copy_in_from_external(src, dst)
    }

    /// Routed on `src`; `dst` is only passed along to the backend.
    fn copy_out_to_external(&self, src: &str, dst: Option<&str>) -> Result<bool> {
        self.handler(src)?.copy_out_to_external(src, dst)
    }

    /// Deletes `paths`, calling each owning backend once with its own subset.
    ///
    /// Every group is attempted even if an earlier one reports `false`; the result is `true`
    /// only if all of them succeed. Already deleted paths are never restored. A raised backend
    /// error stops the remaining groups.
    fn delete(&self, paths: &[&str]) -> Result<bool> {
        let groups = self.group_by_backend(paths)?;
        let mut all_deleted = true;
        for (backend, group) in groups {
            debug!(paths = ?group, "deleting batch");
            if !backend.delete(&group)? {
                warn!(paths = ?group, "batch delete failed on one backend");
                all_deleted = false;
            }
        }
        Ok(all_deleted)
    }

    fn stream(
        &self,
        path: &str,
        offset: u64,
        length: Option<u64>,
        sink: &mut dyn Write,
    ) -> Result<bool> {
        self.handler(path)?.stream(path, offset, length, sink)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.handler(path)?.read(path)
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<bool> {
        self.handler(path)?.write(path, content)
    }

    /// Same backend: native rename. Different backends: copy to the new backend, then delete
    /// `old_path` from the old one, only if the copy succeeded.
    fn rename(&self, old_path: &str, new_path: &str) -> Result<bool> {
        let old_handler = self.handler(old_path)?;
        let new_handler = self.handler(new_path)?;

        if utils::same_backend(old_handler, new_handler) {
            return old_handler.rename(old_path, new_path);
        }

        if !self.transfer(old_handler, old_path, new_handler, new_path)? {
            warn!(old_path, new_path, "cross-backend rename: source kept, write failed");
            return Ok(false);
        }
        old_handler.delete(&[old_path])
    }

    fn exists(&self, path: &str) -> Result<bool> {
        self.handler(path)?.exists(path)
    }

    fn size(&self, path: &str) -> Result<u64> {
        self.handler(path)?.size(path)
    }

    /// Concatenates the listings of every registered backend, in registration order.
    ///
    /// A backend is queried only once the entries of the previous one are exhausted. If a
    /// backend fails to list, its error is yielded in its place and the next backend follows.
    fn list_files(&self, base_path: &str) -> Result<FileList<'_>> {
        let base_path = base_path.to_string();
        Ok(Box::new(self.registry.handlers().iter().flat_map(
            move |backend| {
                debug!(base_path = base_path.as_str(), "listing backend");
                backend
                    .list_files(&base_path)
                    .unwrap_or_else(|err| Box::new(std::iter::once(Err(err))))
            },
        )))
    }
}
