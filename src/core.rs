use std::io::Write;
use std::sync::Arc;

/// Capability contract every storage backend exposes to the dispatcher.
///
/// All methods take `&self`: backends are shared between the registry and concurrent callers,
/// so any mutable state lives behind interior mutability. Boolean results follow one rule:
/// `Ok(false)` is the backend's own failure indicator, `Err` is a raised failure. The
/// dispatcher passes both through unchanged.
pub trait DfsBackend: Send + Sync {
    /// Copies `src` to `dst`, both managed by this backend.
    fn copy_between_managed_storage(&self, src: &str, dst: &str) -> Result<bool>;

    /// Copies the external (host) file `src` into the backend, under `dst` if given.
    fn copy_in_from_external(&self, src: &str, dst: Option<&str>) -> Result<bool>;

    /// Copies the managed file `src` out to the external location `dst` (or `src`).
    fn copy_out_to_external(&self, src: &str, dst: Option<&str>) -> Result<bool>;

    /// Deletes every path in `paths`.
    fn delete(&self, paths: &[&str]) -> Result<bool>;

    /// Writes `length` bytes (or everything when `None`) of `path`, starting at `offset`,
    /// into `sink`.
    fn stream(
        &self,
        path: &str,
        offset: u64,
        length: Option<u64>,
        sink: &mut dyn Write,
    ) -> Result<bool>;

    /// Returns the whole content of `path`. A missing path is an error.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Creates (or replaces) `path` with `content`.
    fn write(&self, path: &str, content: &[u8]) -> Result<bool>;

    fn rename(&self, old_path: &str, new_path: &str) -> Result<bool>;

    fn exists(&self, path: &str) -> Result<bool>;

    /// Size of `path` in bytes. A missing path is an error.
    fn size(&self, path: &str) -> Result<u64>;

    /// Lazily lists every file stored under `base_path`.
    fn list_files(&self, base_path: &str) -> Result<FileList<'_>>;

    /// Whether this backend claims `path`. Only consulted by capability-based registries.
    fn supports(&self, path: &str) -> bool {
        let _ = path;
        false
    }

    /// Location the backend is mounted at, if it has one.
    fn mount_point(&self) -> Option<&str> {
        None
    }
}

/// Shared handle to a backend. Two handles name the same backend only if they point to the
/// same allocation (see [`utils::same_backend`]).
pub type BackendHandle = Arc<dyn DfsBackend>;

/// Lazy sequence of file paths returned by [`DfsBackend::list_files`]. Failures met while
/// iterating are yielded in place.
pub type FileList<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub mod utils {
    use std::sync::Arc;

    use super::{BackendHandle, DfsBackend};

    /// Identity comparison of two backend handles. Only the data pointer is compared, so two
    /// handles to one backend are equal even when created through different trait-object casts.
    pub fn same_backend(a: &BackendHandle, b: &BackendHandle) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
    }

    /// Returns `handles` without repeated instances, keeping the first position of each.
    pub fn dedup_handles<I>(handles: I) -> Vec<BackendHandle>
    where
        I: IntoIterator<Item = BackendHandle>,
    {
        let mut unique: Vec<BackendHandle> = Vec::new();
        for handle in handles {
            if !unique.iter().any(|known| same_backend(known, &handle)) {
                unique.push(handle);
            }
        }
        unique
    }

    /// Wraps a concrete backend into a shared handle.
    pub fn handle<B: DfsBackend + 'static>(backend: B) -> BackendHandle {
        Arc::new(backend)
    }
}
