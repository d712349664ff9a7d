use tracing::debug;

use crate::core::{BackendHandle, Result, utils};
use crate::registry::Resolver;

/// Registry resolving paths by ordered needle matching, with a default backend.
///
/// Each registered needle is searched **anywhere** in the path, not only at its start: the
/// needle `path/to/` claims `otherpath/to/file` too. Needles are tried in registration order and
/// the first hit wins, even when a later needle is longer or also matches. Paths no needle
/// matches go to the default backend, so resolution never fails.
///
/// ### Example
///
/// ```
/// use dfs_dispatch::{MapBackend, PrefixRegistry, Resolver, utils};
///
/// let images = utils::handle(MapBackend::new());
/// let fallback = utils::handle(MapBackend::new());
/// let registry = PrefixRegistry::builder()
///     .path_backend("images/", images.clone())
///     .build(fallback.clone());
///
/// assert!(utils::same_backend(registry.resolve("var/images/a.png").unwrap(), &images));
/// assert!(utils::same_backend(registry.resolve("var/docs/a.pdf").unwrap(), &fallback));
/// ```
pub struct PrefixRegistry {
    path_backends: Vec<(String, BackendHandle)>,
    default_backend: BackendHandle,
    handlers: Vec<BackendHandle>, // path backends in order, then the default; deduplicated
}

impl std::fmt::Debug for PrefixRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixRegistry")
            .field(
                "prefixes",
                &self
                    .path_backends
                    .iter()
                    .map(|(prefix, _)| prefix)
                    .collect::<Vec<_>>(),
            )
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl PrefixRegistry {
    pub fn builder() -> PrefixRegistryBuilder {
        PrefixRegistryBuilder::default()
    }

    /// Creates a registry from `(needle, backend)` pairs, kept in the given order.
    pub fn new<I, S>(default_backend: BackendHandle, path_backends: I) -> Self
    where
        I: IntoIterator<Item = (S, BackendHandle)>,
        S: Into<String>,
    {
        let path_backends: Vec<(String, BackendHandle)> = path_backends
            .into_iter()
            .map(|(prefix, backend)| (prefix.into(), backend))
            .collect();
        // the default stays last even when a needle also points to it
        let mut handlers = utils::dedup_handles(
            path_backends
                .iter()
                .filter(|(_, backend)| !utils::same_backend(backend, &default_backend))
                .map(|(_, backend)| backend.clone()),
        );
        handlers.push(default_backend.clone());
        Self {
            path_backends,
            default_backend,
            handlers,
        }
    }

    pub fn default_backend(&self) -> &BackendHandle {
        &self.default_backend
    }

    /// Registered needles, in matching order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.path_backends.iter().map(|(prefix, _)| prefix.as_str())
    }
}

impl Resolver for PrefixRegistry {
    fn resolve(&self, path: &str) -> Result<&BackendHandle> {
        match self
            .path_backends
            .iter()
            .find(|(prefix, _)| path.contains(prefix.as_str()))
        {
            Some((prefix, backend)) => {
                debug!(path, prefix = prefix.as_str(), "path resolved by prefix");
                Ok(backend)
            }
            None => {
                debug!(path, "path resolved to default backend");
                Ok(&self.default_backend)
            }
        }
    }

    fn handlers(&self) -> &[BackendHandle] {
        &self.handlers
    }
}

/// Collects needle → backend pairs in registration order.
#[derive(Default)]
pub struct PrefixRegistryBuilder {
    path_backends: Vec<(String, BackendHandle)>,
}

impl PrefixRegistryBuilder {
    /// Registers `backend` for paths containing `prefix`.
    /// Registering the same needle twice keeps both entries; the first one always wins.
    pub fn path_backend<S: Into<String>>(mut self, prefix: S, backend: BackendHandle) -> Self {
        self.path_backends.push((prefix.into(), backend));
        self
    }

    pub fn build(self, default_backend: BackendHandle) -> PrefixRegistry {
        PrefixRegistry::new(default_backend, self.path_backends)
    }
}
