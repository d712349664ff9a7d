use tracing::debug;

use crate::core::{BackendHandle, Result, utils};
use crate::error::DfsError;
use crate::registry::Resolver;

/// Registry asking each backend, in order, whether it supports a path.
///
/// The first backend whose [`supports`](crate::DfsBackend::supports) returns `true` owns the
/// path. There is no fallback: a path nobody supports fails with [`DfsError::NoHandler`].
pub struct CapabilityRegistry {
    backends: Vec<BackendHandle>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field(
                "mount_points",
                &self
                    .backends
                    .iter()
                    .map(|backend| backend.mount_point())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl CapabilityRegistry {
    /// Creates a registry querying `backends` in the given order.
    /// An instance passed several times is only kept at its first position.
    pub fn new<I>(backends: I) -> Self
    where
        I: IntoIterator<Item = BackendHandle>,
    {
        Self {
            backends: utils::dedup_handles(backends),
        }
    }
}

impl Resolver for CapabilityRegistry {
    fn resolve(&self, path: &str) -> Result<&BackendHandle> {
        match self.backends.iter().find(|backend| backend.supports(path)) {
            Some(backend) => {
                debug!(path, mount_point = ?backend.mount_point(), "path resolved by capability");
                Ok(backend)
            }
            None => {
                debug!(path, "no backend supports path");
                Err(DfsError::NoHandler {
                    path: path.to_string(),
                }
                .into())
            }
        }
    }

    fn handlers(&self) -> &[BackendHandle] {
        &self.backends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapBackend;
    use crate::core::utils::{handle, same_backend};

    fn setup_registry() -> (CapabilityRegistry, BackendHandle, BackendHandle, BackendHandle) {
        let one = handle(MapBackend::with_scope("one://"));
        let one_sub = handle(MapBackend::with_scope("one://sub/"));
        let two = handle(MapBackend::with_scope("two://"));
        let registry = CapabilityRegistry::new(vec![one.clone(), one_sub.clone(), two.clone()]);
        (registry, one, one_sub, two)
    }

    #[test]
    fn test_resolve_single_supporting_backend() -> Result<()> {
        let (registry, _, _, two) = setup_registry();
        assert!(same_backend(registry.resolve("two://file")?, &two));
        Ok(())
    }

    #[test]
    fn test_resolve_earliest_supporting_backend_wins() -> Result<()> {
        let (registry, one, one_sub, _) = setup_registry();
        let resolved = registry.resolve("one://sub/file")?;
        assert!(same_backend(resolved, &one));
        assert!(!same_backend(resolved, &one_sub));
        Ok(())
    }

    #[test]
    fn test_resolve_no_handler() {
        let (registry, _, _, _) = setup_registry();
        let Err(err) = registry.resolve("three://file") else {
            panic!("three://file must not resolve");
        };
        assert_eq!(
            err.downcast_ref::<DfsError>(),
            Some(&DfsError::NoHandler {
                path: "three://file".to_string()
            })
        );
        assert_eq!(err.to_string(), "no handler supports path `three://file`");
    }

    #[test]
    fn test_resolve_empty_registry() {
        let registry = CapabilityRegistry::new(Vec::new());
        assert!(registry.resolve("one://file").is_err());
    }

    #[test]
    fn test_resolve_is_deterministic() -> Result<()> {
        let (registry, _, _, _) = setup_registry();
        let first = registry.resolve("one://file")?.clone();
        assert!(same_backend(&first, registry.resolve("one://file")?));
        Ok(())
    }

    #[test]
    fn test_handlers_in_registration_order() {
        let (registry, one, one_sub, two) = setup_registry();
        let handlers = registry.handlers();
        assert_eq!(handlers.len(), 3);
        assert!(same_backend(&handlers[0], &one));
        assert!(same_backend(&handlers[1], &one_sub));
        assert!(same_backend(&handlers[2], &two));
    }

    #[test]
    fn test_handlers_deduplicated() {
        let one = handle(MapBackend::with_scope("one://"));
        let registry = CapabilityRegistry::new(vec![one.clone(), one.clone()]);
        assert_eq!(registry.handlers().len(), 1);
    }
}
