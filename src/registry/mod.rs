//! Backend registries: deterministic path → backend resolution.
//!
//! Two interchangeable policies implement [`Resolver`]:
//! - [`PrefixRegistry`] — ordered needle match with a default fallback, never fails;
//! - [`CapabilityRegistry`] — first backend whose `supports()` accepts the path, no fallback.
//!
//! A registry is immutable once built, so resolution needs no synchronization.

mod capability;
mod prefix;

pub use capability::CapabilityRegistry;
pub use prefix::{PrefixRegistry, PrefixRegistryBuilder};

use crate::core::{BackendHandle, Result};

pub trait Resolver: Send + Sync {
    /// Returns the backend responsible for `path`.
    fn resolve(&self, path: &str) -> Result<&BackendHandle>;

    /// Every known backend, in registration order, each instance listed once.
    fn handlers(&self) -> &[BackendHandle];
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn resolve(&self, path: &str) -> Result<&BackendHandle> {
        (**self).resolve(path)
    }

    fn handlers(&self) -> &[BackendHandle] {
        (**self).handlers()
    }
}
