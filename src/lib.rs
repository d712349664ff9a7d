//! Path-based dispatching of file operations across several storage backends.
//! Callers issue backend-agnostic operations; the crate picks the backend owning each path and
//! bridges operations whose source and destination live on different backends.
//!
//! ### Overview
//!
//! `dfs-dispatch` sits between an application and its storage implementations (local disk,
//! network file systems, object stores, ...). Every storage implements the [`DfsBackend`]
//! trait; a registry maps each path to the backend owning it, and [`DfsDispatcher`] forwards
//! the calls.
//!
//! **Key ideas**:
//! - **Two resolution policies**: [`PrefixRegistry`] matches ordered needles anywhere in the path
//!   and falls back to a default backend; [`CapabilityRegistry`] asks each backend whether it
//!   `supports()` the path and fails with [`DfsError::NoHandler`] when none does.
//! - **Cross-backend operations**: copy and rename between two backends become a read followed by
//!   a write (and a delete, for rename). The source of a rename is only deleted once the write
//!   succeeded.
//! - **Batch delete**: paths are grouped per owning backend, one call per backend.
//! - **Fan-out listing**: `list_files` lazily concatenates the listings of all backends.
//! - **Best effort**: nothing is transactional, no retries, backend failures pass through as-is.
//!
//! ### Example
//!
//! ```
//! use dfs_dispatch::{DfsBackend, DfsDispatcher, MapBackend, PrefixRegistry, utils};
//!
//! let images = utils::handle(MapBackend::new());
//! let local = utils::handle(MapBackend::new());
//! let dispatcher = DfsDispatcher::new(
//!     PrefixRegistry::builder()
//!         .path_backend("var/storage/images/", images.clone())
//!         .build(local.clone()),
//! );
//!
//! dispatcher.write("var/cache/logo.png", b"png").unwrap();
//! dispatcher
//!     .copy_between_managed_storage("var/cache/logo.png", "var/storage/images/logo.png")
//!     .unwrap();
//!
//! assert!(images.exists("var/storage/images/logo.png").unwrap());
//! assert_eq!(dispatcher.list_files("var/").unwrap().count(), 2);
//! ```

mod backend;
mod config;
mod core;
mod dispatcher;
mod error;
mod registry;
#[cfg(test)]
mod testing;

pub use backend::MapBackend;
pub use config::{BackendFactory, PathBackend, RegistryConfig, StaticFactory};
pub use crate::core::{BackendHandle, DfsBackend, FileList, Result, utils};
pub use dispatcher::DfsDispatcher;
pub use error::DfsError;
pub use registry::{CapabilityRegistry, PrefixRegistry, PrefixRegistryBuilder, Resolver};
