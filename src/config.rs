//! Registry configuration.
//!
//! The configuration only names backends; turning a name into an instance is the job of a
//! [`BackendFactory`] supplied by the application. Example (TOML):
//!
//! ```toml
//! policy = "prefix"
//! default_backend = "local"
//!
//! [[path_backends]]
//! prefix = "var/storage/images/"
//! backend = "s3"
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{BackendHandle, Result};
use crate::error::DfsError;
use crate::registry::{CapabilityRegistry, PrefixRegistry, Resolver};

/// One needle → backend identifier rule of a prefix registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathBackend {
    pub prefix: String,
    pub backend: String,
}

/// Which resolution policy to build, and with which backend identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RegistryConfig {
    /// Ordered needle match with a default backend.
    Prefix {
        default_backend: String,
        /// Kept as an array so the matching order survives parsing.
        #[serde(default)]
        path_backends: Vec<PathBackend>,
    },
    /// First backend whose `supports()` accepts the path.
    Capability { backends: Vec<String> },
}

/// Creates backend instances from their configured identifiers.
pub trait BackendFactory {
    fn build_backend(&mut self, identifier: &str) -> Result<BackendHandle>;
}

impl<F> BackendFactory for F
where
    F: FnMut(&str) -> Result<BackendHandle>,
{
    fn build_backend(&mut self, identifier: &str) -> Result<BackendHandle> {
        self(identifier)
    }
}

/// Factory serving a fixed set of already built backends.
/// Unknown identifiers fail with [`DfsError::UnknownBackend`].
#[derive(Default, Clone)]
pub struct StaticFactory {
    backends: HashMap<String, BackendHandle>,
}

impl StaticFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S: Into<String>>(mut self, identifier: S, backend: BackendHandle) -> Self {
        self.backends.insert(identifier.into(), backend);
        self
    }
}

impl BackendFactory for StaticFactory {
    fn build_backend(&mut self, identifier: &str) -> Result<BackendHandle> {
        self.backends
            .get(identifier)
            .cloned()
            .ok_or_else(|| DfsError::UnknownBackend(identifier.to_string()).into())
    }
}

/// Instantiates each identifier once, so repeated identifiers share one backend.
struct Instances<'f, F: BackendFactory> {
    factory: &'f mut F,
    built: HashMap<String, BackendHandle>,
}

impl<'f, F: BackendFactory> Instances<'f, F> {
    fn new(factory: &'f mut F) -> Self {
        Self {
            factory,
            built: HashMap::new(),
        }
    }

    fn get(&mut self, identifier: &str) -> Result<BackendHandle> {
        if let Some(backend) = self.built.get(identifier) {
            return Ok(backend.clone());
        }
        let backend = self
            .factory
            .build_backend(identifier)
            .with_context(|| format!("unable to build backend `{}`", identifier))?;
        debug!(identifier, "backend instantiated");
        self.built.insert(identifier.to_string(), backend.clone());
        Ok(backend)
    }
}

impl RegistryConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid registry configuration")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Builds the configured registry, asking `factory` for each distinct identifier once.
    pub fn build<F: BackendFactory>(&self, mut factory: F) -> Result<Box<dyn Resolver>> {
        let mut instances = Instances::new(&mut factory);
        match self {
            RegistryConfig::Prefix {
                default_backend,
                path_backends,
            } => {
                if default_backend.trim().is_empty() {
                    return Err(DfsError::MissingDefault.into());
                }
                let mut rules = Vec::with_capacity(path_backends.len());
                for rule in path_backends {
                    rules.push((rule.prefix.clone(), instances.get(&rule.backend)?));
                }
                let default_backend = instances.get(default_backend)?;
                Ok(Box::new(PrefixRegistry::new(default_backend, rules)))
            }
            RegistryConfig::Capability { backends } => {
                if backends.is_empty() {
                    return Err(DfsError::NoBackends.into());
                }
                let handles = backends
                    .iter()
                    .map(|identifier| instances.get(identifier))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(CapabilityRegistry::new(handles)))
            }
        }
    }
}
