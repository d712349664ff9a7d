use thiserror::Error;

/// Conditions raised by the registry and its configuration layer.
///
/// They travel inside `anyhow::Error`; use `err.downcast_ref::<DfsError>()` to match on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DfsError {
    /// No registered backend supports the path.
    #[error("no handler supports path `{path}`")]
    NoHandler { path: String },

    /// The backend factory does not know the identifier.
    #[error("unknown backend identifier `{0}`")]
    UnknownBackend(String),

    /// A capability registry was configured without any backend.
    #[error("at least one backend must be configured")]
    NoBackends,

    /// A prefix registry was configured without a default backend.
    #[error("a default backend must be configured")]
    MissingDefault,
}
