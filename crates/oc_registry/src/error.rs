use oc_plugins::error::InitError;
use thiserror::Error;

/// Errors returned by [`Registry`](crate::Registry) operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Plugins can only be registered, and the registry started, once.
    #[error("registry has already been started")]
    AlreadyStarted,

    /// The registry was closed.
    #[error("registry has been closed")]
    Closed,

    /// Plugin initialization failed.
    #[error(transparent)]
    Plugins(#[from] InitError),
}

impl RegistryError {
    /// The initialization failure, if that is what this error is.
    #[must_use]
    pub fn as_init_error(&self) -> Option<&InitError> {
        match self {
            Self::Plugins(err) => Some(err),
            _ => None,
        }
    }
}
