//! Errors raised while registering or resolving container entries.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No provider registered for token '{token}'")]
    NotRegistered { token: String },

    #[error("Token '{token}' does not resolve to a value of type {expected}")]
    TypeMismatch { token: String, expected: &'static str },

    #[error("Factory for token '{token}' failed: {message}")]
    FactoryFailed { token: String, message: String },

    #[error("Container lock poisoned during {operation}")]
    Poisoned { operation: &'static str },
}
