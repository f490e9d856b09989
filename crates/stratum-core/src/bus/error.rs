//! Errors raised by the command, query and event buses.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("A {bus} handler is already registered for '{message_type}'")]
    HandlerAlreadyRegistered { bus: &'static str, message_type: String },

    #[error("No {bus} handler registered for '{message_type}'")]
    NoHandler { bus: &'static str, message_type: String },

    #[error("Handler for '{message_type}' failed: {message}")]
    HandlerFailed { message_type: String, message: String },

    #[error("Invalid payload for '{message_type}': {source}")]
    InvalidPayload {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bus lock poisoned during {operation}")]
    Poisoned { operation: &'static str },
}

impl BusError {
    /// Convenience constructor for handler-side failures
    pub fn handler_failed(message_type: impl Into<String>, message: impl Into<String>) -> Self {
        BusError::HandlerFailed {
            message_type: message_type.into(),
            message: message.into(),
        }
    }

    /// Wrap a payload (de)serialization failure
    pub fn invalid_payload(message_type: impl Into<String>, source: serde_json::Error) -> Self {
        BusError::InvalidPayload {
            message_type: message_type.into(),
            source,
        }
    }
}
