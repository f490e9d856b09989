//! # Stratum Core Kernel Errors
//!
//! Defines the top-level error type of the Stratum core.
//!
//! [`Error`] rolls up the typed errors of every subsystem (plugin system,
//! container, buses, configuration) through `#[from]` conversions, so code
//! anywhere in the crate can use `?` and return [`Result`]. Each error
//! carries a stable machine-readable code, available through [`Error::code`].
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::bus::error::BusError;
use crate::config::error::ConfigError;
use crate::container::error::ContainerError;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::error::PluginSystemError;

/// Top-level error of the Stratum core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed plugin system error (registration, ordering, lifecycle)
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Dependency container error
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Command, query or event bus error
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Configuration loading or parsing error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Stable error code of the classified error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::PluginSystem(e) => e.code(),
            Error::Container(_) => "RESOLUTION_FAILED",
            Error::Bus(_) => "BUS_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Other(_) => "INTERNAL_ERROR",
        }
    }
}

// Ordering failures are raised by the graph but surface through the plugin system.
impl From<DependencyError> for Error {
    fn from(err: DependencyError) -> Self {
        Error::PluginSystem(PluginSystemError::DependencyResolution(err))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
