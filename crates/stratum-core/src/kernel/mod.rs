//! # Stratum Core Kernel
//!
//! The `kernel` module ties the subsystems together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application)
//!   builds the runtime environment (container, buses, plugin context) once
//!   and drives the plugin lifecycle through it.
//! - **Core Constants**: application name and the container tokens of the
//!   shared buses, in the `constants` submodule.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result`
//!   alias in the `error` submodule.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
