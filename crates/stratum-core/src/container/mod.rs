//! # Stratum Dependency Container
//!
//! A small token-keyed dependency-injection container shared by every plugin
//! through the [`PluginContext`](crate::plugin_system::PluginContext).
//!
//! Each token maps to a factory and a [`Lifetime`]. Singleton factories run
//! on first resolution and the produced value is cached; transient factories
//! run on every resolution. Values are stored type-erased and recovered with
//! [`Container::resolve`], which reports a [`ContainerError::TypeMismatch`]
//! when the caller asks for the wrong type.
//!
//! The internal lock is released before a factory runs, so factories are free
//! to resolve other tokens. A factory that ends up resolving a token whose
//! factory is still running on the same thread gets a
//! [`ContainerError::FactoryFailed`] naming the resolution chain.
pub mod error;

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, ThreadId};

pub use error::ContainerError;

/// Type-erased shared value held by the container
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Factory producing a container value; receives the container so it can
/// resolve its own dependencies.
pub type Factory = Arc<dyn Fn(&Container) -> Result<Instance, ContainerError> + Send + Sync>;

/// How long a resolved value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Created once, then shared
    #[default]
    Singleton,
    /// Created on every resolution
    Transient,
}

/// Options accepted by [`Container::register`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterOptions {
    pub lifetime: Lifetime,
}

impl RegisterOptions {
    pub fn singleton() -> Self {
        Self { lifetime: Lifetime::Singleton }
    }

    pub fn transient() -> Self {
        Self { lifetime: Lifetime::Transient }
    }
}

struct Registration {
    factory: Factory,
    lifetime: Lifetime,
    cached: Option<Instance>,
}

/// Token-keyed dependency container
#[derive(Default)]
pub struct Container {
    registrations: RwLock<HashMap<String, Registration>>,
    /// Tokens whose factory is currently running, per resolving thread
    in_flight: Mutex<HashMap<ThreadId, Vec<String>>>,
}

/// Pops the token pushed by [`Container::enter`] on every exit path
struct InFlight<'c> {
    container: &'c Container,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.container.in_flight.lock() {
            let id = thread::current().id();
            if let Some(stack) = in_flight.get_mut(&id) {
                stack.pop();
                if stack.is_empty() {
                    in_flight.remove(&id);
                }
            }
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("tokens", &self.tokens())
            .finish()
    }
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `token`. A later registration of the same
    /// token replaces the earlier one, including any cached singleton.
    pub fn register<F>(
        &self,
        token: &str,
        factory: F,
        options: RegisterOptions,
    ) -> Result<(), ContainerError>
    where
        F: Fn(&Container) -> Result<Instance, ContainerError> + Send + Sync + 'static,
    {
        self.register_factory(token, Arc::new(factory), options.lifetime)
    }

    /// Register an already shared factory under `token`.
    pub fn register_factory(
        &self,
        token: &str,
        factory: Factory,
        lifetime: Lifetime,
    ) -> Result<(), ContainerError> {
        let mut registrations = self
            .registrations
            .write()
            .map_err(|_| ContainerError::Poisoned { operation: "register" })?;
        if registrations.contains_key(token) {
            log::debug!("Container token '{}' re-registered; previous provider replaced", token);
        }
        registrations.insert(
            token.to_string(),
            Registration { factory, lifetime, cached: None },
        );
        Ok(())
    }

    /// Register an existing value as a singleton.
    pub fn register_instance<T>(&self, token: &str, instance: Arc<T>) -> Result<(), ContainerError>
    where
        T: Any + Send + Sync,
    {
        let instance: Instance = instance;
        self.register(token, move |_| Ok(instance.clone()), RegisterOptions::singleton())
    }

    /// Resolve `token` as a shared `T`.
    pub fn resolve<T>(&self, token: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Any + Send + Sync,
    {
        let instance = self.resolve_any(token)?;
        instance.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            token: token.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Resolve `token` without committing to a type.
    pub fn resolve_any(&self, token: &str) -> Result<Instance, ContainerError> {
        let (factory, lifetime) = {
            let registrations = self
                .registrations
                .read()
                .map_err(|_| ContainerError::Poisoned { operation: "resolve" })?;
            let registration = registrations
                .get(token)
                .ok_or_else(|| ContainerError::NotRegistered { token: token.to_string() })?;
            if let Some(cached) = &registration.cached {
                return Ok(cached.clone());
            }
            (registration.factory.clone(), registration.lifetime)
        };

        // Lock released: the factory may resolve other tokens.
        let instance = {
            let _in_flight = self.enter(token)?;
            factory(self)?
        };

        if lifetime == Lifetime::Singleton {
            let mut registrations = self
                .registrations
                .write()
                .map_err(|_| ContainerError::Poisoned { operation: "resolve" })?;
            if let Some(registration) = registrations.get_mut(token) {
                // A concurrent first resolution may have won; keep its value.
                if let Some(existing) = &registration.cached {
                    return Ok(existing.clone());
                }
                registration.cached = Some(instance.clone());
            }
        }

        Ok(instance)
    }

    /// Mark `token` as being built on this thread; fails if it already is.
    fn enter(&self, token: &str) -> Result<InFlight<'_>, ContainerError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| ContainerError::Poisoned { operation: "resolve" })?;
        let stack = in_flight.entry(thread::current().id()).or_default();
        if let Some(start) = stack.iter().position(|t| t == token) {
            let mut chain = stack[start..].to_vec();
            chain.push(token.to_string());
            log::error!("Circular resolution in container: {}", chain.join(" -> "));
            return Err(ContainerError::FactoryFailed {
                token: token.to_string(),
                message: format!("circular resolution: {}", chain.join(" -> ")),
            });
        }
        stack.push(token.to_string());
        Ok(InFlight { container: self })
    }

    /// Check if a token has a provider
    pub fn is_registered(&self, token: &str) -> bool {
        self.registrations
            .read()
            .map(|r| r.contains_key(token))
            .unwrap_or(false)
    }

    /// Lifetime of the provider registered under `token`
    pub fn lifetime_of(&self, token: &str) -> Option<Lifetime> {
        self.registrations
            .read()
            .ok()
            .and_then(|r| r.get(token).map(|reg| reg.lifetime))
    }

    /// Registered tokens, sorted
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .registrations
            .read()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        tokens.sort();
        tokens
    }
}
