//! # Core Logging Plugin
//!
//! Infrastructure plugin that installs the process-wide `tracing`
//! subscriber and bridges the `log` facade (used by `stratum-core`) into it.
//!
//! Configured from the `[plugins.core-logging]` section:
//!
//! ```toml
//! [plugins.core-logging]
//! level = "info,stratum_core=debug"   # EnvFilter directives
//! format = "compact"                  # pretty | compact | json
//! ```
//!
//! `RUST_LOG`, when set, takes precedence over `level`.
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use stratum_core::config::ConfigData;
use stratum_core::kernel::error::{Error as KernelError, Result as KernelResult};
use stratum_core::plugin_system::{HealthStatus, Plugin, PluginContext, PluginMetadata};
use tracing::subscriber::set_global_default;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub const PLUGIN_NAME: &str = "core-logging";
const DEFAULT_LEVEL: &str = "info";

/// Output layout of the fmt subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Settings read from the plugin's configuration section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Read `level` and `format`, falling back to defaults for absent keys.
    pub fn from_config(data: &ConfigData) -> KernelResult<Self> {
        let level = data.get_or("level", DEFAULT_LEVEL.to_string());

        let format = match data.get::<serde_json::Value>("format") {
            None => LogFormat::default(),
            Some(raw) => serde_json::from_value(raw.clone()).map_err(|_| {
                KernelError::Other(format!(
                    "{}: unsupported log format {} (expected pretty, compact or json)",
                    PLUGIN_NAME, raw
                ))
            })?,
        };

        Ok(Self { level, format })
    }

    /// Filter from `RUST_LOG` if set, else from the configured level.
    pub fn env_filter(&self) -> KernelResult<EnvFilter> {
        let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        self.filter_with(from_env.as_deref())
    }

    fn filter_with(&self, env_directives: Option<&str>) -> KernelResult<EnvFilter> {
        let directives = env_directives
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(self.level.as_str());
        EnvFilter::try_new(directives).map_err(|e| {
            KernelError::Other(format!(
                "{}: invalid log filter '{}': {}",
                PLUGIN_NAME, directives, e
            ))
        })
    }
}

/// Installs the global subscriber during `initialize`
#[derive(Debug)]
pub struct LoggingPlugin {
    metadata: PluginMetadata,
    installed: AtomicBool,
}

impl Default for LoggingPlugin {
    fn default() -> Self {
        Self {
            metadata: PluginMetadata::new(PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
                .with_description("Sets up tracing-based application logging"),
            installed: AtomicBool::new(false),
        }
    }
}

impl LoggingPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this instance installed the global subscriber
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn install(&self, config: &LoggingConfig) -> KernelResult<bool> {
        let filter = config.env_filter()?;
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

        let result = match config.format {
            LogFormat::Pretty => set_global_default(builder.pretty().finish()),
            LogFormat::Compact => set_global_default(builder.compact().finish()),
            LogFormat::Json => set_global_default(builder.json().finish()),
        };
        if result.is_err() {
            debug!("A global tracing subscriber is already installed; keeping it");
            return Ok(false);
        }

        if let Err(e) = tracing_log::LogTracer::init() {
            debug!("log facade already has a logger ({}); not bridging", e);
        }
        Ok(true)
    }
}

#[async_trait]
impl Plugin for LoggingPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn initialize(&self, ctx: &PluginContext) -> KernelResult<()> {
        let config = LoggingConfig::from_config(&ctx.plugin_config(PLUGIN_NAME))?;
        let installed = self.install(&config)?;
        self.installed.store(installed, Ordering::SeqCst);
        info!(
            format = ?config.format,
            "Initializing Core Logging Plugin v{}",
            self.metadata.version
        );
        Ok(())
    }

    async fn stop(&self) -> KernelResult<()> {
        info!("Shutting down Core Logging Plugin");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        if self.is_installed() {
            HealthStatus::healthy()
        } else {
            HealthStatus::degraded("using a subscriber installed elsewhere")
        }
    }
}
