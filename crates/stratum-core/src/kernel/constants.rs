/// Application name
pub const APP_NAME: &str = "Stratum";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Container token of the shared command bus
pub const COMMAND_BUS_TOKEN: &str = "command_bus";

/// Container token of the shared query bus
pub const QUERY_BUS_TOKEN: &str = "query_bus";

/// Container token of the shared event bus
pub const EVENT_BUS_TOKEN: &str = "event_bus";

/// Default configuration file name looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "stratum.toml";
