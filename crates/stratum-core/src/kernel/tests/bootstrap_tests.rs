use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::bus::{BusResult, CommandBus, CommandHandler, EventBus, QueryBus};
use crate::config::{AppConfig, ConfigData};
use crate::container::Container;
use crate::kernel::bootstrap::Application;
use crate::kernel::constants::{COMMAND_BUS_TOKEN, EVENT_BUS_TOKEN, QUERY_BUS_TOKEN};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::{
    CommandDefinition, ContextModule, LifecyclePhase, Plugin, PluginContext, PluginMetadata,
};

type Log = Arc<StdMutex<Vec<String>>>;

/// Plugin recording its hooks, optionally failing one of them
struct Recorder {
    metadata: PluginMetadata,
    log: Log,
    fail_start: bool,
}

impl Recorder {
    fn arc(name: &str, deps: &[&str], log: &Log, fail_start: bool) -> Arc<dyn Plugin> {
        Arc::new(Self {
            metadata: PluginMetadata::new(name, "1.0.0").with_dependencies(deps.iter().copied()),
            log: log.clone(),
            fail_start,
        })
    }

    fn push(&self, hook: &str) {
        self.log.lock().unwrap().push(format!("{}:{}", hook, self.metadata.name));
    }
}

#[async_trait]
impl Plugin for Recorder {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn initialize(&self, ctx: &PluginContext) -> Result<()> {
        assert_eq!(ctx.current_plugin_name().as_deref(), Some(self.metadata.name.as_str()));
        self.push("init");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        self.push("start");
        if self.fail_start {
            return Err(Error::from("refusing to start"));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.push("stop");
        Ok(())
    }
}

struct Echo;

#[async_trait]
impl CommandHandler for Echo {
    async fn handle(&self, payload: Value) -> BusResult<Value> {
        Ok(payload)
    }
}

struct EchoModule {
    metadata: PluginMetadata,
}

impl ContextModule for EchoModule {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn context_name(&self) -> &str {
        "echo"
    }

    fn commands(&self, _container: &Container) -> Result<Vec<CommandDefinition>> {
        Ok(vec![CommandDefinition::new("Echo", "echo.say", Arc::new(Echo))])
    }
}

fn new_log() -> Log {
    Arc::new(StdMutex::new(Vec::new()))
}

fn logged(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn test_application_new_registers_buses() {
    let app = Application::new(AppConfig::default()).unwrap();
    let container = app.container();

    let command_bus = container.resolve::<CommandBus>(COMMAND_BUS_TOKEN).unwrap();
    assert!(Arc::ptr_eq(&command_bus, app.command_bus()));
    let query_bus = container.resolve::<QueryBus>(QUERY_BUS_TOKEN).unwrap();
    assert!(Arc::ptr_eq(&query_bus, app.query_bus()));
    let event_bus = container.resolve::<EventBus>(EVENT_BUS_TOKEN).unwrap();
    assert!(Arc::ptr_eq(&event_bus, app.event_bus()));

    assert!(!app.is_running());
    assert_eq!(app.lifecycle().phase(), LifecyclePhase::Uninitialized);
    assert_eq!(app.config().app_name, "Stratum");
}

#[test]
fn test_application_shares_config_with_plugins() {
    let mut config = AppConfig::default();
    let mut section = ConfigData::new();
    section.set("greeting", "hi").unwrap();
    config.set_plugin_config("echo", section);

    let app = Application::new(config).unwrap();
    let seen = app.context().plugin_config("echo");
    assert_eq!(seen.get::<String>("greeting").as_deref(), Some("hi"));
    assert!(app.context().plugin_config("other").is_empty());
}

#[tokio::test]
async fn test_run_and_shutdown() {
    let log = new_log();
    let mut app = Application::new(AppConfig::default()).unwrap();
    app.register_plugin(Recorder::arc("db", &[], &log, false)).unwrap();
    app.register_plugin(Recorder::arc("api", &["db"], &log, false)).unwrap();

    app.run().await.unwrap();
    assert!(app.is_running());
    assert_eq!(app.health().await.len(), 2);

    let report = app.shutdown().await;
    assert!(report.is_clean());
    assert!(!app.is_running());
    assert_eq!(
        logged(&log),
        vec!["init:db", "init:api", "start:db", "start:api", "stop:api", "stop:db"]
    );
}

#[tokio::test]
async fn test_run_failure_shuts_down_and_returns_error() {
    let log = new_log();
    let mut app = Application::new(AppConfig::default()).unwrap();
    app.register_plugin(Recorder::arc("db", &[], &log, false)).unwrap();
    app.register_plugin(Recorder::arc("api", &["db"], &log, true)).unwrap();

    let err = app.run().await.unwrap_err();

    assert_eq!(err.code(), "PLUGIN_LIFECYCLE_ERROR");
    assert!(err.to_string().contains("'api' failed during start"));
    assert_eq!(app.lifecycle().phase(), LifecyclePhase::Stopped);
    assert_eq!(
        logged(&log),
        vec!["init:db", "init:api", "start:db", "start:api", "stop:api", "stop:db"]
    );
}

#[tokio::test]
async fn test_run_with_missing_dependency() {
    let log = new_log();
    let mut app = Application::new(AppConfig::default()).unwrap();
    app.register_plugin(Recorder::arc("api", &["db"], &log, false)).unwrap();

    let err = app.run().await.unwrap_err();

    assert_eq!(err.code(), "MISSING_DEPENDENCY");
    // Shutdown falls back to registration order and still calls stop
    assert_eq!(logged(&log), vec!["stop:api"]);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let log = new_log();
    let mut app = Application::new(AppConfig::default()).unwrap();
    app.register_plugin(Recorder::arc("db", &[], &log, false)).unwrap();

    let err = app.register_plugin(Recorder::arc("db", &[], &log, false)).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_PLUGIN");
    assert_eq!(app.lifecycle().registry().len(), 1);
}

#[tokio::test]
async fn test_context_module_is_wired_on_run() {
    let mut app = Application::new(AppConfig::default()).unwrap();
    app.register_context_module(EchoModule {
        metadata: PluginMetadata::new("echo-context", "0.1.0"),
    })
    .unwrap();

    app.run().await.unwrap();

    let echoed = app.command_bus().execute("echo.say", json!({ "text": "hi" })).await.unwrap();
    assert_eq!(echoed, json!({ "text": "hi" }));
    assert!(app.shutdown().await.is_clean());
}
