#![cfg(test)]

use super::common::{BarePlugin, test_context};
use crate::plugin_system::traits::{HealthState, HealthStatus, PluginMetadata};

#[test]
fn test_metadata_builder() {
    let metadata = PluginMetadata::new("orders", "2.1.0")
        .with_description("Order management")
        .with_dependencies(["core-logging", "payments"]);

    assert_eq!(metadata.name, "orders");
    assert_eq!(metadata.version, "2.1.0");
    assert_eq!(metadata.description.as_deref(), Some("Order management"));
    assert_eq!(metadata.dependencies, vec!["core-logging", "payments"]);
    assert_eq!(metadata.to_string(), "orders v2.1.0");
}

#[test]
fn test_metadata_deserializes_with_defaults() {
    let metadata: PluginMetadata =
        serde_json::from_str(r#"{"name":"solo","version":"1.0.0"}"#).unwrap();
    assert_eq!(metadata, PluginMetadata::new("solo", "1.0.0"));

    let json = serde_json::to_value(&metadata).unwrap();
    assert!(json.get("description").is_none());
}

#[test]
fn test_health_status_constructors() {
    let healthy = HealthStatus::healthy();
    assert!(healthy.is_healthy());
    assert_eq!(healthy.message, None);

    let degraded = HealthStatus::degraded("cache cold");
    assert!(!degraded.is_healthy());
    assert_eq!(degraded.state, HealthState::Degraded);
    assert_eq!(degraded.message.as_deref(), Some("cache cold"));

    let unhealthy = HealthStatus::unhealthy("db down");
    assert_eq!(unhealthy.state.to_string(), "unhealthy");
}

#[test]
fn test_health_state_serializes_lowercase() {
    let json = serde_json::to_string(&HealthStatus::degraded("slow")).unwrap();
    assert_eq!(json, r#"{"state":"degraded","message":"slow"}"#);
}

#[tokio::test]
async fn test_default_hooks_succeed() {
    let plugin = BarePlugin::arc("bare", &["dep"]);
    let ctx = test_context();

    assert_eq!(plugin.metadata().dependencies, vec!["dep"]);
    assert!(plugin.initialize(&ctx).await.is_ok());
    assert!(plugin.start().await.is_ok());
    assert!(plugin.stop().await.is_ok());
    assert!(plugin.health_check().await.is_healthy());
    assert!(plugin.as_context_module().is_none());
}
