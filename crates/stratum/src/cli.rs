//! Console output for the `stratum` binary.
use orders_context::{CREATE_ORDER, GET_ORDER, create_order_payload};
use serde_json::json;
use stratum_core::kernel::bootstrap::Application;
use stratum_core::kernel::error::Result as KernelResult;
use stratum_core::plugin_system::{HealthStatus, ShutdownReport};

/// Print registered plugins in the order they would be initialized.
pub fn print_plugins(app: &Application) -> KernelResult<()> {
    let plugins = app.lifecycle().registry().plugins_in_order()?;
    if plugins.is_empty() {
        println!("No plugins registered.");
        return Ok(());
    }

    println!("Registered plugins (load order):");
    for (position, plugin) in plugins.iter().enumerate() {
        let metadata = plugin.metadata();
        let kind = if plugin.as_context_module().is_some() { "context" } else { "plugin" };
        let deps = if metadata.dependencies.is_empty() {
            "-".to_string()
        } else {
            metadata.dependencies.join(", ")
        };
        println!(
            "  {}. {} v{} [{}] depends on: {}",
            position + 1,
            metadata.name,
            metadata.version,
            kind,
            deps
        );
    }
    Ok(())
}

pub fn print_health(statuses: &[(String, HealthStatus)]) {
    println!("Health:");
    for (name, status) in statuses {
        match &status.message {
            Some(message) => println!("  - {}: {} ({})", name, status.state, message),
            None => println!("  - {}: {}", name, status.state),
        }
    }
}

/// Place one order through the command bus and read it back through the query bus.
pub async fn run_orders_demo(app: &Application) -> KernelResult<()> {
    let created = app
        .command_bus()
        .execute(CREATE_ORDER, create_order_payload("demo-customer", &[("widget", 3)]))
        .await?;
    println!("Created order: {}", created);

    let found = app.query_bus().ask(GET_ORDER, json!({ "id": created["id"] })).await?;
    println!("Fetched order: {}", found);
    Ok(())
}

pub fn print_shutdown_report(report: &ShutdownReport) {
    if report.is_clean() {
        println!("Stopped {} plugins cleanly.", report.attempted.len());
        return;
    }
    eprintln!("Shutdown finished with {} failure(s):", report.failures.len());
    for failure in &report.failures {
        eprintln!("  - {}: {}", failure.plugin_name, failure.error);
    }
}
