mod cli; // Console reporting helpers

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand}; // Use clap for argument parsing
use log::{error, info};
use stratum_core::config::AppConfig;
use stratum_core::kernel::bootstrap::Application;
use stratum_core::kernel::constants::DEFAULT_CONFIG_FILE;
use stratum_core::kernel::error::Result as KernelResult;

// --- Plugins registered statically ---
use core_logging::LoggingPlugin;
use orders_context::OrdersModule;

/// Stratum: dependency-ordered component orchestration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Configuration file (JSON, YAML or TOML); defaults to ./stratum.toml when present
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered plugins in load order
    Plugins,
    /// Initialize and start all plugins, run the orders demo, then shut down
    Run,
}

fn load_config(path: Option<&Path>) -> KernelResult<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::load(path)?),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                Ok(AppConfig::load(default_path)?)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

fn build_application(config: AppConfig) -> KernelResult<Application> {
    let mut app = Application::new(config)?;
    app.register_plugin(Arc::new(LoggingPlugin::new()))?;
    app.register_context_module(OrdersModule::new())?;
    Ok(app)
}

async fn run(app: &mut Application) -> ExitCode {
    if let Err(e) = app.run().await {
        // run() has already attempted teardown
        eprintln!("Fatal: {} [{}]", e, e.code());
        return ExitCode::FAILURE;
    }

    cli::print_health(&app.health().await);

    let mut exit = ExitCode::SUCCESS;
    if let Err(e) = cli::run_orders_demo(app).await {
        error!("Orders demo failed: {}", e);
        eprintln!("Demo failed: {}", e);
        exit = ExitCode::FAILURE;
    }

    println!("Shutting down application...");
    let report = app.shutdown().await;
    cli::print_shutdown_report(&report);
    exit
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Initializing application...");
    let mut app = match build_application(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {} [{}]", e, e.code());
            return ExitCode::FAILURE;
        }
    };

    match args.command.unwrap_or(Commands::Run) {
        Commands::Plugins => match cli::print_plugins(&app) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Cannot order plugins: {} [{}]", e, e.code());
                ExitCode::FAILURE
            }
        },
        Commands::Run => {
            info!("Running {}", app.config().app_name);
            run(&mut app).await
        }
    }
}
