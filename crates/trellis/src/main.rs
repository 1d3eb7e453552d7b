mod host; // Declare the host module

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use serde_json::Value;
use trellis_core::kernel::constants;
use trellis_core::{Application, BootReport, ConfigOverrides, HostLoaders, Result};

use host::PrintingHost;

/// Trellis: registers, orders and boots application modules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Directory holding module manifests (JSON, YAML or TOML)
    #[arg(long, value_name = "DIR", default_value = constants::DEFAULT_MODULES_DIR)]
    modules: PathBuf,

    /// Directory holding per-module config overrides, one file per module
    #[arg(long, value_name = "DIR", default_value = constants::DEFAULT_CONFIG_DIR)]
    config: PathBuf,

    /// Prefix of environment variables that override module config
    #[arg(long, value_name = "PREFIX", default_value = constants::DEFAULT_ENV_PREFIX)]
    env_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered modules
    List,
    /// Print the boot order, one module per line
    Order,
    /// Boot every active module, printing each resource load
    Boot {
        /// Deactivate a module before booting (repeatable)
        #[arg(long, value_name = "NAME")]
        disable: Vec<String>,
    },
    /// Boot, then print a module's resolved config value
    Config {
        /// The module to inspect
        module: String,
        /// Dot-separated key, e.g. `comments.enabled`
        key: String,
    },
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let mut overrides = ConfigOverrides::load_dir(&args.config)?;
    let applied = overrides.apply_env(&args.env_prefix)?;

    // Logging starts here so every command reports registration and manifest
    // loading; booting core-logging later keeps this subscriber
    core_logging::install_early(&overrides);
    debug!("Applied {} environment override(s) with prefix '{}'", applied, args.env_prefix);

    let mut app = Application::with_overrides(overrides);

    // Core modules are linked in and registered ahead of any manifest
    app.register(core_logging::descriptor())?;
    app.load_manifests(&args.modules)?;

    match args.command {
        Commands::List => {
            if app.registry().is_empty() {
                println!("No modules registered.");
            }
            for descriptor in app.registry().all() {
                let status = if descriptor.is_active() { "Active" } else { "Inactive" };
                println!(
                    "  - Name: {}, Version: {}, Status: {}",
                    descriptor.name(),
                    descriptor.version(),
                    status
                );
            }
        }
        Commands::Order => {
            for name in app.registry().boot_order() {
                println!("{}", name);
            }
        }
        Commands::Boot { disable } => {
            for name in &disable {
                app.deactivate(name)?;
            }
            let mut host = PrintingHost::new();
            println!("Booting modules...");
            let report = app.boot(&mut host)?;
            print_summary(&report, host.loads());
        }
        Commands::Config { module, key } => {
            // Resource loads are not printed so stdout holds only the value
            app.boot(&mut HostLoaders::new())?;
            match app.config(&module)?.get(&key)? {
                Value::String(s) => println!("{}", s),
                other => println!("{}", other),
            }
        }
    }
    Ok(())
}

fn print_summary(report: &BootReport, loads: usize) {
    println!(
        "Booted {} module(s): {}",
        report.booted.len(),
        report.booted.join(", ")
    );
    if !report.skipped_inactive.is_empty() {
        println!("Inactive: {}", report.skipped_inactive.join(", "));
    }
    if !report.skipped_unmet.is_empty() {
        println!("Not booted (dependency unavailable): {}", report.skipped_unmet.join(", "));
    }
    println!("{} resource load(s) requested.", loads);
}
