//! Ingress health-check reconciler CLI.
//!
//! Drives the [`HealthChecker`] against a local JSON store standing in for
//! the compute API.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command ──▶ HealthChecker ──▶ Namer (port → name)
//!                        │
//!                        ├──▶ HealthCheck (domain value ⇄ wire)
//!                        │
//!                        ▼
//!               HealthCheckProvider ──▶ FileProvider ──▶ store.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use ingress_healthchecks::cloud::{FileProvider, HealthCheckProvider};
use ingress_healthchecks::config::{load_config, ReconcilerConfig};
use ingress_healthchecks::healthchecks::{HealthCheck, HealthChecker, Protocol};
use ingress_healthchecks::namer::ClusterNamer;
use ingress_healthchecks::observability::logging;

#[derive(Parser)]
#[command(name = "ingress-healthchecks")]
#[command(about = "Reconcile load balancer health checks for Ingress backends", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON store file (overrides the configured path)
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or replace the health check for a backend port
    Sync {
        #[arg(long)]
        port: i64,
        #[arg(long, default_value = "HTTP")]
        protocol: Protocol,
        /// Probe the port the backend serves on instead of a fixed port
        #[arg(long)]
        serving_port: bool,
        #[arg(long)]
        request_path: Option<String>,
    },
    /// Show the health check for a backend port
    Get {
        #[arg(long)]
        port: i64,
        #[arg(long)]
        serving_port: bool,
    },
    /// Delete the health check for a backend port
    Delete {
        #[arg(long)]
        port: i64,
        /// Succeed when the health check is already gone
        #[arg(long)]
        ignore_missing: bool,
    },
    /// Delete the legacy HTTP and HTTPS health checks for a backend port
    DeleteLegacy {
        #[arg(long)]
        port: i64,
    },
    /// Sync the unified health check, then remove the legacy ones
    Migrate {
        #[arg(long)]
        port: i64,
        #[arg(long, default_value = "HTTP")]
        protocol: Protocol,
        #[arg(long)]
        serving_port: bool,
    },
    /// List all health checks
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ReconcilerConfig::default(),
    };
    logging::init(&config.observability);

    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.store.path));

    let cloud = Arc::new(FileProvider::open(&store_path)?);
    let namer = Arc::new(ClusterNamer::new(config.cluster.name.clone()));
    let checker = HealthChecker::new(cloud.clone(), namer.clone(), config.health_check.clone());

    tracing::info!(
        store = %cloud.path().display(),
        cluster = %namer.cluster_name(),
        request_path = %checker.defaults().request_path,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Sync {
            port,
            protocol,
            serving_port,
            request_path,
        } => {
            let mut hc = checker.new_check(port, protocol, serving_port);
            if let Some(path) = request_path {
                hc.request_path = path;
            }
            let created = checker.sync(&hc)?;
            println!("{} {}", if created { "created" } else { "updated" }, hc.name);
        }
        Commands::Get { port, serving_port } => {
            let hc = checker.get(port, serving_port)?;
            print_check(&hc)?;
        }
        Commands::Delete {
            port,
            ignore_missing,
        } => match checker.delete(port) {
            Ok(()) => println!("deleted port {}", port),
            Err(e) if ignore_missing && e.is_not_found() => {
                println!("no health check for port {}", port)
            }
            Err(e) => return Err(e.into()),
        },
        Commands::DeleteLegacy { port } => {
            checker.delete_legacy(port)?;
            println!("deleted legacy health checks for port {}", port);
        }
        Commands::Migrate {
            port,
            protocol,
            serving_port,
        } => {
            let hc = checker.new_check(port, protocol, serving_port);
            checker.sync(&hc)?;
            match checker.delete_legacy(port) {
                Ok(()) => tracing::info!(port, "Removed legacy health checks"),
                Err(e) if e.is_not_found() => {
                    tracing::info!(port, "No legacy health checks, already migrated")
                }
                Err(e) => return Err(e.into()),
            }
            println!("migrated {}", hc.name);
        }
        Commands::List => {
            let all = cloud.list_health_checks()?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}

fn print_check(hc: &HealthCheck) -> Result<(), Box<dyn std::error::Error>> {
    match hc.to_alpha_wire() {
        Ok(wire) => println!("{}", serde_json::to_string_pretty(&wire)?),
        // Still worth showing what the remote side holds.
        Err(e) => {
            tracing::warn!(name = %hc.name, error = %e, "Health check not expressible on the wire");
            println!("{:#?}", hc);
        }
    }
    Ok(())
}
