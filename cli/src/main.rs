use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ordo_kernel::config::ServerConfig;
use ordo_kernel::group::LocalGroup;
use ordo_kernel::history::VersionTag;
use ordo_kernel::script::{run_script, Operation, Outcome};
use ordo_kernel::server::{DynOrderedService, SimpleOrderedServer};

type Group = LocalGroup<DynOrderedService<String, VersionTag, Value>>;

/// Ordo ordered server CLI
#[derive(Parser, Debug)]
#[command(name = "ordo")]
#[command(about = "Run push/pull scripts against an in-process ordered server", long_about = None)]
struct Cli {
    /// Path to server config JSON
    #[arg(long)]
    config: Option<String>,

    /// Path to operations script JSON
    #[arg(long)]
    ops: String,

    /// Extra group members besides the server role
    #[arg(long = "member")]
    members: Vec<String>,
}

/// Wrapper for JSON output
#[derive(Debug, Serialize)]
struct CliOutput {
    server: String,
    depth: usize,
    outcomes: Vec<Outcome>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ----------------------------
    // Load server config
    // ----------------------------
    let config = if let Some(path) = &cli.config {
        let data = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        serde_json::from_str::<ServerConfig>(&data)?
    } else {
        ServerConfig::default()
    };

    // ----------------------------
    // Load operations
    // ----------------------------
    let ops_data =
        fs::read_to_string(&cli.ops).with_context(|| format!("reading ops {}", cli.ops))?;
    let ops: Vec<Operation> = serde_json::from_str(&ops_data)?;

    // ----------------------------
    // Start server
    // ----------------------------
    let group: Arc<Group> = Arc::new(LocalGroup::new(cli.members.iter().map(String::as_str)));
    group.add_member(config.server_role.clone());

    let server: SimpleOrderedServer<String, VersionTag, Value, Group> =
        SimpleOrderedServer::new(config, group)?;

    // ----------------------------
    // Run script
    // ----------------------------
    let outcomes = run_script(&server, ops)?;
    info!(operations = outcomes.len(), "script finished");

    // ----------------------------
    // Output
    // ----------------------------
    let output = CliOutput {
        server: server.config().server_name.clone(),
        depth: server.config().version_depth,
        outcomes,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
