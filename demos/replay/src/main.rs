//! Replay a command script against a dashboard snapshot
//!
//! Loads the snapshot, dispatches every command of the script through a
//! [`DashboardRuntime`] and prints each delivered event as one JSON line.
//!
//! ```text
//! dashboard-replay --snapshot data/snapshot.json --commands data/commands.jsonl
//! RUST_LOG=dashboard_dispatch_core=debug dashboard-replay ... --verbose
//! ```

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use dashboard_dispatch::model::DashboardSnapshot;
use dashboard_dispatch::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Bear,
    Tiger,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Bear => BackendKind::Bear,
            Backend::Tiger => BackendKind::Tiger,
        }
    }
}

/// Dashboard command replay - dashboard-dispatch example
#[derive(Parser, Debug)]
#[command(name = "dashboard-replay")]
#[command(about = "Replay dashboard commands and print the resulting events")]
struct Args {
    /// Dashboard snapshot (JSON) loaded before the script runs
    #[arg(long, short)]
    snapshot: PathBuf,

    /// Command script: a JSON array or one command per line
    #[arg(long, short)]
    commands: PathBuf,

    /// Session configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Workspace the dashboard lives in
    #[arg(long, short, default_value = "default")]
    workspace: String,

    /// Backend dialect recorded in the session context
    #[arg(long, value_enum, default_value = "bear")]
    backend: Backend,

    /// Trace every slice action before and after it is applied
    #[arg(long, short)]
    verbose: bool,
}

fn read_commands(path: &Path) -> Result<Vec<Command>, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    if contents.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&contents)?);
    }
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| serde_json::from_str(line).map_err(Into::into))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let snapshot: DashboardSnapshot = serde_json::from_str(&fs::read_to_string(&args.snapshot)?)?;
    let commands = read_commands(&args.commands)?;
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    let ctx = DashboardContext::new(
        BackendInfo {
            kind: args.backend.into(),
            endpoint: String::new(),
        },
        args.workspace.clone(),
        Some(snapshot.dashboard.obj_ref.clone()),
    );

    let mut session = DashboardSession::with_config(ctx, config);
    if args.verbose {
        session.add_middleware(LoggingMiddleware::verbose());
    }
    session.register_handler(EventHandler::any(|event, _| {
        println!("{}", serde_json::to_string(event)?);
        Ok(())
    }));
    session.register_handler(EventHandler::on("CommandFailed", |event, _| {
        if let EventPayload::CommandFailed { message, command, .. } = &event.payload {
            warn!(command = command.name(), correlation_id = ?event.correlation_id(), "{}", message);
        }
        Ok(())
    }));

    let runtime = DashboardRuntime::new(session);
    let shutdown = runtime.shutdown_token();
    let handle = runtime.handle();
    let task = tokio::spawn(runtime.run());

    handle.dispatch(Command::load_dashboard(snapshot).with_correlation_id("load"));
    for command in commands {
        handle.dispatch(command);
    }
    // everything queued so far still runs after cancellation
    shutdown.cancel();

    let session = task.await?;
    let failed = session
        .command_log()
        .entries()
        .filter(|entry| entry.outcome == Some(false))
        .count();
    info!(
        commands = session.command_log().len(),
        failed,
        "replay finished"
    );

    Ok(())
}
