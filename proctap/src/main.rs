//! Proctap Controller
//!
//! Attaches to the target process, injects the agent script and relays the
//! agent's messages to stdout until stdin closes. Stdout carries only relayed
//! agent output; diagnostics go to stderr.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use proctap_core::engine::frida::FridaEngine;
use proctap_core::{deploy, hold_until_eof, AgentSource, MessageRelay, MessageSink, Target};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "proctap",
    version,
    about = "Inject an instrumentation agent into a running process and stream its messages"
)]
struct Cli {
    /// Process name or numeric PID to attach to
    target: Target,

    /// Path to the agent script injected into the target
    #[arg(short, long, default_value = "agent/_agent.js")]
    agent: PathBuf,
}

fn main() -> Result<()> {
    // Logging to stderr (stdout is for relayed agent messages)
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let agent = AgentSource::load(&cli.agent)?;
    info!(
        "loaded agent {} ({} bytes)",
        agent.path().display(),
        agent.len()
    );

    let mut relay = MessageRelay::new(io::stdout());
    let sink: MessageSink = Box::new(move |message| {
        if let Err(err) = relay.deliver(&message) {
            warn!("failed to write relayed message: {err}");
        }
    });

    let mut engine = FridaEngine::new();
    let _trace = deploy(&mut engine, &cli.target, &agent, sink)?;
    info!("agent running in '{}'; close stdin to exit", cli.target);

    hold_until_eof(io::stdin().lock())?;

    info!("stdin closed, shutting down");
    Ok(())
}
