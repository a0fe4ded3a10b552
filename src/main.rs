// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use odmrp_sim::config::StartupConfig;
use odmrp_sim::console;
use odmrp_sim::logging::{Facility, FileSink, Logger, Severity, StdoutSink};
use odmrp_sim::network::{Network, NodeParams};
use odmrp_sim::{log_info, log_notice};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON5 startup configuration (protocol knobs and initial
    /// topology). Without it the simulation starts empty with defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the event trace to this file instead of stdout.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Minimum severity to trace (0=emergency .. 7=debug).
    #[arg(long, default_value_t = 6)]
    verbosity: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let severity = Severity::from_u8(args.verbosity)
        .with_context(|| format!("verbosity {} out of range 0-7", args.verbosity))?;
    let logger = match &args.log_file {
        Some(path) => {
            let sink = FileSink::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            Logger::new(Box::new(sink), severity)
        }
        None => Logger::new(Box::new(StdoutSink::new()), severity),
    };

    let startup = match &args.config {
        Some(path) => StartupConfig::load_from_file(path)?,
        None => StartupConfig::default(),
    };
    startup.validate()?;

    println!("ODMRP mesh simulation\n=====================");
    let net = Network::new(startup.sim, logger.clone());

    // Two passes so neighbor links may reference nodes declared later in
    // the file.
    for spec in &startup.nodes {
        net.add_node(
            spec.ip,
            NodeParams {
                multicast_source: spec.multicast_source,
                groups: spec.groups.clone(),
                neighbors: Vec::new(),
            },
        )
        .with_context(|| format!("startup config: node {}", spec.ip))?;
    }
    for spec in &startup.nodes {
        for neighbor in &spec.neighbors {
            net.connect(spec.ip, *neighbor)
                .with_context(|| format!("startup config: link {} {}", spec.ip, neighbor))?;
        }
    }
    if !startup.nodes.is_empty() {
        log_info!(
            logger,
            Facility::Config,
            &format!("loaded startup topology with {} node(s)", startup.nodes.len())
        );
    }

    let worker = tokio::spawn(Arc::clone(&net).run());
    console::run(Arc::clone(&net), logger.clone()).await?;

    // Console exited: stop the worker cooperatively.
    net.shutdown();
    worker.await?;
    log_notice!(logger, Facility::Scheduler, "simulation ended");
    logger.flush();
    Ok(())
}
