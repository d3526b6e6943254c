mod args;
mod signals;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::Args;
use rustping_core::{CancellationBridge, CancellationToken};
use rustping_packet::check_privileges;

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit with status 1; --help and --version exit cleanly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print()?;
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .init();

    let privilege = check_privileges();
    if privilege.has_raw_socket_access() {
        info!(%privilege, "raw socket access available");
    } else {
        warn!(%privilege, "opening the ICMP socket will likely fail");
    }

    let config = args.echo_config();
    let bridge = CancellationBridge::new(CancellationToken::new());
    signals::spawn_signal_bridge(bridge.clone()).context("failed to register signal handlers")?;

    eprintln!(
        "PING {} (timeout {}ms, interval {}ms). Press Ctrl+C to stop.",
        args.host,
        config.read_timeout.as_millis(),
        config.interval.as_millis()
    );

    let mut stdout = io::stdout().lock();
    let sent = rustping_core::ping(&args.host, config, &bridge, &mut stdout)
        .await
        .with_context(|| format!("cannot ping '{}'", args.host))?;

    info!(sent, host = %args.host, "ping finished");
    Ok(())
}
