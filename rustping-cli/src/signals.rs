use std::io;

use rustping_core::{CancellationBridge, Signal, SignalAction};
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tracing::debug;

/// Forward process signals to the cancellation bridge.
///
/// SIGINT and SIGQUIT stop the run; SIGHUP, SIGUSR1 and SIGUSR2 are caught
/// so they only get logged.
pub fn spawn_signal_bridge(bridge: CancellationBridge) -> io::Result<JoinHandle<()>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut quit = signal(SignalKind::quit())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut user1 = signal(SignalKind::user_defined1())?;
    let mut user2 = signal(SignalKind::user_defined2())?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => Signal::Interrupt,
                Some(()) = quit.recv() => Signal::Quit,
                Some(()) = hangup.recv() => Signal::Hangup,
                Some(()) = user1.recv() => Signal::User1,
                Some(()) = user2.recv() => Signal::User2,
                else => break,
            };
            debug!(signal = %received, "signal received");

            if bridge.handle_signal(received) == SignalAction::Stop {
                eprintln!("\n{received} received, stopping...");
                break;
            }
        }
    }))
}
