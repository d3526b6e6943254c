use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::session::ShutdownHandle;

/// External signals the bridge knows how to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Quit,
    Hangup,
    User1,
    User2,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Interrupt => "SIGINT",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::User2 => "SIGUSR2",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Stop,
    Ignore,
}

/// Connects asynchronous stop requests to the echo loop.
///
/// The loop polls the token between iterations; sessions opened with
/// [`CancellationBridge::session_shutdown`] close as soon as a stop is
/// requested, so an in-flight read ends with an error instead of running
/// to its timeout.
#[derive(Debug, Clone, Default)]
pub struct CancellationBridge {
    cancel: CancellationToken,
}

impl CancellationBridge {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Token observed by the echo loop.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shutdown handle for a session that must close on stop.
    pub fn session_shutdown(&self) -> ShutdownHandle {
        ShutdownHandle::linked_to(&self.cancel)
    }

    /// Mark the run as stopped and close any linked session. Idempotent.
    pub fn request_stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("stop requested");
        }
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Interrupt and quit stop the run; anything else is logged and ignored.
    pub fn handle_signal(&self, signal: Signal) -> SignalAction {
        match signal {
            Signal::Interrupt | Signal::Quit => {
                self.request_stop();
                SignalAction::Stop
            }
            other => {
                warn!(signal = %other, "ignoring signal");
                SignalAction::Ignore
            }
        }
    }
}
