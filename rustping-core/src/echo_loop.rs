// ---------------------------------------------------------------------------
// Echo loop
// ---------------------------------------------------------------------------
//
// Sends one echo request per iteration, prints a line for every reply and
// keeps going through timeouts and I/O errors until cancelled.

use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Duration;

use rustping_packet::EchoPacket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EchoConfig;
use crate::error::{ExchangeError, PingError};
use crate::session::{Reply, ShutdownHandle, Transport};

/// 16-bit echo sequence number that wraps 65535 -> 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter(u16);

impl SequenceCounter {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn starting_at(sequence_number: u16) -> Self {
        Self(sequence_number)
    }

    pub const fn current(&self) -> u16 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// The line printed for a successful exchange.
pub fn format_reply(reply: &Reply, remote: Ipv4Addr, sequence_number: u16) -> String {
    format!(
        "{} bytes from {}: seq={} time={}ms",
        reply.bytes,
        remote,
        sequence_number,
        reply.rtt_millis()
    )
}

/// Drives a [`Transport`] until the cancellation token fires.
pub struct EchoLoop<T: Transport> {
    transport: T,
    config: EchoConfig,
    cancel: CancellationToken,
    sequence: SequenceCounter,
}

impl<T: Transport> EchoLoop<T> {
    pub fn new(transport: T, config: EchoConfig, cancel: CancellationToken) -> Self {
        Self {
            transport,
            config,
            cancel,
            sequence: SequenceCounter::new(),
        }
    }

    /// Start from a sequence number other than 0.
    pub fn with_sequence(mut self, sequence: SequenceCounter) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.transport.shutdown_handle()
    }

    /// Run until cancelled or the session is closed, writing one line to
    /// `out` per reply.
    ///
    /// Returns the number of exchanges attempted, failed ones included; one
    /// cut short by a closed session is not counted. The transport is closed
    /// before returning, also when writing the report fails.
    pub async fn run<W: Write>(mut self, out: &mut W) -> Result<u64, PingError> {
        let result = self.drive(out).await;
        self.transport.close();
        if let Ok(sent) = result {
            info!(sent, "echo loop stopped");
        }
        result
    }

    async fn drive<W: Write>(&mut self, out: &mut W) -> Result<u64, PingError> {
        let remote = self.transport.remote_addr();
        let mut sent: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let seq = self.sequence.current();
            let packet = EchoPacket::echo_request(seq);

            match self.transport.exchange(&packet).await {
                Ok(reply) => {
                    writeln!(out, "{}", format_reply(&reply, remote, seq))?;
                    out.flush()?;
                }
                Err(ExchangeError::Closed) => {
                    // A closed session cannot send again; the run is over.
                    debug!(seq, "session closed, stopping echo loop");
                    break;
                }
                Err(e) if e.is_timeout() => {
                    warn!(seq, remote = %remote, "request timed out: {e}");
                }
                Err(e) => {
                    warn!(seq, remote = %remote, error = %e, "echo exchange failed");
                }
            }

            sent += 1;
            self.sequence.advance();

            if wait_or_cancel(&self.cancel, self.config.interval).await {
                break;
            }
        }

        Ok(sent)
    }
}

/// Wait for the interval duration, returning true if cancelled.
async fn wait_or_cancel(cancel: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(interval) => false,
    }
}
