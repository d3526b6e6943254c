use std::time::Duration;

/// Default bound on waiting for a reply.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Default pause between two requests.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Settings for one echo run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoConfig {
    /// How long to wait for a reply after the request is written.
    pub read_timeout: Duration,
    /// Pause after each exchange before the next request.
    pub interval: Duration,
    /// Discard datagrams that are not the echo reply to the current request.
    pub strict_replies: bool,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            strict_replies: false,
        }
    }
}
