use std::io;
use std::time::Duration;

use rustping_packet::PrivilegeLevel;

/// Failures while setting up a session. Both abort the run.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to resolve '{host}': {reason}")]
    Resolution { host: String, reason: String },
    #[error("failed to open ICMP socket: {source}{}", privilege_hint(.privilege))]
    Connection {
        #[source]
        source: io::Error,
        privilege: PrivilegeLevel,
    },
}

impl SessionError {
    pub fn resolution(host: &str, reason: impl Into<String>) -> Self {
        Self::Resolution {
            host: host.to_string(),
            reason: reason.into(),
        }
    }
}

fn privilege_hint(privilege: &PrivilegeLevel) -> String {
    privilege
        .socket_hint()
        .map(|hint| format!(" ({hint})"))
        .unwrap_or_default()
}

/// Failures of a single request/reply exchange. The echo loop logs these
/// and moves on to the next sequence number.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("session closed")]
    Closed,
}

impl ExchangeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout(_))
    }
}

/// Top-level error for a ping run.
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("report output failed: {0}")]
    Output(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_hints_when_unprivileged() {
        let err = SessionError::Connection {
            source: io::Error::from(io::ErrorKind::PermissionDenied),
            privilege: PrivilegeLevel::Unprivileged,
        };
        assert!(err.to_string().contains("CAP_NET_RAW"));

        let err = SessionError::Connection {
            source: io::Error::from(io::ErrorKind::PermissionDenied),
            privilege: PrivilegeLevel::Full,
        };
        assert!(!err.to_string().contains("CAP_NET_RAW"));
    }

    #[test]
    fn resolution_error_names_host() {
        let err = SessionError::resolution("no.such.host.invalid", "not found");
        assert_eq!(
            err.to_string(),
            "failed to resolve 'no.such.host.invalid': not found"
        );
    }

    #[test]
    fn timeout_is_classified() {
        assert!(ExchangeError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!ExchangeError::Closed.is_timeout());
    }
}
