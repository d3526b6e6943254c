use std::fmt;

/// Whether this process may open `SOCK_RAW` ICMP sockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeLevel {
    Full,
    Unprivileged,
}

impl PrivilegeLevel {
    /// Effective root or `CAP_NET_RAW` is enough for a raw ICMP socket.
    pub fn from_checks(effective_root: bool, net_raw_capability: bool) -> Self {
        if effective_root || net_raw_capability {
            PrivilegeLevel::Full
        } else {
            PrivilegeLevel::Unprivileged
        }
    }

    pub fn has_raw_socket_access(&self) -> bool {
        matches!(self, PrivilegeLevel::Full)
    }

    /// What to tell the user when opening the echo socket fails.
    pub fn socket_hint(&self) -> Option<&'static str> {
        match self {
            PrivilegeLevel::Full => None,
            PrivilegeLevel::Unprivileged => Some("raw ICMP sockets need root or CAP_NET_RAW"),
        }
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.socket_hint() {
            None => f.write_str("raw ICMP allowed"),
            Some(hint) => write!(f, "raw ICMP denied ({hint})"),
        }
    }
}

/// Privileges of the running process. Platforms other than Linux are
/// reported as unprivileged.
pub fn check_privileges() -> PrivilegeLevel {
    #[cfg(target_os = "linux")]
    {
        crate::privilege_linux::check()
    }
    #[cfg(not(target_os = "linux"))]
    {
        PrivilegeLevel::Unprivileged
    }
}
