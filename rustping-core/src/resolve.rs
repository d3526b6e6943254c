use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::SessionError;

/// Upper bound on a system resolver lookup.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve a host name or literal to a single IPv4 address.
///
/// Literal IPv4 addresses are returned as-is. Names go through the system
/// resolver on a blocking task; the first IPv4 result wins. Any failure is
/// final: the caller is expected to abort rather than retry.
pub async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, SessionError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(SessionError::resolution(host, "empty host"));
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => return Ok(v4),
        Ok(IpAddr::V6(_)) => {
            return Err(SessionError::resolution(host, "IPv6 targets are not supported"));
        }
        Err(_) => {}
    }

    let hostname = host.to_string();
    let addr = tokio::time::timeout(
        RESOLVE_TIMEOUT,
        tokio::task::spawn_blocking(move || lookup_ipv4(&hostname)),
    )
    .await
    .map_err(|_| {
        SessionError::resolution(
            host,
            format!(
                "system DNS resolution timed out after {}ms",
                RESOLVE_TIMEOUT.as_millis()
            ),
        )
    })?
    .map_err(|e| SessionError::resolution(host, e.to_string()))??;

    debug!(host, addr = %addr, "resolved target");
    Ok(addr)
}

fn lookup_ipv4(hostname: &str) -> Result<Ipv4Addr, SessionError> {
    let addrs = (hostname, 0)
        .to_socket_addrs()
        .map_err(|e| SessionError::resolution(hostname, e.to_string()))?;

    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| SessionError::resolution(hostname, "no IPv4 address returned"))
}
