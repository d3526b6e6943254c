use std::io::Write;
use std::net::Ipv4Addr;

use tracing::info;

use crate::cancel::CancellationBridge;
use crate::config::EchoConfig;
use crate::echo_loop::EchoLoop;
use crate::error::{PingError, SessionError};
use crate::resolve::resolve_ipv4;
use crate::session::{IcmpSession, ShutdownHandle, Transport};

/// Ping `host` over a raw ICMP socket until `bridge` requests a stop.
///
/// Resolution and socket failures are returned before any request is sent.
/// Returns the number of requests sent.
pub async fn ping<W: Write>(
    host: &str,
    config: EchoConfig,
    bridge: &CancellationBridge,
    out: &mut W,
) -> Result<u64, PingError> {
    ping_with(host, config, bridge, out, IcmpSession::open).await
}

/// [`ping`] with a caller-supplied way of opening the transport.
pub async fn ping_with<W, T, F>(
    host: &str,
    config: EchoConfig,
    bridge: &CancellationBridge,
    out: &mut W,
    open: F,
) -> Result<u64, PingError>
where
    W: Write,
    T: Transport,
    F: FnOnce(Ipv4Addr, &EchoConfig, ShutdownHandle) -> Result<T, SessionError>,
{
    let remote = resolve_ipv4(host).await?;
    let transport = open(remote, &config, bridge.session_shutdown())?;

    info!(
        host,
        remote = %remote,
        read_timeout_ms = config.read_timeout.as_millis() as u64,
        interval_ms = config.interval.as_millis() as u64,
        "echo session ready"
    );

    EchoLoop::new(transport, config, bridge.token())
        .run(out)
        .await
}
