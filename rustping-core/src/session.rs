use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use rustping_packet::{
    EchoPacket, ExpectedReply, ReplyError, check_privileges, inspect_message, inspect_reply,
    strip_ipv4_header,
};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::io::unix::AsyncFd;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::EchoConfig;
use crate::error::{ExchangeError, SessionError};

/// Size of the buffer a reply is read into.
pub const REPLY_BUFFER_SIZE: usize = 1024;

/// A completed request/reply exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Length of the ICMP reply message (IP header excluded).
    pub bytes: usize,
    /// Time from write completion to read completion.
    pub rtt: Duration,
}

impl Reply {
    /// Round-trip time in whole milliseconds, truncated.
    pub fn rtt_millis(&self) -> u128 {
        self.rtt.as_millis()
    }
}

/// How datagrams read from the socket are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFraming {
    /// Raw IPv4 socket: each datagram starts with the IP header.
    Ipv4,
    /// The datagram is the ICMP message itself.
    Bare,
}

/// One-shot signal that closes a session from outside its owner.
///
/// Triggering it makes a pending or later [`Transport::exchange`] fail with
/// [`ExchangeError::Closed`]; the owner then releases the socket.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(CancellationToken);

impl ShutdownHandle {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// A handle that also fires when `parent` is cancelled.
    pub fn linked_to(parent: &CancellationToken) -> Self {
        Self(parent.child_token())
    }

    pub fn shutdown(&self) {
        self.0.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Completes once the handle fires.
    pub async fn fired(&self) {
        self.0.cancelled().await
    }
}

/// A request/reply channel to one remote address.
#[async_trait]
pub trait Transport: Send {
    /// The address every request goes to.
    fn remote_addr(&self) -> Ipv4Addr;

    /// Write `packet` and wait for its reply within the read timeout.
    async fn exchange(&mut self, packet: &EchoPacket) -> Result<Reply, ExchangeError>;

    /// Release the underlying resources. Calling it again is a no-op.
    fn close(&mut self);

    /// Handle that closes this transport from another task.
    fn shutdown_handle(&self) -> ShutdownHandle;
}

/// ICMP echo session over a connected raw IPv4 socket.
pub struct IcmpSession {
    remote: Ipv4Addr,
    read_timeout: Duration,
    strict_replies: bool,
    framing: ReplyFraming,
    socket: Option<AsyncFd<Socket>>,
    shutdown: ShutdownHandle,
}

impl IcmpSession {
    /// Open a raw ICMP socket connected to `remote`.
    ///
    /// Requires root or CAP_NET_RAW. Must be called inside a tokio runtime.
    pub fn open(
        remote: Ipv4Addr,
        config: &EchoConfig,
        shutdown: ShutdownHandle,
    ) -> Result<Self, SessionError> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(connection_error)?;
        socket
            .connect(&SockAddr::from(SocketAddrV4::new(remote, 0)))
            .map_err(connection_error)?;

        Self::from_socket(socket, remote, config, ReplyFraming::Ipv4, shutdown)
    }

    /// Wrap an already connected datagram socket.
    pub fn from_socket(
        socket: Socket,
        remote: Ipv4Addr,
        config: &EchoConfig,
        framing: ReplyFraming,
        shutdown: ShutdownHandle,
    ) -> Result<Self, SessionError> {
        socket.set_nonblocking(true).map_err(connection_error)?;
        // SAFETY: the AsyncFd takes ownership of the socket, so the descriptor
        // stays open and unchanged until the AsyncFd is dropped.
        let socket = unsafe { AsyncFd::register(socket) }
            .map_err(|e| connection_error(e.into_parts().1))?;

        debug!(
            remote = %remote,
            read_timeout_ms = config.read_timeout.as_millis() as u64,
            strict = config.strict_replies,
            "ICMP session opened"
        );

        Ok(Self {
            remote,
            read_timeout: config.read_timeout,
            strict_replies: config.strict_replies,
            framing,
            socket: Some(socket),
            shutdown,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    fn check_reply(&self, datagram: &[u8], expected: ExpectedReply) -> Result<(), ReplyError> {
        match self.framing {
            ReplyFraming::Ipv4 => inspect_reply(datagram, expected).map(|_| ()),
            ReplyFraming::Bare => inspect_message(datagram, expected).map(|_| ()),
        }
    }

    fn message_len(&self, datagram: &[u8]) -> usize {
        match self.framing {
            ReplyFraming::Ipv4 => strip_ipv4_header(datagram).len(),
            ReplyFraming::Bare => datagram.len(),
        }
    }
}

#[async_trait]
impl Transport for IcmpSession {
    fn remote_addr(&self) -> Ipv4Addr {
        self.remote
    }

    async fn exchange(&mut self, packet: &EchoPacket) -> Result<Reply, ExchangeError> {
        if self.shutdown.is_shutdown() {
            self.close();
        }
        let socket = self.socket.as_ref().ok_or(ExchangeError::Closed)?;
        let shutdown = self.shutdown.clone();
        let request = packet.to_bytes();

        tokio::select! {
            biased;
            () = shutdown.fired() => return Err(ExchangeError::Closed),
            sent = send(socket, &request) => {
                sent.map_err(ExchangeError::Write)?;
            }
        }

        let start = Instant::now();
        let deadline = start + self.read_timeout;
        let expected = ExpectedReply::from(packet);
        let mut buf = [0u8; REPLY_BUFFER_SIZE];

        loop {
            let n = tokio::select! {
                biased;
                () = shutdown.fired() => return Err(ExchangeError::Closed),
                read = tokio::time::timeout_at(deadline, recv(socket, &mut buf)) => match read {
                    Ok(result) => result.map_err(ExchangeError::Read)?,
                    Err(_) => return Err(ExchangeError::Timeout(self.read_timeout)),
                },
            };
            let rtt = start.elapsed();
            let datagram = &buf[..n];

            if self.strict_replies {
                if let Err(e) = self.check_reply(datagram, expected) {
                    debug!(seq = packet.sequence_number, reason = %e, "discarding datagram");
                    continue;
                }
            }

            trace!(seq = packet.sequence_number, len = n, "reply received");
            return Ok(Reply {
                bytes: self.message_len(datagram),
                rtt,
            });
        }
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            self.shutdown.shutdown();
            drop(socket);
            debug!(remote = %self.remote, "ICMP session closed");
        }
    }

    fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }
}

fn connection_error(source: io::Error) -> SessionError {
    SessionError::Connection {
        source,
        privilege: check_privileges(),
    }
}

async fn send(socket: &AsyncFd<Socket>, data: &[u8]) -> io::Result<usize> {
    loop {
        let mut guard = socket.writable().await?;
        match guard.try_io(|inner| inner.get_ref().send(data)) {
            Ok(result) => return result,
            Err(_would_block) => continue,
        }
    }
}

async fn recv(socket: &AsyncFd<Socket>, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let mut guard = socket.readable().await?;
        match guard.try_io(|inner| {
            let mut sock: &Socket = inner.get_ref();
            sock.read(buf)
        }) {
            Ok(result) => return result,
            Err(_would_block) => continue,
        }
    }
}
