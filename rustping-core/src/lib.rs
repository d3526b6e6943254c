pub mod cancel;
pub mod config;
pub mod echo_loop;
pub mod error;
pub mod pinger;
pub mod resolve;
pub mod session;

pub use cancel::{CancellationBridge, Signal, SignalAction};
pub use config::EchoConfig;
pub use echo_loop::{EchoLoop, SequenceCounter, format_reply};
pub use error::{ExchangeError, PingError, SessionError};
pub use pinger::{ping, ping_with};
pub use resolve::resolve_ipv4;
pub use session::{IcmpSession, Reply, ReplyFraming, ShutdownHandle, Transport};
pub use tokio_util::sync::CancellationToken;
