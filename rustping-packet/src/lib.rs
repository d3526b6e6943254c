//! ICMP echo packets for rustping.
//!
//! - [`checksum`]: the Internet checksum used by every ICMP message.
//! - [`echo`]: the 8-byte echo header, built and serialized per request.
//! - [`reply`]: raw-socket reply framing and optional reply validation.
//! - [`privilege`]: whether this process may open raw ICMP sockets.

pub mod checksum;
pub mod echo;
pub mod privilege;
pub mod reply;

#[cfg(target_os = "linux")]
mod privilege_linux;

pub use checksum::{checksum, verify_checksum};
pub use echo::{EchoPacket, ICMP_ECHO_REPLY, ICMP_ECHO_REQUEST, ICMP_HEADER_SIZE};
pub use privilege::{PrivilegeLevel, check_privileges};
pub use reply::{ExpectedReply, ReplyError, inspect_message, inspect_reply, strip_ipv4_header};
