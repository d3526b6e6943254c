use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use thiserror::Error;

use crate::checksum::verify_checksum;
use crate::echo::EchoPacket;

/// Minimum IPv4 header size.
pub const IPV4_HEADER_SIZE: usize = 20;

/// Identifier and sequence number a reply must carry to match a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedReply {
    pub identifier: u16,
    pub sequence_number: u16,
}

impl From<&EchoPacket> for ExpectedReply {
    fn from(request: &EchoPacket) -> Self {
        Self {
            identifier: request.identifier,
            sequence_number: request.sequence_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("reply truncated: {0} bytes")]
    Truncated(usize),
    #[error("malformed IP datagram: {0}")]
    Malformed(String),
    #[error("not an ICMPv4 datagram")]
    NotIcmp,
    #[error("not an echo reply (type {icmp_type}, code {code})")]
    NotEchoReply { icmp_type: u8, code: u8 },
    #[error("identifier mismatch: expected {expected}, got {got}")]
    IdentifierMismatch { expected: u16, got: u16 },
    #[error("sequence mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: u16, got: u16 },
    #[error("bad checksum")]
    BadChecksum,
}

/// Return the ICMP message carried in a raw-socket datagram.
///
/// Raw IPv4 sockets on Linux deliver the IP header in front of every
/// message. Anything that does not start with a plausible IPv4 header is
/// returned unchanged.
pub fn strip_ipv4_header(data: &[u8]) -> &[u8] {
    if data.len() < IPV4_HEADER_SIZE || data[0] >> 4 != 4 {
        return data;
    }
    let ihl = (data[0] & 0x0F) as usize * 4;
    if ihl < IPV4_HEADER_SIZE || data.len() < ihl {
        return data;
    }
    &data[ihl..]
}

/// Validate that an IPv4 datagram is the echo reply to `expected`.
///
/// Checks, in order: IPv4/ICMP framing, echo reply type, identifier,
/// sequence number and the ICMP checksum.
pub fn inspect_reply(datagram: &[u8], expected: ExpectedReply) -> Result<EchoPacket, ReplyError> {
    let packet =
        SlicedPacket::from_ip(datagram).map_err(|e| ReplyError::Malformed(e.to_string()))?;

    match packet.net {
        Some(NetSlice::Ipv4(_)) => {}
        _ => return Err(ReplyError::NotIcmp),
    }

    let message = match packet.transport {
        Some(TransportSlice::Icmpv4(icmp)) => icmp.slice(),
        _ => return Err(ReplyError::NotIcmp),
    };

    inspect_message(message, expected)
}

/// Same checks as [`inspect_reply`] on a bare ICMP message.
pub fn inspect_message(message: &[u8], expected: ExpectedReply) -> Result<EchoPacket, ReplyError> {
    let reply = EchoPacket::from_bytes(message)?;

    if !reply.is_echo_reply() {
        return Err(ReplyError::NotEchoReply {
            icmp_type: reply.icmp_type,
            code: reply.code,
        });
    }
    if reply.identifier != expected.identifier {
        return Err(ReplyError::IdentifierMismatch {
            expected: expected.identifier,
            got: reply.identifier,
        });
    }
    if reply.sequence_number != expected.sequence_number {
        return Err(ReplyError::SequenceMismatch {
            expected: expected.sequence_number,
            got: reply.sequence_number,
        });
    }
    if !verify_checksum(message) {
        return Err(ReplyError::BadChecksum);
    }

    Ok(reply)
}
