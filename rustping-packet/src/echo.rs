use crate::checksum::checksum;
use crate::reply::ReplyError;

/// ICMP header size. Echo requests are sent without a payload.
pub const ICMP_HEADER_SIZE: usize = 8;

/// ICMP message type: Echo Reply.
pub const ICMP_ECHO_REPLY: u8 = 0;
/// ICMP message type: Echo Request.
pub const ICMP_ECHO_REQUEST: u8 = 8;

/// One ICMP echo message header.
///
/// Wire layout (big-endian):
///
/// ```text
///  0       1       2               4               6               8
/// +-------+-------+---------------+---------------+---------------+
/// | type  | code  |   checksum    |  identifier   |   sequence    |
/// +-------+-------+---------------+---------------+---------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoPacket {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence_number: u16,
}

impl EchoPacket {
    /// Build an echo request for `sequence_number`.
    ///
    /// The identifier is always 0. The checksum is computed over the
    /// serialized header with a zero checksum field and then stored.
    pub fn echo_request(sequence_number: u16) -> Self {
        let mut packet = Self {
            icmp_type: ICMP_ECHO_REQUEST,
            code: 0,
            checksum: 0,
            identifier: 0,
            sequence_number,
        };
        packet.checksum = checksum(&packet.to_bytes());
        packet
    }

    /// Serialize into the 8-byte wire header.
    pub fn to_bytes(&self) -> [u8; ICMP_HEADER_SIZE] {
        let mut buf = [0u8; ICMP_HEADER_SIZE];
        buf[0] = self.icmp_type;
        buf[1] = self.code;
        buf[2..4].copy_from_slice(&self.checksum.to_be_bytes());
        buf[4..6].copy_from_slice(&self.identifier.to_be_bytes());
        buf[6..8].copy_from_slice(&self.sequence_number.to_be_bytes());
        buf
    }

    /// Decode the header at the start of an ICMP message (no IP header).
    pub fn from_bytes(data: &[u8]) -> Result<Self, ReplyError> {
        if data.len() < ICMP_HEADER_SIZE {
            return Err(ReplyError::Truncated(data.len()));
        }
        Ok(Self {
            icmp_type: data[0],
            code: data[1],
            checksum: u16::from_be_bytes([data[2], data[3]]),
            identifier: u16::from_be_bytes([data[4], data[5]]),
            sequence_number: u16::from_be_bytes([data[6], data[7]]),
        })
    }

    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == ICMP_ECHO_REPLY && self.code == 0
    }
}
