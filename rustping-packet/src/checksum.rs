/// Internet checksum over an arbitrary buffer.
///
/// Sums big-endian 16-bit words; a trailing odd byte is the high byte of a
/// final word. The carry out of bit 16 is folded back exactly once
/// (`sum += sum >> 16`) before the one's complement is taken.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);

    for word in words.by_ref() {
        sum = sum.wrapping_add(u16::from_be_bytes([word[0], word[1]]) as u32);
    }

    if let [last] = words.remainder() {
        sum = sum.wrapping_add((*last as u32) << 8);
    }

    sum = sum.wrapping_add(sum >> 16);
    !(sum as u16)
}

/// Check the checksum embedded at bytes 2..4 of an ICMP message.
///
/// The field is recomputed with itself zeroed, the same way a request is
/// built, and compared against the stored value.
pub fn verify_checksum(message: &[u8]) -> bool {
    if message.len() < 4 {
        return false;
    }
    let stored = u16::from_be_bytes([message[2], message[3]]);

    let mut scratch = message.to_vec();
    scratch[2] = 0;
    scratch[3] = 0;
    checksum(&scratch) == stored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_all_ones() {
        assert_eq!(checksum(&[]), 0xFFFF);
    }

    #[test]
    fn zeros_give_all_ones() {
        assert_eq!(checksum(&[0u8; 20]), 0xFFFF);
    }

    #[test]
    fn echo_request_header_seq_zero() {
        // 0x0800 is the only non-zero word
        let header = [8, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(checksum(&header), 0xF7FF);
    }

    #[test]
    fn deterministic_for_same_input() {
        let data = [0x45, 0x00, 0x00, 0x3c, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06];
        let first = checksum(&data);
        for _ in 0..8 {
            assert_eq!(checksum(&data), first);
        }
    }

    #[test]
    fn odd_byte_is_high_byte_of_last_word() {
        // [0x12] must count as 0x1200, not 0x0012
        assert_eq!(checksum(&[0x12]), !0x1200);
        assert_eq!(checksum(&[0xAB, 0xCD, 0x12]), !(0xABCDu16 + 0x1200));
    }

    #[test]
    fn trailing_zero_byte_keeps_checksum() {
        let even = [0x08, 0x00, 0x12, 0x34];
        let mut even_padded = even.to_vec();
        even_padded.push(0);
        assert_eq!(checksum(&even), checksum(&even_padded));

        let odd = [0x08, 0x00, 0x12];
        let mut odd_padded = odd.to_vec();
        odd_padded.push(0);
        assert_eq!(checksum(&odd), checksum(&odd_padded));
    }

    #[test]
    fn trailing_byte_order_matters_for_odd_lengths() {
        // A single trailing byte is not the same as a low-order byte
        assert_ne!(checksum(&[0x08, 0x00, 0x12]), checksum(&[0x08, 0x00, 0x00, 0x12]));
    }

    #[test]
    fn carry_is_folded_once() {
        // 0xFFFF + 0xFFFF + 0x0001 = 0x1FFFF; one fold leaves 0x0000 in the
        // low half, so the complement is 0xFFFF (a full fold would give 0xFFFE).
        assert_eq!(checksum(&[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x01]), 0xFFFF);
    }

    #[test]
    fn simple_carry_folds_back() {
        // 0xFFFF + 0x0002 = 0x10001 -> 0x0002 -> !0x0002
        assert_eq!(checksum(&[0xFF, 0xFF, 0x00, 0x02]), !0x0002);
    }

    #[test]
    fn verify_accepts_built_message() {
        let mut msg = [0u8, 0, 0, 0, 0x12, 0x34, 0x00, 0x07];
        let sum = checksum(&msg);
        msg[2..4].copy_from_slice(&sum.to_be_bytes());
        assert!(verify_checksum(&msg));
    }

    #[test]
    fn verify_rejects_corruption() {
        let mut msg = [0u8, 0, 0, 0, 0x12, 0x34, 0x00, 0x07];
        let sum = checksum(&msg);
        msg[2..4].copy_from_slice(&sum.to_be_bytes());
        msg[7] ^= 0x01;
        assert!(!verify_checksum(&msg));
    }

    #[test]
    fn verify_rejects_short_message() {
        assert!(!verify_checksum(&[0, 0, 0]));
    }
}
