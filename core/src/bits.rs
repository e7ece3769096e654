/// Number of bits a [`BitQueue`] can hold
pub const BIT_QUEUE_CAPACITY: usize = 16;

/// Fixed-capacity FIFO of decoded bits
///
/// Bits are appended at the tail and whole bytes are taken from the head,
/// first-pushed bit becoming the byte's most significant bit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitQueue {
    // live bits occupy the low `len` positions, oldest bit highest
    bits: u16,
    len: u8,
}

impl BitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == BIT_QUEUE_CAPACITY
    }

    /// Append one bit. Returns false (and drops the bit) when full.
    pub fn push(&mut self, bit: bool) -> bool {
        if self.is_full() {
            return false;
        }
        self.bits = (self.bits << 1) | bit as u16;
        self.len += 1;
        true
    }

    /// Append the low `count` bits of `value`, most significant first.
    /// Returns the number of bits stored.
    pub fn push_bits(&mut self, value: u8, count: usize) -> usize {
        let mut stored = 0;
        for shift in (0..count.min(8)).rev() {
            if !self.push((value >> shift) & 1 == 1) {
                break;
            }
            stored += 1;
        }
        stored
    }

    /// Remove the oldest eight bits as a byte, if that many are queued
    pub fn pop_byte(&mut self) -> Option<u8> {
        if self.len < 8 {
            return None;
        }
        let remaining = self.len - 8;
        let byte = (self.bits >> remaining) as u8;
        self.len = remaining;
        self.bits &= (1u16 << remaining) - 1;
        Some(byte)
    }

    pub fn clear(&mut self) {
        self.bits = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_requires_eight_bits() {
        let mut queue = BitQueue::new();
        queue.push_bits(0b101, 3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_byte(), None);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_pairs_assemble_msb_first() {
        let mut queue = BitQueue::new();
        for pair in [0b00, 0b01, 0b10, 0b11] {
            assert_eq!(queue.push_bits(pair, 2), 2);
        }
        assert_eq!(queue.pop_byte(), Some(0b0001_1011));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remaining_bits_carry_over() {
        let mut queue = BitQueue::new();
        queue.push_bits(0xA5, 8);
        queue.push_bits(0b11, 2);
        assert_eq!(queue.pop_byte(), Some(0xA5));
        assert_eq!(queue.len(), 2);

        queue.push_bits(0b00_1111, 6);
        assert_eq!(queue.pop_byte(), Some(0b1100_1111));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_capacity_is_fixed() {
        let mut queue = BitQueue::new();
        assert_eq!(queue.push_bits(0xFF, 8), 8);
        assert_eq!(queue.push_bits(0x00, 8), 8);
        assert!(queue.is_full());
        assert!(!queue.push(true));
        assert_eq!(queue.pop_byte(), Some(0xFF));
        assert_eq!(queue.pop_byte(), Some(0x00));
    }

    #[test]
    fn test_clear() {
        let mut queue = BitQueue::new();
        queue.push_bits(0x3C, 8);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop_byte(), None);
    }
}
