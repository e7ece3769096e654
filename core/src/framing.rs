use crate::error::{ModemError, Result};
use crate::SYMBOLS_PER_BYTE;

// Frame layout on the wire (N = samples per symbol):
//
//   start tone      1 symbol   unmodulated sine, full amplitude
//   length prefix   4 symbols  payload length - 1
//   payload         4 symbols per byte, at most 256 bytes
//   silence         silence_symbols * N zero samples

/// One frame's payload, validated against the per-frame limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    payload: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn new(payload: &'a [u8], max_payload: usize) -> Result<Self> {
        if payload.is_empty() {
            return Err(ModemError::EmptyPayload);
        }
        if payload.len() > max_payload {
            return Err(ModemError::PayloadTooLarge {
                len: payload.len(),
                max: max_payload,
            });
        }
        Ok(Self { payload })
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Length-prefix byte: `(len - 1) mod 256`
    pub fn length_prefix(&self) -> u8 {
        ((self.payload.len() - 1) % 256) as u8
    }
}

/// Payload length announced by a length-prefix byte
pub fn payload_len_from_prefix(prefix: u8) -> usize {
    prefix as usize + 1
}

/// Split data into consecutive frames of at most `max_payload` bytes
pub fn split_into_frames(data: &[u8], max_payload: usize) -> Result<Vec<Frame<'_>>> {
    if data.is_empty() {
        return Err(ModemError::EmptyPayload);
    }
    if max_payload == 0 {
        return Err(ModemError::InvalidConfig(
            "max_payload must be positive".to_string(),
        ));
    }

    data.chunks(max_payload)
        .map(|chunk| Frame::new(chunk, max_payload))
        .collect()
}

/// Number of frames needed for `data_len` bytes
pub fn frame_count(data_len: usize, max_payload: usize) -> usize {
    if max_payload == 0 {
        return 0;
    }
    (data_len + max_payload - 1) / max_payload
}

/// Samples in one frame carrying `payload_len` bytes
pub fn frame_samples(payload_len: usize, symbol_len: usize, silence_len: usize) -> usize {
    symbol_len * (1 + SYMBOLS_PER_BYTE + SYMBOLS_PER_BYTE * payload_len) + silence_len
}
