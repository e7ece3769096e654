use crate::config::ModemConfig;
use crate::error::Result;
use crate::framing::{frame_count, frame_samples, split_into_frames, Frame};
use crate::qam::{silence, QamModulator};
use log::debug;

/// Sender: turns bytes into QAM-modulated audio frames
///
/// Every frame is self-delimiting (start tone + length prefix + payload +
/// silence), so frames produced by [`Encoder::synthesize`] can be decoded
/// one after another from a single continuous stream.
pub struct Encoder {
    qam: QamModulator,
    silence_len: usize,
    max_frame_payload: usize,
}

impl Encoder {
    pub fn new() -> Result<Self> {
        Self::with_config(&ModemConfig::default())
    }

    pub fn with_config(config: &ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            qam: QamModulator::new(config),
            silence_len: config.silence_len(),
            max_frame_payload: config.max_frame_payload,
        })
    }

    pub fn symbol_len(&self) -> usize {
        self.qam.symbol_len()
    }

    pub fn silence_len(&self) -> usize {
        self.silence_len
    }

    pub fn max_frame_payload(&self) -> usize {
        self.max_frame_payload
    }

    /// Encode one 2-bit symbol from its polarities (0 counts as -1)
    pub fn synthesize_symbol(&self, msb: i8, lsb: i8) -> Vec<f32> {
        self.qam.synthesize_symbol(msb, lsb)
    }

    /// Encode one byte as four symbols, bits 7-6 first
    pub fn synthesize_byte(&self, byte: u8) -> Vec<f32> {
        self.qam.synthesize_byte(byte)
    }

    /// Encode a single frame
    /// Returns: start tone + length prefix + payload + silence
    pub fn synthesize_frame(&self, payload: &[u8]) -> Result<Vec<f32>> {
        let frame = Frame::new(payload, self.max_frame_payload)?;
        Ok(self.modulate_frame(&frame))
    }

    /// Encode arbitrarily long data as consecutive frames
    pub fn synthesize(&self, data: &[u8]) -> Result<Vec<f32>> {
        let frames = split_into_frames(data, self.max_frame_payload)?;
        debug!(
            "synthesizing {} bytes as {} frame(s)",
            data.len(),
            frames.len()
        );

        let total: usize = frames
            .iter()
            .map(|frame| self.frame_samples(frame.payload().len()))
            .sum();
        let mut samples = Vec::with_capacity(total);
        for frame in &frames {
            samples.extend_from_slice(&self.modulate_frame(frame));
        }
        Ok(samples)
    }

    /// Samples produced for one frame of `payload_len` bytes
    pub fn frame_samples(&self, payload_len: usize) -> usize {
        frame_samples(payload_len, self.symbol_len(), self.silence_len)
    }

    /// Frames produced by [`Encoder::synthesize`] for `data_len` bytes
    pub fn frame_count(&self, data_len: usize) -> usize {
        frame_count(data_len, self.max_frame_payload)
    }

    fn modulate_frame(&self, frame: &Frame<'_>) -> Vec<f32> {
        let payload = frame.payload();
        let mut samples = Vec::with_capacity(self.frame_samples(payload.len()));

        samples.extend_from_slice(&self.qam.start_tone());
        samples.extend_from_slice(&self.qam.synthesize_byte(frame.length_prefix()));
        for &byte in payload {
            samples.extend_from_slice(&self.qam.synthesize_byte(byte));
        }
        samples.extend_from_slice(&silence(self.silence_len));

        samples
    }
}
