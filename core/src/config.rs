use crate::error::{ModemError, Result};
use crate::{
    CARRIER_FREQUENCY, DECISION_HEAD_MARGIN, DECISION_TAIL_MARGIN, DEFAULT_ONE_THRESHOLD,
    DEFAULT_START_THRESHOLD, MAX_FRAME_PAYLOAD, RAMP_SKIP, SAMPLE_RATE, SILENCE_SYMBOLS,
    START_TONE_AMPLITUDE, SYMBOL_AMPLITUDE,
};

/// How the receiver treats the length-prefix byte that follows the start tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPrefixMode {
    /// Read the prefix without delivering it and end the frame after `prefix + 1` payload bytes
    #[default]
    Consume,
    /// Deliver the prefix like any payload byte; only the sentinel ends a frame
    Passthrough,
}

/// Modem configuration shared by sender and receiver
///
/// Both sides must agree on `sample_rate`, `carrier_frequency` and the frame
/// layout fields, otherwise symbol boundaries will not line up.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Carrier frequency in Hz; one carrier period is one symbol
    pub carrier_frequency: f32,
    /// Peak amplitude of each quadrature component of a data symbol
    pub symbol_amplitude: f32,
    /// Amplitude of the unmodulated start tone
    pub start_tone_amplitude: f32,
    /// Length of the silence tail, in symbols
    pub silence_symbols: usize,
    /// Largest payload carried by one frame (the length prefix holds `len - 1`)
    pub max_frame_payload: usize,
    /// Samples of the start tone consumed by acquisition before buffering begins
    pub ramp_skip: usize,
    /// Samples ignored at the head of a symbol by the decision rule
    pub decision_head_margin: usize,
    /// Samples ignored at the tail of a symbol by the decision rule
    pub decision_tail_margin: usize,
    /// Power above which an idle receiver locks onto a start tone
    pub start_threshold: f32,
    /// Kept for parameter compatibility; the template decision does not read it
    pub one_threshold: f32,
    /// Receiver handling of the length prefix
    pub length_prefix: LengthPrefixMode,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            carrier_frequency: CARRIER_FREQUENCY,
            symbol_amplitude: SYMBOL_AMPLITUDE,
            start_tone_amplitude: START_TONE_AMPLITUDE,
            silence_symbols: SILENCE_SYMBOLS,
            max_frame_payload: MAX_FRAME_PAYLOAD,
            ramp_skip: RAMP_SKIP,
            decision_head_margin: DECISION_HEAD_MARGIN,
            decision_tail_margin: DECISION_TAIL_MARGIN,
            start_threshold: DEFAULT_START_THRESHOLD,
            one_threshold: DEFAULT_ONE_THRESHOLD,
            length_prefix: LengthPrefixMode::Consume,
        }
    }
}

impl ModemConfig {
    /// Default configuration at a caller-supplied sample rate
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Samples per symbol: `sample_rate / carrier_frequency`, truncated
    pub fn symbol_len(&self) -> usize {
        (self.sample_rate as f64 / self.carrier_frequency as f64) as usize
    }

    /// Samples in the trailing silence of every frame
    pub fn silence_len(&self) -> usize {
        self.silence_symbols * self.symbol_len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ModemError::InvalidConfig(
                "sample_rate must be positive".to_string(),
            ));
        }
        if !(self.carrier_frequency > 0.0) || !self.carrier_frequency.is_finite() {
            return Err(ModemError::InvalidConfig(format!(
                "carrier_frequency must be positive, got {}",
                self.carrier_frequency
            )));
        }

        let symbol_len = self.symbol_len();
        if self.decision_tail_margin == 0 {
            return Err(ModemError::InvalidConfig(
                "decision_tail_margin must be at least 1".to_string(),
            ));
        }
        if self.decision_head_margin + self.decision_tail_margin >= symbol_len {
            return Err(ModemError::InvalidConfig(format!(
                "symbol of {} samples leaves no room between decision margins {} and {}",
                symbol_len, self.decision_head_margin, self.decision_tail_margin
            )));
        }
        if self.ramp_skip >= symbol_len {
            return Err(ModemError::InvalidConfig(format!(
                "ramp_skip {} must be shorter than the {}-sample symbol",
                self.ramp_skip, symbol_len
            )));
        }
        if self.max_frame_payload == 0 || self.max_frame_payload > MAX_FRAME_PAYLOAD {
            return Err(ModemError::InvalidConfig(format!(
                "max_frame_payload must be within 1..={}",
                MAX_FRAME_PAYLOAD
            )));
        }

        Ok(())
    }
}
