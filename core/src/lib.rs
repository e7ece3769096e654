//! Acoustic data modem with 2-bit quadrature symbols on a single carrier
//!
//! The sender turns bytes into self-delimiting frames (start tone, length
//! prefix, payload, silence). The receiver is a per-sample state machine that
//! locks onto the start tone by power, then decodes each carrier period by
//! nearest-template matching.

pub mod bits;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod framing;
pub mod params;
pub mod qam;
pub mod sink;

pub use config::{LengthPrefixMode, ModemConfig};
pub use decoder::{Decoder, DecoderState, DecoderStats};
pub use encoder::Encoder;
pub use error::{ModemError, Result};
pub use sink::{ByteSink, FnSink};

// Carrier configuration
pub const SAMPLE_RATE: u32 = 48000;
pub const CARRIER_FREQUENCY: f32 = 4000.0; // Hz
pub const SYMBOL_SAMPLES: usize = 12; // SAMPLE_RATE / CARRIER_FREQUENCY

// Waveform levels
pub const SYMBOL_AMPLITUDE: f32 = 0.7;
pub const START_TONE_AMPLITUDE: f32 = 1.0;

// Frame configuration
pub const SYMBOLS_PER_BYTE: usize = 4;
pub const SILENCE_SYMBOLS: usize = 4;
pub const SILENCE_SAMPLES: usize = SILENCE_SYMBOLS * SYMBOL_SAMPLES; // 48
pub const MAX_FRAME_PAYLOAD: usize = 256;
pub const SENTINEL_BYTE: u8 = 0xFF;

// Receiver tuning
pub const RAMP_SKIP: usize = 2;
pub const DECISION_HEAD_MARGIN: usize = 2;
pub const DECISION_TAIL_MARGIN: usize = 4;
pub const DEFAULT_START_THRESHOLD: f32 = 0.1;
pub const DEFAULT_ONE_THRESHOLD: f32 = 0.5;
