use crate::bits::BitQueue;
use crate::config::{LengthPrefixMode, ModemConfig};
use crate::error::Result;
use crate::framing::payload_len_from_prefix;
use crate::params::{self, Parameter};
use crate::qam::QamDemodulator;
use crate::sink::ByteSink;
use crate::{SENTINEL_BYTE, SYMBOLS_PER_BYTE};
use log::{debug, trace};

/// Coarse receiver state, as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Waiting for a start tone
    Idle,
    /// Collecting samples of a symbol
    Accumulating,
    /// Discarding the rest of a frame cut short by a sentinel
    Draining,
}

/// Position inside the frame currently being received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePhase {
    /// Remainder of the start tone, discarded once complete
    Reference,
    /// Assembling the length-prefix byte
    LengthPrefix,
    /// Payload bytes; `None` when only the sentinel can end the frame
    Payload { remaining: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Accumulating(FramePhase),
    /// Samples left before the announced end of the current frame
    Draining(usize),
}

/// Counters kept across frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Start tones detected
    pub frames_acquired: u64,
    /// Frames ended by sentinel or by reaching the announced length
    pub frames_completed: u64,
    /// Sentinel bytes observed
    pub sentinels: u64,
    /// Bytes handed to the sink
    pub bytes_delivered: u64,
}

/// Receiver: sample-driven QAM frame decoder
///
/// Feed raw audio with [`Decoder::process`], one buffer at a time and in
/// chronological order. Sample power (`sample²`) is compared against the
/// start threshold to lock onto a frame's start tone; after that, every
/// `N` samples form one symbol which is matched against the four reference
/// templates. Decoded bytes go to the sink as soon as their eighth bit is
/// known. A decoded `0xFF` ends the frame and re-arms the receiver. When
/// the frame announced more bytes than it delivered before the sentinel,
/// the receiver first drains the remaining payload samples so they cannot
/// be mistaken for a new start tone.
///
/// The symbol buffer keeps the signed samples. Power alone cannot tell a
/// symbol from its negation (00 vs 11, 01 vs 10), so the decision rule needs
/// the sign.
pub struct Decoder<S = Vec<u8>> {
    qam: QamDemodulator,
    sink: S,
    state: State,
    energy: Vec<f32>,
    sample_idx: usize,
    bits: BitQueue,
    noise_floor: f32,
    ramp_skip: usize,
    length_prefix: LengthPrefixMode,
    start_threshold: Parameter,
    one_threshold: Parameter,
    stats: DecoderStats,
}

impl Decoder<Vec<u8>> {
    pub fn new() -> Result<Self> {
        Self::with_config(&ModemConfig::default())
    }

    pub fn with_config(config: &ModemConfig) -> Result<Self> {
        Decoder::with_sink(config, Vec::new())
    }

    /// Process a complete recording and return everything decoded from it
    pub fn decode(&mut self, samples: &[f32]) -> Vec<u8> {
        self.process(samples);
        self.take_output()
    }

    /// Drain the bytes collected so far
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.sink)
    }
}

impl<S: ByteSink> Decoder<S> {
    pub fn with_sink(config: &ModemConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let qam = QamDemodulator::new(config);
        let symbol_len = qam.symbol_len();

        Ok(Self {
            qam,
            sink,
            state: State::Idle,
            energy: vec![0.0; symbol_len],
            sample_idx: 0,
            bits: BitQueue::new(),
            noise_floor: 0.0,
            ramp_skip: config.ramp_skip,
            length_prefix: config.length_prefix,
            start_threshold: params::start_threshold(config.start_threshold),
            one_threshold: params::one_threshold(config.one_threshold),
            stats: DecoderStats::default(),
        })
    }

    /// Process one buffer of raw audio samples
    pub fn process(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.process_sample(sample);
        }
    }

    /// Advance the state machine by one raw sample
    pub fn process_sample(&mut self, sample: f32) {
        let power = sample * sample;

        match self.state {
            State::Idle => {
                if power > self.start_threshold.value() {
                    self.acquire();
                } else {
                    self.capture_noise(sample);
                }
            }
            State::Accumulating(phase) => {
                self.energy[self.sample_idx] = sample;
                self.sample_idx += 1;
                if self.sample_idx == self.energy.len() {
                    self.sample_idx = 0;
                    self.end_of_symbol(phase);
                }
            }
            State::Draining(left) => {
                self.state = if left > 1 {
                    State::Draining(left - 1)
                } else {
                    State::Idle
                };
            }
        }
    }

    pub fn state(&self) -> DecoderState {
        match self.state {
            State::Idle => DecoderState::Idle,
            State::Accumulating(_) => DecoderState::Accumulating,
            State::Draining(_) => DecoderState::Draining,
        }
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Mean power of the last full symbol window captured while idle
    pub fn noise_floor(&self) -> f32 {
        self.noise_floor
    }

    pub fn symbol_len(&self) -> usize {
        self.energy.len()
    }

    pub fn length_prefix_mode(&self) -> LengthPrefixMode {
        self.length_prefix
    }

    pub fn start_threshold(&self) -> f32 {
        self.start_threshold.value()
    }

    /// Returns the stored (clamped) value
    pub fn set_start_threshold(&mut self, value: f32) -> f32 {
        self.start_threshold.set(value)
    }

    pub fn one_threshold(&self) -> f32 {
        self.one_threshold.value()
    }

    pub fn set_one_threshold(&mut self, value: f32) -> f32 {
        self.one_threshold.set(value)
    }

    pub fn parameters(&self) -> [&Parameter; 2] {
        [&self.start_threshold, &self.one_threshold]
    }

    /// Set a tunable by name; `None` if no parameter has that name
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Option<f32> {
        [&mut self.start_threshold, &mut self.one_threshold]
            .into_iter()
            .find(|param| param.name() == name)
            .map(|param| param.set(value))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Drop any partial frame and wait for the next start tone
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.sample_idx = 0;
        self.energy.fill(0.0);
        self.bits.clear();
    }

    fn acquire(&mut self) {
        self.stats.frames_acquired += 1;
        debug!(
            "start tone detected (noise floor {:.5}, threshold {:.3})",
            self.noise_floor,
            self.start_threshold.value()
        );

        self.energy.fill(0.0);
        // The triggering sample sits inside the ramp of the start tone
        self.sample_idx = self.ramp_skip;
        self.bits.clear();
        self.state = State::Accumulating(FramePhase::Reference);
    }

    fn capture_noise(&mut self, sample: f32) {
        self.energy[self.sample_idx] = sample;
        self.sample_idx += 1;
        if self.sample_idx == self.energy.len() {
            self.sample_idx = 0;
            let total: f32 = self.energy.iter().map(|s| s * s).sum();
            self.noise_floor = total / self.energy.len() as f32;
        }
    }

    fn end_of_symbol(&mut self, phase: FramePhase) {
        if phase == FramePhase::Reference {
            self.energy.fill(0.0);
            self.state = State::Accumulating(match self.length_prefix {
                LengthPrefixMode::Consume => FramePhase::LengthPrefix,
                LengthPrefixMode::Passthrough => FramePhase::Payload { remaining: None },
            });
            return;
        }

        let decision = self.qam.decide(&self.energy);
        trace!(
            "symbol {:02b} (score {:.4})",
            decision.value,
            decision.score
        );
        self.energy.fill(0.0);

        self.bits.push_bits(decision.value, 2);
        if let Some(byte) = self.bits.pop_byte() {
            self.handle_byte(phase, byte);
        }
    }

    fn handle_byte(&mut self, phase: FramePhase, byte: u8) {
        match phase {
            FramePhase::LengthPrefix => {
                let len = payload_len_from_prefix(byte);
                debug!("frame announces {} payload byte(s)", len);
                self.state = State::Accumulating(FramePhase::Payload {
                    remaining: Some(len),
                });
            }
            FramePhase::Payload { remaining } => {
                if byte == SENTINEL_BYTE {
                    self.stats.sentinels += 1;
                    self.finish_frame("sentinel");
                    // bytes announced after the sentinel are still on the air
                    let skipped = remaining.map_or(0, |left| left - 1);
                    if skipped > 0 {
                        let samples = skipped * SYMBOLS_PER_BYTE * self.energy.len();
                        debug!("draining {} byte(s) ({} samples)", skipped, samples);
                        self.state = State::Draining(samples);
                    }
                    return;
                }

                self.sink.add_data(byte);
                self.stats.bytes_delivered += 1;

                match remaining {
                    Some(1) => self.finish_frame("announced length reached"),
                    Some(left) => {
                        self.state = State::Accumulating(FramePhase::Payload {
                            remaining: Some(left - 1),
                        })
                    }
                    None => {}
                }
            }
            // bytes only complete after the reference symbol
            FramePhase::Reference => {}
        }
    }

    fn finish_frame(&mut self, reason: &str) {
        self.stats.frames_completed += 1;
        debug!(
            "end of frame: {} ({} bytes delivered so far)",
            reason, self.stats.bytes_delivered
        );
        self.reset();
    }
}
