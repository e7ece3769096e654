use crate::config::ModemConfig;
use std::f32::consts::PI;

// 2-bit quadrature symbols over a single carrier
//
// One symbol spans exactly one carrier period (N = sample_rate / carrier).
// The two bits of a symbol select the polarity of the cosine (msb) and
// sine (lsb) components:
//
//   value  msb  lsb
//   00     -1   -1
//   01     -1   +1
//   10     +1   -1
//   11     +1   +1
//
// The demodulator keeps one reference waveform per value, in the same order,
// so a template index is directly the decoded 2-bit value.

/// Number of distinct symbol values (2 bits per symbol)
pub const SYMBOL_VALUES: usize = 4;

/// Polarity convention: anything above zero is +1, zero and below are -1
fn polarity(value: i8) -> f32 {
    if value > 0 {
        1.0
    } else {
        -1.0
    }
}

/// Split a 2-bit value into its (msb, lsb) polarities
pub fn value_polarities(value: u8) -> (i8, i8) {
    let msb = if value & 0b10 != 0 { 1 } else { -1 };
    let lsb = if value & 0b01 != 0 { 1 } else { -1 };
    (msb, lsb)
}

/// Synthesize one symbol: `amplitude * (lsb * sin(2πi/N) + msb * cos(2πi/N))`
pub fn symbol(msb: i8, lsb: i8, symbol_len: usize, amplitude: f32) -> Vec<f32> {
    let msb = polarity(msb);
    let lsb = polarity(lsb);

    (0..symbol_len)
        .map(|i| {
            let phase = 2.0 * PI * i as f32 / symbol_len as f32;
            amplitude * (lsb * phase.sin() + msb * phase.cos())
        })
        .collect()
}

/// Unmodulated sine over one symbol period, used to mark the start of a frame
pub fn start_tone(symbol_len: usize, amplitude: f32) -> Vec<f32> {
    (0..symbol_len)
        .map(|i| (2.0 * PI * i as f32 / symbol_len as f32).sin() * amplitude)
        .collect()
}

pub fn silence(len: usize) -> Vec<f32> {
    vec![0.0; len]
}

/// QAM modulator - turns 2-bit values and bytes into carrier waveforms
pub struct QamModulator {
    symbol_len: usize,
    amplitude: f32,
    start_tone_amplitude: f32,
}

impl QamModulator {
    pub fn new(config: &ModemConfig) -> Self {
        Self {
            symbol_len: config.symbol_len(),
            amplitude: config.symbol_amplitude,
            start_tone_amplitude: config.start_tone_amplitude,
        }
    }

    pub fn symbol_len(&self) -> usize {
        self.symbol_len
    }

    /// Waveform for explicit (msb, lsb) polarities
    pub fn synthesize_symbol(&self, msb: i8, lsb: i8) -> Vec<f32> {
        symbol(msb, lsb, self.symbol_len, self.amplitude)
    }

    /// Waveform for a 2-bit value (upper bits ignored)
    pub fn modulate_value(&self, value: u8) -> Vec<f32> {
        let (msb, lsb) = value_polarities(value & 0b11);
        self.synthesize_symbol(msb, lsb)
    }

    /// Four symbols per byte, most significant bit pair first
    pub fn synthesize_byte(&self, byte: u8) -> Vec<f32> {
        let mut samples = Vec::with_capacity(4 * self.symbol_len);
        for shift in [6, 4, 2, 0] {
            samples.extend_from_slice(&self.modulate_value(byte >> shift));
        }
        samples
    }

    pub fn start_tone(&self) -> Vec<f32> {
        start_tone(self.symbol_len, self.start_tone_amplitude)
    }
}

/// Result of matching one symbol buffer against the reference templates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolDecision {
    /// Decoded 2-bit value (index of the winning template)
    pub value: u8,
    /// Distance to the winning template
    pub score: f32,
}

/// QAM demodulator - nearest-template decision over one symbol
///
/// The distance between a buffer and a template is the summed absolute
/// difference of their sample-to-sample deltas over the interior of the
/// symbol. Comparing deltas rather than levels makes the score blind to a
/// constant offset in the received samples.
pub struct QamDemodulator {
    templates: [Vec<f32>; SYMBOL_VALUES],
    head_margin: usize,
    tail_margin: usize,
}

impl QamDemodulator {
    pub fn new(config: &ModemConfig) -> Self {
        let symbol_len = config.symbol_len();
        let amplitude = config.symbol_amplitude;
        let templates = [0u8, 1, 2, 3].map(|value| {
            let (msb, lsb) = value_polarities(value);
            symbol(msb, lsb, symbol_len, amplitude)
        });

        Self {
            templates,
            head_margin: config.decision_head_margin,
            tail_margin: config.decision_tail_margin,
        }
    }

    /// Reference waveforms indexed by 2-bit value
    pub fn templates(&self) -> &[Vec<f32>; SYMBOL_VALUES] {
        &self.templates
    }

    pub fn symbol_len(&self) -> usize {
        self.templates[0].len()
    }

    /// Delta distance between `samples` and the template for `value`
    ///
    /// Sums over deltas `samples[j + 1] - samples[j]` for `j` in
    /// `head_margin..N - tail_margin` (upper end exclusive); with the
    /// defaults at N = 12 that is `j = 2..8`.
    pub fn score(&self, samples: &[f32], value: usize) -> f32 {
        let template = &self.templates[value];
        let end = template.len().min(samples.len()).saturating_sub(self.tail_margin);

        let mut sum = 0.0f32;
        for j in self.head_margin..end {
            let observed = samples[j + 1] - samples[j];
            let expected = template[j + 1] - template[j];
            sum += (observed - expected).abs();
        }
        sum
    }

    /// Pick the closest template; ties go to the lowest value
    pub fn decide(&self, samples: &[f32]) -> SymbolDecision {
        debug_assert_eq!(samples.len(), self.symbol_len());

        let mut best = SymbolDecision {
            value: 0,
            score: f32::MAX,
        };
        for value in 0..SYMBOL_VALUES {
            let score = self.score(samples, value);
            if score < best.score {
                best = SymbolDecision {
                    value: value as u8,
                    score,
                };
            }
        }
        best
    }
}
