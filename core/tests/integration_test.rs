// End-to-end tests: Encoder output fed straight into the Decoder, the way an
// audio pipeline would deliver it, with silence, noise and quantization added
// around and on top of the frames.

use qamwave_core::{Decoder, DecoderState, Encoder, ModemConfig, SENTINEL_BYTE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random payload without the sentinel byte
fn random_payload(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..SENTINEL_BYTE)).collect()
}

fn lcg_noise(count: usize, seed: u32, amplitude: f32) -> Vec<f32> {
    let mut rng_state = seed;
    (0..count)
        .map(|_| {
            rng_state = rng_state.wrapping_mul(1664525).wrapping_add(1013904223);
            ((rng_state >> 16) as f32 / 65536.0 - 0.5) * 2.0 * amplitude
        })
        .collect()
}

#[test]
fn test_encode_decode_round_trip() {
    init_logging();
    let original_data = b"Hello, Audio Modem!";

    let encoder = Encoder::new().expect("Failed to create encoder");
    let samples = encoder.synthesize(original_data).expect("Failed to encode");
    assert!(!samples.is_empty(), "No samples generated");

    let mut decoder = Decoder::new().expect("Failed to create decoder");
    let decoded_data = decoder.decode(&samples);

    assert_eq!(decoded_data, original_data, "Decoded data doesn't match original");
    assert_eq!(decoder.state(), DecoderState::Idle);
}

#[test]
fn test_round_trip_with_trailing_sentinel_frame() {
    let encoder = Encoder::new().unwrap();
    let mut decoder = Decoder::new().unwrap();

    for len in [1usize, 2, 3, 17, 100, 255, 256] {
        let payload = random_payload(len, len as u64);
        let mut samples = encoder.synthesize_frame(&payload).unwrap();
        samples.extend_from_slice(&encoder.synthesize_frame(&[SENTINEL_BYTE]).unwrap());

        assert_eq!(decoder.decode(&samples), payload, "Failed for length {}", len);
        assert_eq!(decoder.state(), DecoderState::Idle);
    }
}

#[test]
fn test_all_non_sentinel_byte_values() {
    let encoder = Encoder::new().unwrap();
    let mut decoder = Decoder::new().unwrap();

    let data: Vec<u8> = (0..SENTINEL_BYTE).collect();
    let samples = encoder.synthesize(&data).unwrap();
    assert_eq!(decoder.decode(&samples), data);
}

#[test]
fn test_multi_frame_stream_600_bytes() {
    init_logging();
    let encoder = Encoder::new().unwrap();
    let mut decoder = Decoder::new().unwrap();

    let data = random_payload(600, 42);
    let samples = encoder.synthesize(&data).unwrap();
    assert_eq!(encoder.frame_count(data.len()), 3);

    assert_eq!(decoder.decode(&samples), data);
    let stats = decoder.stats();
    assert_eq!(stats.frames_acquired, 3);
    assert_eq!(stats.frames_completed, 3);
    assert_eq!(stats.bytes_delivered, 600);
}

#[test]
fn test_empty_data_rejected() {
    let encoder = Encoder::new().unwrap();
    assert!(encoder.synthesize(&[]).is_err());
}

#[test]
fn test_single_byte_boundary() {
    let encoder = Encoder::new().unwrap();
    let samples = encoder.synthesize(&[0x42]).unwrap();
    assert_eq!(samples.len(), 12 * (1 + 4 + 4) + encoder.silence_len());

    let mut decoder = Decoder::new().unwrap();
    assert_eq!(decoder.decode(&samples), vec![0x42]);
}

#[test]
fn test_encode_decode_with_leading_and_trailing_silence() {
    let original_data = b"Hello, Audio Modem!";
    let encoder = Encoder::new().unwrap();
    let samples = encoder.synthesize(original_data).unwrap();

    // one second of silence on both sides
    let mut augmented_samples = vec![0.0; 48000];
    augmented_samples.extend_from_slice(&samples);
    augmented_samples.extend_from_slice(&vec![0.0; 48000]);

    let mut decoder = Decoder::new().unwrap();
    assert_eq!(decoder.decode(&augmented_samples), original_data);
}

#[test]
fn test_encode_decode_with_noise_both_sides() {
    let original_data = b"Hello, Audio Modem!";
    let encoder = Encoder::new().unwrap();
    let samples = encoder.synthesize(original_data).unwrap();

    // 5% amplitude noise stays far below the start threshold
    let mut augmented_samples = lcg_noise(16000, 12345, 0.05);
    augmented_samples.extend_from_slice(&samples);
    augmented_samples.extend_from_slice(&lcg_noise(16000, 54321, 0.05));

    let mut decoder = Decoder::new().unwrap();
    assert_eq!(
        decoder.decode(&augmented_samples),
        original_data,
        "Decoded data with noise on both sides doesn't match"
    );
}

#[test]
fn test_encode_decode_with_light_data_noise() {
    let original_data = random_payload(300, 7);
    let encoder = Encoder::new().unwrap();
    let mut samples = encoder.synthesize(&original_data).unwrap();

    let noise = lcg_noise(samples.len(), 11111, 0.05);
    for (sample, n) in samples.iter_mut().zip(noise) {
        *sample += n;
    }

    let mut decoder = Decoder::new().unwrap();
    assert_eq!(decoder.decode(&samples), original_data);
}

#[test]
fn test_encode_decode_with_gaussian_noise() {
    let original_data = random_payload(600, 99);
    let encoder = Encoder::new().unwrap();
    let mut samples = encoder.synthesize(&original_data).unwrap();

    let mut rng = StdRng::seed_from_u64(2024);
    let normal = Normal::new(0.0f32, 0.02).unwrap();
    for sample in samples.iter_mut() {
        *sample += normal.sample(&mut rng);
    }

    let mut decoder = Decoder::new().unwrap();
    assert_eq!(decoder.decode(&samples), original_data);
}

#[test]
fn test_encode_decode_after_16bit_quantization() {
    let original_data = random_payload(600, 5);
    let encoder = Encoder::new().unwrap();
    let samples = encoder.synthesize(&original_data).unwrap();

    // what a WAV round trip does to the signal
    let quantized: Vec<f32> = samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16 as f32 / 32768.0)
        .collect();

    let mut decoder = Decoder::new().unwrap();
    assert_eq!(decoder.decode(&quantized), original_data);
}

#[test]
fn test_streamed_in_audio_buffers() {
    let original_data = random_payload(400, 13);
    let encoder = Encoder::new().unwrap();
    let samples = encoder.synthesize(&original_data).unwrap();

    let mut decoder = Decoder::new().unwrap();
    for buffer in samples.chunks(1024) {
        decoder.process(buffer);
    }
    assert_eq!(decoder.take_output(), original_data);
}

#[test]
fn test_round_trip_at_other_sample_rate() {
    // 96000 / 4000 = 24 samples per symbol; the start tone first crosses the
    // threshold on its third sample
    let config = ModemConfig {
        ramp_skip: 3,
        ..ModemConfig::with_sample_rate(96000)
    };
    let encoder = Encoder::with_config(&config).unwrap();
    let mut decoder = Decoder::with_config(&config).unwrap();
    assert_eq!(encoder.symbol_len(), 24);

    let original_data = random_payload(64, 21);
    let samples = encoder.synthesize(&original_data).unwrap();
    assert_eq!(decoder.decode(&samples), original_data);
}

#[test]
fn test_idle_noise_never_produces_output() {
    let mut decoder = Decoder::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let normal = Normal::new(0.0f32, 0.02).unwrap();

    let noise: Vec<f32> = (0..96000).map(|_| normal.sample(&mut rng)).collect();
    assert!(decoder.decode(&noise).is_empty());
    assert_eq!(decoder.state(), DecoderState::Idle);
    assert_eq!(decoder.stats().frames_acquired, 0);
    assert!(decoder.noise_floor() > 0.0 && decoder.noise_floor() < 0.01);
}
