use clap::{Parser, Subcommand};
use hound::{SampleFormat, WavSpec};
use log::{debug, info};
use qamwave_core::{
    Decoder, Encoder, LengthPrefixMode, ModemConfig, CARRIER_FREQUENCY, SAMPLE_RATE,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser)]
#[command(name = "qamwave")]
#[command(about = "Acoustic data modem using 2-bit quadrature symbols")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode binary data to WAV audio file
    Encode {
        /// Input binary file
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,

        /// Carrier frequency in Hz
        #[arg(long, default_value_t = CARRIER_FREQUENCY)]
        carrier: f32,
    },

    /// Decode WAV audio file to binary data
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Output binary file
        #[arg(value_name = "OUTPUT.BIN")]
        output: PathBuf,

        /// Carrier frequency in Hz (must match encoder)
        #[arg(long, default_value_t = CARRIER_FREQUENCY)]
        carrier: f32,

        /// Sample power that marks the start of a frame
        #[arg(long)]
        start_threshold: Option<f32>,

        /// Deliver the length prefix and run each frame until a sentinel byte
        #[arg(long)]
        passthrough: bool,

        /// Samples handed to the receiver per call
        #[arg(long, default_value_t = 1024)]
        buffer_size: usize,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Unsupported WAV format: {bits}-bit {format:?} (expected 16-bit int or 32-bit float)")]
    UnsupportedFormat { bits: u16, format: SampleFormat },

    #[error("Buffer size must be at least 1")]
    InvalidBufferSize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            sample_rate,
            carrier,
        } => {
            let config = ModemConfig {
                sample_rate,
                carrier_frequency: carrier,
                ..ModemConfig::default()
            };
            encode_command(&input, &output, &config)?
        }
        Commands::Decode {
            input,
            output,
            carrier,
            start_threshold,
            passthrough,
            buffer_size,
        } => {
            let mut config = ModemConfig {
                carrier_frequency: carrier,
                ..ModemConfig::default()
            };
            if let Some(threshold) = start_threshold {
                config.start_threshold = threshold;
            }
            if passthrough {
                config.length_prefix = LengthPrefixMode::Passthrough;
            }
            decode_command(&input, &output, config, buffer_size)?
        }
    }

    Ok(())
}

fn encode_command(
    input_path: &Path,
    output_path: &Path,
    config: &ModemConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path)?;
    println!("Read {} bytes from {}", data.len(), input_path.display());

    let encoder = Encoder::with_config(config)?;
    let samples = encoder.synthesize(&data)?;
    println!(
        "Encoded {} frame(s) to {} audio samples ({} samples per symbol)",
        encoder.frame_count(data.len()),
        samples.len(),
        encoder.symbol_len()
    );

    // Write WAV file (16-bit PCM)
    let spec = WavSpec {
        channels: 1,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(output_path, spec)?;
    for sample in samples {
        let i16_sample = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer.write_sample(i16_sample)?;
    }
    writer.finalize()?;

    println!("Wrote {}", output_path.display());
    Ok(())
}

fn decode_command(
    input_path: &Path,
    output_path: &Path,
    mut config: ModemConfig,
    buffer_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if buffer_size == 0 {
        return Err(CliError::InvalidBufferSize.into());
    }

    let (spec, samples) = read_wav(input_path)?;
    println!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );
    println!("Extracted {} samples", samples.len());

    config.sample_rate = spec.sample_rate;
    let mut decoder = Decoder::with_config(&config)?;
    info!(
        "receiver: {} samples per symbol, start threshold {}, {:?} length prefix",
        decoder.symbol_len(),
        decoder.start_threshold(),
        decoder.length_prefix_mode()
    );

    for buffer in samples.chunks(buffer_size) {
        decoder.process(buffer);
    }

    let stats = decoder.stats();
    debug!("{:?}", stats);
    let data = decoder.take_output();
    println!(
        "Decoded {} bytes from {} frame(s)",
        data.len(),
        stats.frames_completed
    );

    std::fs::write(output_path, &data)?;
    println!("Wrote {} to {}", data.len(), output_path.display());

    Ok(())
}

/// Read the first channel of a WAV file as f32 samples in [-1, 1]
fn read_wav(path: &Path) -> Result<(WavSpec, Vec<f32>), Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = hound::WavReader::new(file)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / 32768.0))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (format, bits) => return Err(CliError::UnsupportedFormat { bits, format }.into()),
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok((spec, samples))
}
