// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Plays a raw PCM file or a compressed AC-3/DTS bitstream through the
//! hardware audio pipeline.

use std::{fs::File, io::Read, path::PathBuf, process::ExitCode};

use clap::Parser;
use omx_audio::{
    AudioDestination, AudioPlayer, Encoding, OmxHardware, PipelineSettings, StreamFormat,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Raw interleaved little-endian PCM, or an AC-3/DTS elementary stream
    path: PathBuf,

    /// Channels in the stream (1 to 8)
    #[arg(long, default_value_t = 2)]
    channels: u32,

    /// Bits per sample (8, 16, 24 or 32)
    #[arg(long, default_value_t = 16)]
    bit_depth: u32,

    /// Frames per second
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    /// Payload encoding: pcm, ac3 or dts
    #[arg(long, env = "OMX_PLAY_ENCODING", default_value_t = Encoding::Pcm)]
    encoding: Encoding,

    /// Swap the side and rear channel pairs
    #[arg(long)]
    side_back_flipped: bool,

    /// Output: hdmi or local (overrides the settings file)
    #[arg(long, env = "OMX_PLAY_DESTINATION")]
    destination: Option<AudioDestination>,

    /// JSON pipeline settings
    #[arg(long, env = "OMX_PLAY_SETTINGS")]
    settings: Option<PathBuf>,

    /// Bytes read from the file per write
    #[arg(long, default_value_t = 16_384)]
    chunk_bytes: usize,
}

fn play(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &args.settings {
        Some(path) => PipelineSettings::load(path)?,
        None => PipelineSettings::default(),
    };
    if let Some(destination) = args.destination {
        settings.destination = destination;
    }

    let format = StreamFormat {
        channels: args.channels,
        bit_depth: args.bit_depth,
        sample_rate: args.sample_rate,
        side_back_flipped: args.side_back_flipped,
        encoding: args.encoding,
    };
    format.validate()?;

    let mut file = File::open(&args.path)?;
    let mut player = AudioPlayer::create(OmxHardware::open()?, settings)?;
    player.start(&format)?;

    let mut chunk = vec![0u8; args.chunk_bytes.max(1)];
    let mut total = 0usize;
    loop {
        let read = file.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        player.write(&chunk[..read])?;
        total += read;
    }
    info!("Played {total} bytes from {}", args.path.display());

    player.stop()?;
    player.destroy();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    match play(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
