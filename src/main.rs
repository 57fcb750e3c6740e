mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use flvmend::remux;
use flvmend::{RemuxOptions, SplitDestinations};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging.
    // Respect RUST_LOG env var if set, otherwise use defaults based on
    // the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "flvmend=debug,flvmend_media=debug".to_string()
        } else {
            "flvmend=info,flvmend_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::UpdateKeyframes {
            input,
            output,
            fix_dts,
        } => {
            remux::update_keyframes(
                &input,
                &output,
                RemuxOptions {
                    fix_timestamps: fix_dts,
                },
            )?;
            Ok(())
        }
        Commands::Split {
            input,
            out_video,
            out_audio,
            out_meta,
            fix_dts,
        } => {
            let destinations = SplitDestinations {
                video: out_video,
                audio: out_audio,
                meta: out_meta,
            };
            remux::split(
                &input,
                &destinations,
                RemuxOptions {
                    fix_timestamps: fix_dts,
                },
            )?;
            Ok(())
        }
        Commands::Inspect { input, json } => inspect_file(&input, json),
    }
}

fn inspect_file(input: &Path, json: bool) -> Result<()> {
    let report = remux::inspect(input)?;

    if json {
        let stats = &report.stats;
        let doc = serde_json::json!({
            "stats": stats,
            "derived": {
                "duration_secs": stats.duration_secs(),
                "video_data_rate_kbps": stats.video_data_rate_kbps(),
                "audio_data_rate_kbps": stats.audio_data_rate_kbps(),
                "frame_rate": stats.frame_rate(),
                "data_framed_bytes": stats.data_framed_bytes(),
            },
            "keyframes": report.keyframes,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let stats = &report.stats;
    println!("File: {}", input.display());
    println!("Size: {} bytes", stats.file_size);
    println!("Duration: {:.3}s", stats.duration_secs());

    if stats.has_video {
        println!(
            "\nVideo: codec {} {}x{}",
            stats.video_codec_id, stats.width, stats.height
        );
        println!("  {} frames, ~{} fps", stats.video_frames, stats.frame_rate());
        println!(
            "  {} bytes framed, {:.1} kbit/s",
            stats.video_framed_bytes,
            stats.video_data_rate_kbps()
        );
    } else {
        println!("\nVideo: none");
    }

    if stats.has_audio {
        println!(
            "\nAudio: codec {} {} Hz, {}-bit, {}",
            stats.audio_codec_id,
            stats.audio_sample_rate,
            stats.audio_sample_bits,
            if stats.stereo { "stereo" } else { "mono" }
        );
        println!("  {} frames", stats.audio_frames);
        println!(
            "  {} bytes framed, {:.1} kbit/s",
            stats.audio_framed_bytes,
            stats.audio_data_rate_kbps()
        );
    } else {
        println!("\nAudio: none");
    }

    println!("\nMetadata: {}", if stats.has_metadata { "present" } else { "none" });
    if stats.original_metadata_size > 0 {
        println!("  onMetaData framed size: {} bytes", stats.original_metadata_size);
    }

    println!("\nKeyframes: {}", report.keyframes.len());
    if let (Some(first), Some(last)) = (report.keyframes.first(), report.keyframes.last()) {
        println!(
            "  first at {:.3}s (offset {}), last at {:.3}s (offset {})",
            first.time_secs, first.position, last.time_secs, last.position
        );
    }

    Ok(())
}
