use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flvmend")]
#[command(author, version, about = "FLV metadata reconciliation and stream splitting tool")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite a file with a regenerated onMetaData keyframe index
    UpdateKeyframes {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Repair non-monotonic per-track timestamps
        #[arg(long)]
        fix_dts: bool,
    },

    /// Split a file into per-track outputs (tracks sharing a path share
    /// one output; tracks without a path are dropped)
    Split {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Video output file
        #[arg(long)]
        out_video: Option<PathBuf>,

        /// Audio output file
        #[arg(long)]
        out_audio: Option<PathBuf>,

        /// Metadata output file
        #[arg(long)]
        out_meta: Option<PathBuf>,

        /// Repair non-monotonic per-track timestamps
        #[arg(long)]
        fix_dts: bool,
    },

    /// Scan a file and display its statistics and keyframe index
    Inspect {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
