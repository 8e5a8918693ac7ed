use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Convert layered PSD files to PNG, in batches, one at a time, or as they
/// land in a watched folder. Also bundles converted PNGs into a ZIP.
///
/// Run without a subcommand for the interactive menu.
#[derive(Parser, Debug)]
#[command(
    name = "psd-converter",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: ./psd-converter.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory receiving PSD copies and converted PNGs.
    #[arg(long, global = true)]
    pub upload_dir: Option<PathBuf>,

    /// Directory receiving ZIP bundles.
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every PSD file found in a directory.
    Batch {
        /// Directory to scan.
        dir: PathBuf,

        /// Also scan subdirectories.
        #[arg(short, long)]
        recursive: bool,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Watch a directory and convert each PSD file as it arrives.
    ///
    /// Runs until the process is killed or the directory is removed.
    Watch {
        /// Directory to watch (not recursive).
        dir: PathBuf,
    },

    /// Convert a single PSD file.
    Convert {
        /// Path of the PSD file.
        file: PathBuf,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Bundle the PNG files of the upload directory into a timestamped ZIP.
    Archive {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}
