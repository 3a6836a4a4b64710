//! Snapstrip CLI: photobooth bursts and photo strips from the terminal.
//!
//! Usage:
//!   snapstrip capture [OPTIONS]     Run a six-shot burst and export the strip
//!   snapstrip compose <FRAMES>...   Build a strip from existing images
//!   snapstrip filters               List capture filters
//!   snapstrip palette               List strip background colours
//!   snapstrip config [--write]      Show or write the configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snapstrip_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "snapstrip",
    about = "Photobooth burst capture and photo-strip compositing",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a countdown burst and export the resulting strip
    Capture {
        /// Image file or directory of images to use as the camera feed
        /// (a generated test pattern when omitted)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Filter applied to each shot: none|grayscale|sepia|vintage|soft
        #[arg(short, long)]
        filter: Option<String>,

        /// Strip background: palette name or #rrggbb
        #[arg(short, long)]
        background: Option<String>,

        /// Directory the strip is downloaded to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip handing the strip to the store
        #[arg(long)]
        no_upload: bool,

        /// Run timers ten times faster
        #[arg(long)]
        fast: bool,
    },

    /// Compose a strip from existing image files, in order
    Compose {
        /// Up to six images (PNG or JPEG)
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// Strip background: palette name or #rrggbb
        #[arg(short, long)]
        background: Option<String>,

        /// Directory the strip is downloaded to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip handing the strip to the store
        #[arg(long)]
        no_upload: bool,
    },

    /// List capture filters
    Filters,

    /// List strip background colours
    Palette,

    /// Show the effective configuration
    Config {
        /// Write it to the configuration file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    snapstrip_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Capture {
            source,
            filter,
            background,
            output,
            no_upload,
            fast,
        } => {
            commands::capture::run(
                &config,
                commands::capture::CaptureArgs {
                    source,
                    filter,
                    background,
                    output,
                    upload: !no_upload,
                    fast,
                },
            )
            .await
        }
        Commands::Compose {
            frames,
            background,
            output,
            no_upload,
        } => commands::compose::run(&config, frames, background, output, !no_upload).await,
        Commands::Filters => commands::filters::run(),
        Commands::Palette => commands::palette::run(),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
