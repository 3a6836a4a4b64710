//! Run a countdown burst and export the strip.

use std::path::PathBuf;

use snapstrip_capture_engine::{
    CaptureSessionController, FrameCapture, SessionOutcome, SessionTiming, SessionUpdate,
    StillImageSource, TestPatternSource, VideoSource,
};
use snapstrip_common::AppConfig;
use snapstrip_strip_model::{FilterDescriptor, StripBackground};

/// Resolution of the generated feed used when no source is given.
const TEST_PATTERN_SIZE: (u32, u32) = (1280, 720);

pub struct CaptureArgs {
    pub source: Option<PathBuf>,
    pub filter: Option<String>,
    pub background: Option<String>,
    pub output: Option<PathBuf>,
    pub upload: bool,
    pub fast: bool,
}

pub async fn run(config: &AppConfig, args: CaptureArgs) -> anyhow::Result<()> {
    let filter: FilterDescriptor = args
        .filter
        .unwrap_or_else(|| config.capture.default_filter.clone())
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}. Run `snapstrip filters` for the list"))?;
    let background = super::parse_background(config, args.background)?;

    let mut timing = SessionTiming::from(&config.capture);
    if args.fast {
        timing.tick /= 10;
        timing.pause /= 10;
        timing.handoff /= 10;
    }

    let burst = Burst {
        capture: FrameCapture::new(config.capture.output_size),
        timing,
        filter,
        background,
        output: args.output,
        upload: args.upload,
    };

    match args.source {
        Some(path) => {
            let source = StillImageSource::open(&path)
                .map_err(|e| anyhow::anyhow!("Failed to open source: {e}"))?;
            burst.run(config, source).await
        }
        None => {
            let (width, height) = TEST_PATTERN_SIZE;
            burst.run(config, TestPatternSource::new(width, height)).await
        }
    }
}

struct Burst {
    capture: FrameCapture,
    timing: SessionTiming,
    filter: FilterDescriptor,
    background: StripBackground,
    output: Option<PathBuf>,
    upload: bool,
}

impl Burst {
    async fn run<S: VideoSource>(self, config: &AppConfig, source: S) -> anyhow::Result<()> {
        println!("Starting burst");
        println!("  Camera: {}", source.describe());
        println!("  Filter: {}", self.filter);
        println!("  Shots: {}", self.timing.shot_count);
        println!();
        println!("Press Ctrl+C to cancel...");
        println!();

        let (mut controller, handle) =
            CaptureSessionController::new(source, self.capture, self.timing, self.filter);

        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        });

        let outcome = controller.run(print_update).await;
        interrupt.abort();

        match outcome {
            SessionOutcome::Completed(burst) => {
                super::finish_strip(
                    config,
                    &burst.frames,
                    self.background,
                    burst.season_id,
                    self.output,
                    self.upload,
                )
                .await
            }
            SessionOutcome::Cancelled => {
                println!("Burst cancelled; nothing was saved.");
                Ok(())
            }
            SessionOutcome::CameraUnavailable => Err(anyhow::anyhow!(
                "Camera is not running. Check the --source path"
            )),
        }
    }
}

fn print_update(update: SessionUpdate) {
    match update {
        SessionUpdate::Countdown(0) => println!("  Smile!"),
        SessionUpdate::Countdown(n) => println!("  {n}..."),
        SessionUpdate::ShotCaptured { index, filter } => {
            println!("  [OK] Photo {} ({filter})", index + 1)
        }
        SessionUpdate::ShotSkipped { attempt } => {
            println!("  [WARN] Shot {} skipped: camera had no frame", attempt + 1)
        }
        SessionUpdate::Completed { frames } => println!("Captured {frames} photo(s)"),
        SessionUpdate::ReadyForCompositing => println!("Building strip..."),
    }
}
