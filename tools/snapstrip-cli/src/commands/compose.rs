//! Build a strip from existing image files.

use std::path::PathBuf;

use snapstrip_common::{AppConfig, SystemClock, WallClock};
use snapstrip_strip_model::{CapturedFrame, SeasonId};

/// Cells in a strip.
const MAX_FRAMES: usize = 6;

pub async fn run(
    config: &AppConfig,
    paths: Vec<PathBuf>,
    background: Option<String>,
    output: Option<PathBuf>,
    upload: bool,
) -> anyhow::Result<()> {
    let background = super::parse_background(config, background)?;

    if paths.len() > MAX_FRAMES {
        println!(
            "[WARN] {} images given; only the first {MAX_FRAMES} are used",
            paths.len()
        );
    }

    let mut frames = Vec::with_capacity(paths.len().min(MAX_FRAMES));
    for (index, path) in paths.iter().take(MAX_FRAMES).enumerate() {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        tracing::debug!(index, path = %path.display(), bytes = bytes.len(), "Frame loaded");
        frames.push(CapturedFrame::from_encoded(index, bytes));
    }

    let season_id = SeasonId::from_date(&SystemClock.now());
    println!("Composing {} image(s) for {season_id}", frames.len());

    super::finish_strip(config, &frames, background, season_id, output, upload).await
}
