pub mod capture;
pub mod compose;
pub mod config;
pub mod filters;
pub mod palette;

use std::path::PathBuf;
use std::sync::Arc;

use snapstrip_common::AppConfig;
use snapstrip_render_engine::{
    AssetExportGateway, FooterCaption, LocalDirectoryStore, StripCompositor,
};
use snapstrip_strip_model::{CapturedFrame, SeasonId, StripBackground};

/// Background from the command line, else from the configuration.
fn parse_background(config: &AppConfig, arg: Option<String>) -> anyhow::Result<StripBackground> {
    let raw = arg.unwrap_or_else(|| config.strip.background.clone());
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}. Run `snapstrip palette` for named colours"))
}

/// Compose `frames`, save the download, and wait for the upload.
async fn finish_strip(
    config: &AppConfig,
    frames: &[CapturedFrame],
    background: StripBackground,
    season_id: SeasonId,
    output: Option<PathBuf>,
    upload: bool,
) -> anyhow::Result<()> {
    let compositor = StripCompositor::new(FooterCaption::new(config.strip.caption.clone()));
    let strip = compositor
        .compose(frames, background, season_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to compose strip: {e}"))?;

    let mut gateway = AssetExportGateway::new(output.unwrap_or_else(|| config.output_dir.clone()))
        .with_download_name(config.strip.download_name.clone());
    if upload && config.upload.enabled {
        gateway = gateway.with_store(Arc::new(LocalDirectoryStore::new(
            config.upload.store_dir.clone(),
        )));
    }

    let receipt = gateway
        .deliver(&strip)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to save strip: {e}"))?;

    let meta = strip.metadata();
    println!();
    println!("Strip saved: {}", receipt.download_path.display());
    println!("  Size: {}x{} ({} bytes)", meta.width, meta.height, receipt.bytes);
    println!(
        "  Photos: {} ({} cells filled)",
        meta.photo_count,
        meta.populated_cells.len()
    );
    println!("  Background: {}", meta.background);
    println!("  Season: {}", meta.season_id);

    if receipt.upload.is_some() {
        match receipt.wait_for_upload().await {
            Some(record) => println!(
                "  Stored: {}",
                config.upload.store_dir.join(&record.file_path).display()
            ),
            None => println!("  Upload failed; the local copy is unaffected"),
        }
    }

    Ok(())
}
