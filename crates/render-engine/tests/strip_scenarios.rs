//! End-to-end: burst capture, strip composition, and export.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use image::RgbaImage;

use snapstrip_capture_engine::{
    BurstResult, CaptureSessionController, FrameCapture, SessionOutcome, SessionTiming,
    TestPatternSource, VideoSource,
};
use snapstrip_common::{FixedClock, WallClock};
use snapstrip_render_engine::{AssetExportGateway, LocalDirectoryStore, StripCompositor};
use snapstrip_strip_model::{
    CapturedFrame, CompositedStrip, FilterDescriptor, PaletteColor, StripBackground, StripLayout,
};

/// Test pattern that yields nothing on the listed reads.
struct DroppingSource {
    inner: TestPatternSource,
    reads: usize,
    dropouts: Vec<usize>,
}

impl VideoSource for DroppingSource {
    fn is_active(&self) -> bool {
        true
    }

    fn current_frame(&mut self) -> Option<&RgbaImage> {
        let read = self.reads;
        self.reads += 1;
        if self.dropouts.contains(&read) {
            None
        } else {
            self.inner.current_frame()
        }
    }

    fn describe(&self) -> String {
        "dropping test pattern".to_string()
    }
}

fn clock() -> Arc<dyn WallClock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2025, 5, 17, 14, 30, 0).unwrap(),
    ))
}

async fn burst(dropouts: Vec<usize>) -> BurstResult {
    let source = DroppingSource {
        inner: TestPatternSource::new(640, 480),
        reads: 0,
        dropouts,
    };
    let (controller, _handle) = CaptureSessionController::new(
        source,
        FrameCapture::default(),
        SessionTiming::default(),
        FilterDescriptor::Sepia,
    );
    let mut controller = controller.with_clock(clock());
    match controller.run(|_| {}).await {
        SessionOutcome::Completed(result) => result,
        other => panic!("burst did not complete: {other:?}"),
    }
}

async fn compose(frames: &[CapturedFrame], background: StripBackground) -> CompositedStrip {
    let burst_season = "season-2025-05".parse().unwrap();
    StripCompositor::default()
        .with_clock(clock())
        .compose(frames, background, burst_season)
        .await
        .unwrap()
}

/// Which cells show something other than the background at their centre.
fn painted_cells(strip: &CompositedStrip, background: StripBackground) -> Vec<bool> {
    let layout = StripLayout::STANDARD;
    (0..layout.capacity())
        .map(|i| {
            let cell = layout.cell(i).unwrap();
            let x = (cell.x + cell.w / 2.0) as u32;
            let y = (cell.y + cell.h / 2.0) as u32;
            *strip.image().get_pixel(x, y) != background.rgba()
        })
        .collect()
}

fn has_footer(strip: &CompositedStrip, background: StripBackground) -> bool {
    (1725..1800).any(|y| (0..1200).any(|x| *strip.image().get_pixel(x, y) != background.rgba()))
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("snapstrip-e2e-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test(start_paused = true)]
async fn full_burst_fills_every_cell() {
    let background = StripBackground::from(PaletteColor::Mint);
    let result = burst(Vec::new()).await;
    assert_eq!(result.frames.len(), 6);
    assert_eq!(result.season_id.to_string(), "season-2025-05");

    let strip = compose(&result.frames, background).await;
    assert_eq!(strip.dimensions(), (1200, 1800));
    assert_eq!(painted_cells(&strip, background), vec![true; 6]);
    assert!(has_footer(&strip, background));
}

#[tokio::test(start_paused = true)]
async fn camera_dropouts_leave_trailing_cells_empty() {
    let background = StripBackground::WHITE;
    let result = burst(vec![1, 4]).await;
    assert_eq!(result.frames.len(), 4);
    assert_eq!(result.attempts, 6);

    let strip = compose(&result.frames, background).await;
    assert_eq!(
        painted_cells(&strip, background),
        vec![true, true, true, true, false, false]
    );
    assert_eq!(strip.metadata().photo_count, 4);
    assert!(has_footer(&strip, background));
}

#[tokio::test(start_paused = true)]
async fn corrupt_frame_does_not_stall_the_strip() {
    let background = StripBackground::from(PaletteColor::SkyBlue);
    let mut frames = burst(Vec::new()).await.frames;
    frames[3] = CapturedFrame::from_encoded(3, vec![0x89, b'P', b'N', b'G', 0, 0]);

    let strip = compose(&frames, background).await;
    assert_eq!(
        painted_cells(&strip, background),
        vec![true, true, true, false, true, true]
    );
    assert_eq!(strip.metadata().populated_cells, vec![0, 1, 2, 4, 5]);
    assert!(has_footer(&strip, background));
}

#[tokio::test]
async fn exported_strip_lands_in_download_and_store() {
    let dir = temp_dir("export");
    let frames = {
        let mut source = TestPatternSource::new(640, 480);
        let capture = FrameCapture::default();
        (0..6)
            .map(|i| capture.capture(&mut source, FilterDescriptor::None, i).unwrap())
            .collect::<Vec<_>>()
    };
    let strip = compose(&frames, StripBackground::WHITE).await;

    let store = LocalDirectoryStore::new(dir.join("store")).with_clock(clock());
    let gateway = AssetExportGateway::new(dir.join("downloads"))
        .with_store(Arc::new(store))
        .with_clock(clock());
    let receipt = gateway.deliver(&strip).await.unwrap();
    let download = std::fs::read(&receipt.download_path).unwrap();
    assert_eq!(download, gateway.export(&strip).unwrap());

    let record = receipt.wait_for_upload().await.unwrap();
    assert_eq!((record.image_width, record.image_height), (1200, 1800));
    assert_eq!(record.metadata.photo_count, 6);
    assert!(record.file_path.starts_with("season-2025-05/"));

    let _ = std::fs::remove_dir_all(&dir);
}
