//! Strip compositor: lays captured frames onto the 2×3 grid.
//!
//! Frames are decoded independently and may finish in any order. Each
//! completion, successful or not, is fed to [`StripComposition::resolve`],
//! which draws the cell (if any) and advances a [`CompletionBarrier`]. The
//! footer caption is drawn exactly once, when the last frame resolves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tokio::task::JoinSet;

use snapstrip_common::error::{SnapstripError, SnapstripResult};
use snapstrip_common::{SystemClock, WallClock};
use snapstrip_processing_core::decode_rgba;
use snapstrip_strip_model::{
    CapturedFrame, CompositedStrip, SeasonId, StripBackground, StripLayout, StripMetadata,
};

use crate::caption::FooterCaption;

/// Counts completions and releases exactly once when all have arrived.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    expected: usize,
    completed: usize,
    released: bool,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            completed: 0,
            released: false,
        }
    }

    /// Record one completion. Returns `true` on the call that releases.
    pub fn arrive(&mut self) -> bool {
        self.completed = (self.completed + 1).min(self.expected);
        self.try_release()
    }

    /// Release if everything expected has arrived and nobody released yet.
    /// An empty barrier releases on the first call.
    pub fn try_release(&mut self) -> bool {
        if self.released || self.completed < self.expected {
            return false;
        }
        self.released = true;
        true
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn remaining(&self) -> usize {
        self.expected - self.completed
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// What happened to a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    /// Counted; more frames are outstanding.
    Pending { remaining: usize },
    /// Counted, and it was the last one. The footer has been drawn.
    Complete,
    /// Not counted: unknown index or already resolved.
    Ignored,
}

/// An in-progress strip canvas.
#[derive(Debug)]
pub struct StripComposition {
    layout: StripLayout,
    background: StripBackground,
    caption: FooterCaption,
    canvas: RgbaImage,
    barrier: CompletionBarrier,
    resolved: Vec<bool>,
    populated: Vec<usize>,
    photo_count: usize,
    footer_draws: usize,
}

impl StripComposition {
    /// Fill the canvas with `background` and expect `frame_count` frames.
    ///
    /// Frames past the grid's capacity are never expected. With nothing to
    /// wait for, the footer is drawn immediately.
    pub fn new(
        layout: StripLayout,
        background: StripBackground,
        caption: FooterCaption,
        frame_count: usize,
    ) -> Self {
        let expected = frame_count.min(layout.capacity());
        let canvas =
            RgbaImage::from_pixel(layout.canvas_width, layout.canvas_height, background.rgba());
        let mut composition = Self {
            layout,
            background,
            caption,
            canvas,
            barrier: CompletionBarrier::new(expected),
            resolved: vec![false; expected],
            populated: Vec::with_capacity(expected),
            photo_count: frame_count,
            footer_draws: 0,
        };
        if composition.barrier.try_release() {
            composition.draw_footer();
        }
        composition
    }

    /// Account for the frame at `index`, drawing it when it decoded.
    pub fn resolve(&mut self, index: usize, decoded: SnapstripResult<RgbaImage>) -> ResolveStatus {
        match self.resolved.get(index).copied() {
            None => {
                tracing::warn!(index, "Ignoring resolution for a cell outside the strip");
                return ResolveStatus::Ignored;
            }
            Some(true) => {
                tracing::warn!(index, "Ignoring duplicate resolution");
                return ResolveStatus::Ignored;
            }
            Some(false) => self.resolved[index] = true,
        }

        match decoded {
            Ok(image) => self.draw_cell(index, &image),
            Err(e) => tracing::warn!(index, error = %e, "Frame failed to decode; leaving cell empty"),
        }

        if self.barrier.arrive() {
            self.draw_footer();
            ResolveStatus::Complete
        } else {
            ResolveStatus::Pending {
                remaining: self.barrier.remaining(),
            }
        }
    }

    fn draw_cell(&mut self, index: usize, image: &RgbaImage) {
        let Some(cell) = self.layout.cell(index) else {
            return;
        };
        let Some(fit) = cell.aspect_fit(image.width(), image.height()) else {
            tracing::warn!(index, "Frame has no area; leaving cell empty");
            return;
        };

        let width = (fit.w.round() as u32).max(1);
        let height = (fit.h.round() as u32).max(1);
        let mut flat = flatten_onto(image, self.background.rgba());
        if flat.dimensions() != (width, height) {
            flat = imageops::resize(&flat, width, height, FilterType::Triangle);
        }
        imageops::replace(
            &mut self.canvas,
            &flat,
            fit.x.round() as i64,
            fit.y.round() as i64,
        );

        self.populated.push(index);
        tracing::debug!(index, width, height, "Cell drawn");
    }

    fn draw_footer(&mut self) {
        let (x, baseline) = self.layout.footer_anchor();
        self.caption.draw(&mut self.canvas, x, baseline);
        self.footer_draws += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.barrier.is_released()
    }

    pub fn footer_draws(&self) -> usize {
        self.footer_draws
    }

    /// Cells that received an image, in drawing order.
    pub fn populated_cells(&self) -> &[usize] {
        &self.populated
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Seal the canvas. Fails while frames are still outstanding.
    pub fn finish(
        mut self,
        season_id: SeasonId,
        generated_at: DateTime<Utc>,
    ) -> SnapstripResult<CompositedStrip> {
        if !self.is_complete() {
            return Err(SnapstripError::render(format!(
                "{} of {} frames still outstanding",
                self.barrier.remaining(),
                self.barrier.expected()
            )));
        }
        self.populated.sort_unstable();
        let metadata = StripMetadata {
            photo_count: self.photo_count,
            populated_cells: self.populated,
            background: self.background,
            width: self.layout.canvas_width,
            height: self.layout.canvas_height,
            season_id,
            generated_at,
        };
        Ok(CompositedStrip::new(self.canvas, metadata))
    }
}

/// Composite `image` over an opaque `background` colour (source-over).
fn flatten_onto(image: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    let mut flat = image.clone();
    for pixel in flat.pixels_mut() {
        let alpha = pixel[3] as u32;
        if alpha == 255 {
            continue;
        }
        for channel in 0..3 {
            let fg = pixel[channel] as u32 * alpha;
            let bg = background[channel] as u32 * (255 - alpha);
            pixel[channel] = ((fg + bg + 127) / 255) as u8;
        }
        pixel[3] = 255;
    }
    flat
}

/// Decodes frames off the async thread and assembles the strip.
pub struct StripCompositor {
    layout: StripLayout,
    caption: FooterCaption,
    clock: Arc<dyn WallClock>,
}

impl StripCompositor {
    pub fn new(caption: FooterCaption) -> Self {
        Self {
            layout: StripLayout::STANDARD,
            caption,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Compose `frames` in slot order onto a `background` canvas.
    ///
    /// Undecodable frames leave their cell showing the background. The
    /// result is always full size.
    pub async fn compose(
        &self,
        frames: &[CapturedFrame],
        background: StripBackground,
        season_id: SeasonId,
    ) -> SnapstripResult<CompositedStrip> {
        let capacity = self.layout.capacity();
        if frames.len() > capacity {
            tracing::warn!(
                frames = frames.len(),
                capacity,
                "More frames than cells; extra frames are dropped"
            );
        }

        let mut composition =
            StripComposition::new(self.layout, background, self.caption.clone(), frames.len());

        let mut pending = JoinSet::new();
        for (slot, frame) in frames.iter().take(capacity).enumerate() {
            let bytes = frame.bytes().to_vec();
            let decode = tokio::task::spawn_blocking(move || decode_rgba(&bytes));
            pending.spawn(async move { (slot, decode.await) });
        }

        while let Some(joined) = pending.join_next().await {
            let (slot, decoded) = joined
                .map_err(|e| SnapstripError::render(format!("Decode scheduling failed: {e}")))?;
            let decoded = decoded.unwrap_or_else(|e| {
                Err(SnapstripError::decode(format!("Decode task aborted: {e}")))
            });
            if let ResolveStatus::Pending { remaining } = composition.resolve(slot, decoded) {
                tracing::trace!(slot, remaining, "Frame resolved");
            }
        }

        let strip = composition.finish(season_id, self.clock.now())?;
        tracing::info!(
            season = %strip.metadata().season_id,
            populated = strip.metadata().populated_cells.len(),
            photos = strip.metadata().photo_count,
            "Strip composed"
        );
        Ok(strip)
    }
}

impl Default for StripCompositor {
    fn default() -> Self {
        Self::new(FooterCaption::default())
    }
}
