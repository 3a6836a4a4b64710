//! Single-frame capture: crop, mirror, filter, encode.

use image::RgbaImage;

use snapstrip_common::error::{SnapstripError, SnapstripResult};
use snapstrip_processing_core::{apply_filter, encode_png, render_mirrored_square};
use snapstrip_strip_model::filter::FilterDescriptor;
use snapstrip_strip_model::frame::CapturedFrame;

use crate::source::VideoSource;

/// Default edge length of a captured frame.
pub const DEFAULT_OUTPUT_SIZE: u32 = 600;

/// Produces square stills from a live source.
#[derive(Debug, Clone, Copy)]
pub struct FrameCapture {
    output_size: u32,
}

impl FrameCapture {
    pub fn new(output_size: u32) -> Self {
        Self { output_size }
    }

    pub fn output_size(&self) -> u32 {
        self.output_size
    }

    /// Capture the source's current frame.
    ///
    /// Fails with `CaptureUnavailable` when the source has no frame or the
    /// frame has no dimensions yet.
    pub fn capture(
        &self,
        source: &mut dyn VideoSource,
        filter: FilterDescriptor,
        index: usize,
    ) -> SnapstripResult<CapturedFrame> {
        let label = source.describe();
        if !source.is_active() {
            return Err(SnapstripError::capture_unavailable(format!(
                "{label} is not running"
            )));
        }
        let frame = source.current_frame().ok_or_else(|| {
            SnapstripError::capture_unavailable(format!("{label} has no frame"))
        })?;
        self.capture_image(frame, filter, index)
    }

    /// Capture from an already-borrowed frame.
    ///
    /// The filter is applied to a scratch surface only; `frame` is never
    /// modified, so a preview showing it is unaffected.
    pub fn capture_image(
        &self,
        frame: &RgbaImage,
        filter: FilterDescriptor,
        index: usize,
    ) -> SnapstripResult<CapturedFrame> {
        let surface = render_mirrored_square(frame, self.output_size)?;
        let surface = apply_filter(surface, filter);
        let png = encode_png(&surface)?;

        tracing::debug!(
            index,
            %filter,
            source_width = frame.width(),
            source_height = frame.height(),
            bytes = png.len(),
            "Captured frame"
        );

        Ok(CapturedFrame::new(index, filter, self.output_size, png))
    }
}

impl Default for FrameCapture {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_SIZE)
    }
}
