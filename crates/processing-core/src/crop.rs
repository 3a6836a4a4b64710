//! Centred square crop and mirrored resampling.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use snapstrip_common::error::{SnapstripError, SnapstripResult};

/// Largest centred square inside a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareCrop {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Compute the largest centred square crop of a `width`×`height` frame.
///
/// Returns `None` when the frame has no area.
pub fn center_square(width: u32, height: u32) -> Option<SquareCrop> {
    let size = width.min(height);
    if size == 0 {
        return None;
    }
    Some(SquareCrop {
        x: (width - size) / 2,
        y: (height - size) / 2,
        size,
    })
}

/// Crop the centred square of `source`, mirror it horizontally, and resample
/// it onto a fresh `output_size`×`output_size` surface.
///
/// `source` is only read; the returned surface is independent of it.
pub fn render_mirrored_square(source: &RgbaImage, output_size: u32) -> SnapstripResult<RgbaImage> {
    let (width, height) = source.dimensions();
    let crop = center_square(width, height).ok_or_else(|| {
        SnapstripError::capture_unavailable(format!("source frame is {width}x{height}"))
    })?;
    if output_size == 0 {
        return Err(SnapstripError::processing("output size must be non-zero"));
    }

    let square = imageops::crop_imm(source, crop.x, crop.y, crop.size, crop.size).to_image();
    let scaled = if crop.size == output_size {
        square
    } else {
        imageops::resize(&square, output_size, output_size, FilterType::Triangle)
    };
    Ok(imageops::flip_horizontal(&scaled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_landscape_crop_is_centred() {
        assert_eq!(
            center_square(1280, 720),
            Some(SquareCrop {
                x: 280,
                y: 0,
                size: 720
            })
        );
    }

    #[test]
    fn test_portrait_crop_is_centred() {
        assert_eq!(
            center_square(480, 640),
            Some(SquareCrop {
                x: 0,
                y: 80,
                size: 480
            })
        );
    }

    #[test]
    fn test_zero_area_has_no_crop() {
        assert_eq!(center_square(0, 720), None);
        assert_eq!(center_square(640, 0), None);
    }

    #[test]
    fn test_render_mirrors_horizontally() {
        // Left half red, right half blue.
        let source = RgbaImage::from_fn(40, 40, |x, _| if x < 20 { RED } else { BLUE });
        let out = render_mirrored_square(&source, 40).unwrap();
        assert_eq!(*out.get_pixel(0, 20), BLUE);
        assert_eq!(*out.get_pixel(39, 20), RED);
        // Source untouched.
        assert_eq!(*source.get_pixel(0, 20), RED);
    }

    #[test]
    fn test_render_discards_letterbox_sides() {
        // 60x20 frame: outer 20px columns are blue, centre is red.
        let source = RgbaImage::from_fn(60, 20, |x, _| if (20..40).contains(&x) { RED } else { BLUE });
        let out = render_mirrored_square(&source, 20).unwrap();
        assert!(out.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_render_rejects_empty_source() {
        let source = RgbaImage::new(0, 0);
        let err = render_mirrored_square(&source, 600).unwrap_err();
        assert!(err.is_capture_unavailable());
    }

    proptest! {
        #[test]
        fn prop_crop_is_square_and_in_bounds(w in 1u32..5000, h in 1u32..5000) {
            let crop = center_square(w, h).unwrap();
            prop_assert_eq!(crop.size, w.min(h));
            prop_assert!(crop.x + crop.size <= w);
            prop_assert!(crop.y + crop.size <= h);
            // Centred to within one pixel.
            prop_assert!((w - crop.size - crop.x).abs_diff(crop.x) <= 1);
            prop_assert!((h - crop.size - crop.y).abs_diff(crop.y) <= 1);
        }
    }
}
