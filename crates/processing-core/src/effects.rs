//! Capture-time filter effects.
//!
//! Colour operations use the CSS Filter Effects matrices applied directly to
//! sRGB channel values, clamping to `[0, 1]` after every step. Blur is a
//! Gaussian with the op's radius as standard deviation.

use image::{imageops, RgbaImage};

use snapstrip_strip_model::filter::{EffectOp, FilterDescriptor};

/// Affine colour transform: `out = m · rgb + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    pub m: [[f32; 3]; 3],
    pub offset: [f32; 3],
}

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        offset: [0.0; 3],
    };

    pub fn grayscale(amount: f32) -> Self {
        let a = 1.0 - amount.clamp(0.0, 1.0);
        Self::linear([
            [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
            [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
            [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
        ])
    }

    pub fn sepia(amount: f32) -> Self {
        let a = 1.0 - amount.clamp(0.0, 1.0);
        Self::linear([
            [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
            [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
            [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
        ])
    }

    pub fn saturate(amount: f32) -> Self {
        let s = amount.max(0.0);
        Self::linear([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ])
    }

    pub fn hue_rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::linear([
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
            ],
        ])
    }

    pub fn brightness(amount: f32) -> Self {
        let b = amount.max(0.0);
        Self::linear([[b, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, b]])
    }

    pub fn contrast(amount: f32) -> Self {
        let c = amount.max(0.0);
        let intercept = 0.5 - 0.5 * c;
        Self {
            m: [[c, 0.0, 0.0], [0.0, c, 0.0], [0.0, 0.0, c]],
            offset: [intercept; 3],
        }
    }

    fn linear(m: [[f32; 3]; 3]) -> Self {
        Self {
            m,
            offset: [0.0; 3],
        }
    }

    /// Matrix for a per-pixel op; `None` for spatial ops (blur).
    pub fn for_op(op: EffectOp) -> Option<Self> {
        match op {
            EffectOp::Grayscale(a) => Some(Self::grayscale(a)),
            EffectOp::Sepia(a) => Some(Self::sepia(a)),
            EffectOp::Contrast(a) => Some(Self::contrast(a)),
            EffectOp::Brightness(a) => Some(Self::brightness(a)),
            EffectOp::Saturate(a) => Some(Self::saturate(a)),
            EffectOp::HueRotate(deg) => Some(Self::hue_rotate(deg)),
            EffectOp::Blur(_) => None,
        }
    }

    /// Apply to a normalized RGB triple, clamping the result.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (i, row) in self.m.iter().enumerate() {
            let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2] + self.offset[i];
            out[i] = v.clamp(0.0, 1.0);
        }
        out
    }
}

/// Apply a filter's effect pipeline, returning the filtered surface.
pub fn apply_filter(mut surface: RgbaImage, filter: FilterDescriptor) -> RgbaImage {
    let ops = filter.ops();
    if ops.is_empty() {
        return surface;
    }

    let mut pending: Vec<ColorMatrix> = Vec::new();
    for op in ops {
        match ColorMatrix::for_op(*op) {
            Some(matrix) => pending.push(matrix),
            None => {
                apply_matrices(&mut surface, &pending);
                pending.clear();
                if let EffectOp::Blur(radius) = op {
                    surface = blur(&surface, *radius);
                }
            }
        }
    }
    apply_matrices(&mut surface, &pending);

    tracing::trace!(filter = %filter, ops = ops.len(), "Applied filter");
    surface
}

fn apply_matrices(surface: &mut RgbaImage, matrices: &[ColorMatrix]) {
    if matrices.is_empty() {
        return;
    }
    for pixel in surface.pixels_mut() {
        let mut rgb = [
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        ];
        for matrix in matrices {
            rgb = matrix.apply(rgb);
        }
        for (channel, value) in pixel.0.iter_mut().zip(rgb) {
            *channel = (value * 255.0).round() as u8;
        }
    }
}

fn blur(surface: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 {
        return surface.clone();
    }
    let mut out = imageops::blur(surface, radius);
    // Blur softens colour only; coverage stays as captured.
    for (dst, src) in out.pixels_mut().zip(surface.pixels()) {
        dst[3] = src[3];
    }
    out
}
