//! Footer caption rendering.
//!
//! Text is drawn from an embedded 5×7 bitmap font, scaled up by an integer
//! factor, so output does not depend on fonts installed on the host.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between glyphs.
const GLYPH_SPACING: u32 = 1;

/// Default footer text.
pub const DEFAULT_CAPTION: &str = "Picapica © 2025";

/// A single line of text drawn under the photo grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FooterCaption {
    text: String,
    color: Rgba<u8>,
    /// Pixel size of one font dot.
    scale: u32,
}

/// Pixel bounds of drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl FooterCaption {
    /// Black text with 28 px tall capitals.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Rgba([0, 0, 0, 255]),
            scale: 4,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rendered `(width, height)` in pixels.
    pub fn measure(&self) -> (u32, u32) {
        let count = self.text.chars().count() as u32;
        if count == 0 {
            return (0, 0);
        }
        let columns = count * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING;
        (columns * self.scale, GLYPH_HEIGHT * self.scale)
    }

    /// Draw centred on `center_x` with the glyph bottoms on `baseline_y`.
    pub fn draw(&self, canvas: &mut RgbaImage, center_x: f64, baseline_y: f64) -> TextBounds {
        let (width, height) = self.measure();
        let left = (center_x - width as f64 / 2.0).round() as i32;
        let top = baseline_y.round() as i32 - height as i32;
        let advance = ((GLYPH_WIDTH + GLYPH_SPACING) * self.scale) as i32;
        let dot = self.scale;

        for (i, ch) in self.text.chars().enumerate() {
            let rows = glyph(ch).unwrap_or_else(|| {
                tracing::debug!(?ch, "No glyph for caption character");
                FALLBACK
            });
            let origin_x = left + i as i32 * advance;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let x = origin_x + (col * dot) as i32;
                    let y = top + (row as u32 * dot) as i32;
                    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(dot, dot), self.color);
                }
            }
        }

        TextBounds {
            x: left,
            y: top,
            width,
            height,
        }
    }
}

impl Default for FooterCaption {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTION)
    }
}

const FALLBACK: [u8; 7] = [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100];

fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        ' ' => [0, 0, 0, 0, 0, 0, 0],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
        'g' => [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'j' => [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100],
        'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'q' => [0b00000, 0b00000, 0b01101, 0b10011, 0b01111, 0b00001, 0b00001],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        's' => [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        'u' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        'v' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'w' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
        'x' => [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        'y' => [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'z' => [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00000, 0b00100],
        '?' => FALLBACK,
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '\'' => [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
        '©' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10001, 0b01110],
        '♥' => [0b00000, 0b01010, 0b11111, 0b11111, 0b01110, 0b00100, 0b00000],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn ink(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| **p != WHITE).count()
    }

    #[test]
    fn test_measure_default_caption() {
        let caption = FooterCaption::default();
        // 15 glyphs × 6 columns − 1 trailing gap, 4 px per dot
        assert_eq!(caption.measure(), (89 * 4, 28));
    }

    #[test]
    fn test_draw_is_centred_on_baseline() {
        let mut canvas = RgbaImage::from_pixel(1200, 1800, WHITE);
        let bounds = FooterCaption::default().draw(&mut canvas, 600.0, 1775.0);
        assert_eq!(bounds.y + bounds.height as i32, 1775);
        assert_eq!(bounds.x * 2 + bounds.width as i32, 1200);

        let inked_rows: Vec<u32> = (0..1800)
            .filter(|&y| (0..1200).any(|x| *canvas.get_pixel(x, y) != WHITE))
            .collect();
        assert_eq!(*inked_rows.first().unwrap(), 1747);
        assert_eq!(*inked_rows.last().unwrap(), 1774);
    }

    #[test]
    fn test_every_default_character_has_a_glyph() {
        assert!(DEFAULT_CAPTION.chars().all(|c| glyph(c).is_some()));
    }

    #[test]
    fn test_unknown_characters_use_fallback() {
        let mut a = RgbaImage::from_pixel(40, 20, WHITE);
        let mut b = RgbaImage::from_pixel(40, 20, WHITE);
        FooterCaption::new("€").with_scale(1).draw(&mut a, 20.0, 10.0);
        FooterCaption::new("?").with_scale(1).draw(&mut b, 20.0, 10.0);
        assert_eq!(a, b);
        assert!(ink(&a) > 0);
    }

    #[test]
    fn test_empty_caption_draws_nothing() {
        let mut canvas = RgbaImage::from_pixel(10, 10, WHITE);
        FooterCaption::new("").draw(&mut canvas, 5.0, 9.0);
        assert_eq!(ink(&canvas), 0);
    }
}
