//! Strip background colours.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Named background colours offered by the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    White,
    Pink,
    Mint,
    Lavender,
    Peach,
    SkyBlue,
    SoftYellow,
    Lilac,
    Aqua,
    Rose,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 10] = [
        PaletteColor::White,
        PaletteColor::Pink,
        PaletteColor::Mint,
        PaletteColor::Lavender,
        PaletteColor::Peach,
        PaletteColor::SkyBlue,
        PaletteColor::SoftYellow,
        PaletteColor::Lilac,
        PaletteColor::Aqua,
        PaletteColor::Rose,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaletteColor::White => "White",
            PaletteColor::Pink => "Pink",
            PaletteColor::Mint => "Mint",
            PaletteColor::Lavender => "Lavender",
            PaletteColor::Peach => "Peach",
            PaletteColor::SkyBlue => "Sky Blue",
            PaletteColor::SoftYellow => "Soft Yellow",
            PaletteColor::Lilac => "Lilac",
            PaletteColor::Aqua => "Aqua",
            PaletteColor::Rose => "Rose",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            PaletteColor::White => [0xff, 0xff, 0xff],
            PaletteColor::Pink => [0xff, 0xd6, 0xd9],
            PaletteColor::Mint => [0xd6, 0xff, 0xe8],
            PaletteColor::Lavender => [0xf0, 0xd6, 0xff],
            PaletteColor::Peach => [0xff, 0xf0, 0xd6],
            PaletteColor::SkyBlue => [0xd6, 0xf0, 0xff],
            PaletteColor::SoftYellow => [0xff, 0xf6, 0xd6],
            PaletteColor::Lilac => [0xe6, 0xd6, 0xff],
            PaletteColor::Aqua => [0xd6, 0xff, 0xf6],
            PaletteColor::Rose => [0xff, 0xd6, 0xff],
        }
    }

    fn key(self) -> String {
        normalize_name(self.label())
    }
}

/// Background fill of a strip: a palette entry or any opaque RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StripBackground {
    rgb: [u8; 3],
}

impl StripBackground {
    pub const WHITE: StripBackground = StripBackground {
        rgb: [0xff, 0xff, 0xff],
    };

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    pub fn rgba(&self) -> image::Rgba<u8> {
        let [r, g, b] = self.rgb;
        image::Rgba([r, g, b, 0xff])
    }

    /// `#rrggbb` form.
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// The palette entry with this exact colour, if any.
    pub fn palette_name(&self) -> Option<PaletteColor> {
        PaletteColor::ALL.into_iter().find(|c| c.rgb() == self.rgb)
    }
}

impl Default for StripBackground {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<PaletteColor> for StripBackground {
    fn from(color: PaletteColor) -> Self {
        Self { rgb: color.rgb() }
    }
}

impl fmt::Display for StripBackground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Returned for a background that is neither a palette name nor a hex colour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid background '{0}' (expected a palette name or #rrggbb)")]
pub struct InvalidBackground(pub String);

impl FromStr for StripBackground {
    type Err = InvalidBackground;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| InvalidBackground(s.to_string()));
        }

        let key = normalize_name(trimmed);
        PaletteColor::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .map(StripBackground::from)
            .ok_or_else(|| InvalidBackground(s.to_string()))
    }
}

fn parse_hex(hex: &str) -> Option<StripBackground> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(StripBackground::from_rgb(r, g, b))
        }
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(StripBackground { rgb })
        }
        _ => None,
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Serialize for StripBackground {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for StripBackground {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
