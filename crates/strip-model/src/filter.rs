//! Capture-time filter descriptors.
//!
//! Each filter maps to a fixed list of effect operations. The parameters
//! follow CSS filter-function semantics so a browser preview and a captured
//! frame agree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named visual effect applied while a frame is captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDescriptor {
    #[default]
    None,
    Grayscale,
    Sepia,
    Vintage,
    Soft,
}

/// One step of a filter pipeline.
///
/// Amounts are fractions (`1.0` = 100%), hue rotation is in degrees and blur
/// radius is a Gaussian standard deviation in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "kebab-case")]
pub enum EffectOp {
    Grayscale(f32),
    Sepia(f32),
    Contrast(f32),
    Brightness(f32),
    Saturate(f32),
    HueRotate(f32),
    Blur(f32),
}

const VINTAGE_OPS: &[EffectOp] = &[
    EffectOp::Grayscale(1.0),
    EffectOp::Contrast(1.2),
    EffectOp::Brightness(1.1),
    EffectOp::Sepia(0.3),
    EffectOp::HueRotate(10.0),
    EffectOp::Blur(0.4),
];

const SOFT_OPS: &[EffectOp] = &[
    EffectOp::Brightness(1.3),
    EffectOp::Contrast(1.05),
    EffectOp::Saturate(0.8),
    EffectOp::Blur(0.3),
];

impl FilterDescriptor {
    /// All filters in display order.
    pub const ALL: [FilterDescriptor; 5] = [
        FilterDescriptor::None,
        FilterDescriptor::Grayscale,
        FilterDescriptor::Sepia,
        FilterDescriptor::Vintage,
        FilterDescriptor::Soft,
    ];

    /// The fixed effect pipeline for this filter, applied in order.
    pub fn ops(self) -> &'static [EffectOp] {
        match self {
            FilterDescriptor::None => &[],
            FilterDescriptor::Grayscale => &[EffectOp::Grayscale(1.0)],
            FilterDescriptor::Sepia => &[EffectOp::Sepia(1.0)],
            FilterDescriptor::Vintage => VINTAGE_OPS,
            FilterDescriptor::Soft => SOFT_OPS,
        }
    }

    /// Lowercase tag used in configuration and metadata.
    pub fn tag(self) -> &'static str {
        match self {
            FilterDescriptor::None => "none",
            FilterDescriptor::Grayscale => "grayscale",
            FilterDescriptor::Sepia => "sepia",
            FilterDescriptor::Vintage => "vintage",
            FilterDescriptor::Soft => "soft",
        }
    }

    /// Equivalent CSS `filter` value, for UI clients previewing the effect.
    pub fn css(self) -> String {
        if self.ops().is_empty() {
            return "none".to_string();
        }
        self.ops()
            .iter()
            .map(EffectOp::css)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl EffectOp {
    pub fn css(&self) -> String {
        match *self {
            EffectOp::Grayscale(a) => format!("grayscale({}%)", percent(a)),
            EffectOp::Sepia(a) => format!("sepia({}%)", percent(a)),
            EffectOp::Contrast(a) => format!("contrast({}%)", percent(a)),
            EffectOp::Brightness(a) => format!("brightness({}%)", percent(a)),
            EffectOp::Saturate(a) => format!("saturate({}%)", percent(a)),
            EffectOp::HueRotate(deg) => format!("hue-rotate({deg}deg)"),
            EffectOp::Blur(px) => format!("blur({px}px)"),
        }
    }
}

fn percent(amount: f32) -> i32 {
    (amount * 100.0).round() as i32
}

impl fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a filter tag is not one of the known filters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected one of: none, grayscale, sepia, vintage, soft)")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterDescriptor {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FilterDescriptor::ALL
            .into_iter()
            .find(|f| f.tag() == normalized)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}
