//! Snapstrip Processing Core
//!
//! Pixel-level operations used while capturing a frame:
//! - **Effects:** colour-matrix and blur pipelines behind each filter
//! - **Codec:** PNG encoding and raster decoding
//! - **Crop:** centred square crop, mirroring, and resampling to a fixed size
//!
//! This crate is pure computation: no file I/O, no timers.

pub mod codec;
pub mod crop;
pub mod effects;

pub use codec::{decode_rgba, encode_png, png_dimensions};
pub use crop::{center_square, render_mirrored_square, SquareCrop};
pub use effects::{apply_filter, ColorMatrix};
