//! Snapstrip Render Engine
//!
//! Turns a burst of captured frames into a finished photo strip and
//! delivers it.
//!
//! # Pipeline
//!
//! ```text
//! CapturedFrame × N ──► decode (blocking pool, any order)
//!                              │
//!                              ▼
//!                     StripComposition ◄── CompletionBarrier
//!                       grid cells, then footer once
//!                              │
//!                              ▼
//!                       CompositedStrip
//!                              │
//!                              ▼
//!                     AssetExportGateway ──► photostrip.png
//!                              │
//!                              └──► PersistenceBoundary (background)
//! ```

pub mod caption;
pub mod compositor;
pub mod export;
pub mod store;

pub use caption::{FooterCaption, DEFAULT_CAPTION};
pub use compositor::*;
pub use export::*;
pub use store::*;
