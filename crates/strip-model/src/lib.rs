//! Snapstrip Strip Model
//!
//! Defines the core data contracts shared by capture and compositing:
//! - **Filters:** the closed set of capture-time visual effects
//! - **Frames:** encoded square stills produced by a burst
//! - **Layout:** the fixed 2×3 grid geometry of a printed strip
//! - **Strip:** the composited bitmap plus the metadata handed to storage
//!
//! Layout geometry is expressed in canvas pixels and never depends on how
//! many frames a strip actually holds.

pub mod background;
pub mod filter;
pub mod frame;
pub mod layout;
pub mod strip;

pub use background::*;
pub use filter::*;
pub use frame::*;
pub use layout::*;
pub use strip::*;
