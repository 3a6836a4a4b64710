//! Snapstrip Capture Engine
//!
//! Runs a countdown-driven burst against a live video source and collects
//! the captured frames in order.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          CaptureSessionController            │
//! │                                              │
//! │   timers ──► SessionMachine ──► commands     │
//! │                  (pure)            │         │
//! │                                    ▼         │
//! │   VideoSource ──────────────► FrameCapture   │
//! │                                    │         │
//! │                                    ▼         │
//! │                        Vec<CapturedFrame>    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The state machine never sleeps or touches the camera; the controller
//! executes its commands and feeds timer and capture results back as events.

pub mod controller;
pub mod frame;
pub mod session;
pub mod source;

pub use controller::*;
pub use frame::FrameCapture;
pub use session::*;
pub use source::*;
