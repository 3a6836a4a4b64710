//! Timer-driven burst controller.
//!
//! Executes [`SessionMachine`] commands on the current task: countdown ticks
//! and pauses are `tokio::time::sleep`s, shots are taken synchronously from
//! the video source. Nothing here spawns; one controller runs one burst at a
//! time.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use snapstrip_common::clock::{BurstClock, SystemClock, WallClock};
use snapstrip_strip_model::filter::FilterDescriptor;
use snapstrip_strip_model::frame::CapturedFrame;
use snapstrip_strip_model::strip::SeasonId;

use crate::frame::FrameCapture;
use crate::session::{SessionCommand, SessionEvent, SessionMachine, SessionState, SessionTiming};
use crate::source::VideoSource;

/// Progress reported to the UI while a burst runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Countdown(u8),
    ShotCaptured {
        index: usize,
        filter: FilterDescriptor,
    },
    ShotSkipped {
        attempt: usize,
    },
    Completed {
        frames: usize,
    },
    ReadyForCompositing,
}

/// Frames and context of a finished burst.
#[derive(Debug, Clone)]
pub struct BurstResult {
    /// Ordered frames; `frames[i].index() == i`.
    pub frames: Vec<CapturedFrame>,
    /// Shot attempts, including skipped ones.
    pub attempts: usize,
    /// Season fixed at burst start.
    pub season_id: SeasonId,
    pub started_at: DateTime<Utc>,
}

/// How a call to [`CaptureSessionController::run`] ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Completed(BurstResult),
    Cancelled,
    /// The source was not running; the session never left Idle.
    CameraUnavailable,
}

/// Remote control for a running burst.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    filter: Arc<watch::Sender<FilterDescriptor>>,
    cancel: Arc<watch::Sender<u64>>,
}

impl SessionHandle {
    /// Change the filter used for subsequent shots.
    pub fn set_filter(&self, filter: FilterDescriptor) {
        self.filter.send_replace(filter);
    }

    pub fn filter(&self) -> FilterDescriptor {
        *self.filter.borrow()
    }

    /// Abandon the running burst. Has no effect on a burst started later.
    pub fn cancel(&self) {
        self.cancel.send_modify(|generation| *generation += 1);
    }
}

/// Drives bursts against a video source.
pub struct CaptureSessionController<S: VideoSource> {
    source: S,
    capture: FrameCapture,
    machine: SessionMachine,
    clock: Arc<dyn WallClock>,
    filter_rx: watch::Receiver<FilterDescriptor>,
    cancel_rx: watch::Receiver<u64>,
}

impl<S: VideoSource> CaptureSessionController<S> {
    pub fn new(
        source: S,
        capture: FrameCapture,
        timing: SessionTiming,
        filter: FilterDescriptor,
    ) -> (Self, SessionHandle) {
        let (filter_tx, filter_rx) = watch::channel(filter);
        let (cancel_tx, cancel_rx) = watch::channel(0u64);
        let controller = Self {
            source,
            capture,
            machine: SessionMachine::new(timing),
            clock: Arc::new(SystemClock),
            filter_rx,
            cancel_rx,
        };
        let handle = SessionHandle {
            filter: Arc::new(filter_tx),
            cancel: Arc::new(cancel_tx),
        };
        (controller, handle)
    }

    /// Use a specific wall clock for season and timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Run one burst to completion, cancellation, or refusal.
    pub async fn run<F>(&mut self, mut on_update: F) -> SessionOutcome
    where
        F: FnMut(SessionUpdate),
    {
        if !self.source.is_active() {
            tracing::warn!(
                source = %self.source.describe(),
                "Camera unavailable; burst not started"
            );
            return SessionOutcome::CameraUnavailable;
        }

        // Cancels issued before this burst do not apply to it.
        self.cancel_rx.borrow_and_update();

        let started_at = self.clock.now();
        let season_id = SeasonId::from_date(&started_at);
        let burst_clock = BurstClock::start();
        tracing::info!(
            source = %self.source.describe(),
            season = %season_id,
            "Starting burst"
        );

        let mut queue: VecDeque<SessionCommand> = self.machine.start().into();
        let mut frames: Option<Vec<CapturedFrame>> = None;

        while let Some(command) = queue.pop_front() {
            let event = match command {
                SessionCommand::ShowCountdown(value) => {
                    tracing::debug!(value, "Countdown");
                    on_update(SessionUpdate::Countdown(value));
                    None
                }
                SessionCommand::ScheduleTick { epoch, after } => {
                    Some(self.after(after, SessionEvent::Tick { epoch }).await)
                }
                SessionCommand::CaptureShot {
                    epoch,
                    index,
                    attempt,
                } => Some(SessionEvent::ShotResolved {
                    epoch,
                    frame: self.take_shot(index, attempt),
                }),
                SessionCommand::ShotStored { index, filter } => {
                    on_update(SessionUpdate::ShotCaptured { index, filter });
                    None
                }
                SessionCommand::ShotSkipped { attempt } => {
                    on_update(SessionUpdate::ShotSkipped { attempt });
                    None
                }
                SessionCommand::SchedulePause { epoch, after } => {
                    Some(self.after(after, SessionEvent::PauseElapsed { epoch }).await)
                }
                SessionCommand::Complete { frames: done } => {
                    on_update(SessionUpdate::Completed { frames: done.len() });
                    frames = Some(done);
                    None
                }
                // The burst is already complete; cancelling no longer applies.
                SessionCommand::ScheduleHandoff { epoch, after } => {
                    tokio::time::sleep(after).await;
                    Some(SessionEvent::HandoffElapsed { epoch })
                }
                SessionCommand::ReadyForCompositing => {
                    on_update(SessionUpdate::ReadyForCompositing);
                    None
                }
                // Timers are awaited inline, so nothing is left pending.
                SessionCommand::ClearTimers => None,
            };

            if let Some(event) = event {
                let cancel = event == SessionEvent::Cancel;
                queue.extend(self.machine.handle(event));
                if cancel && self.machine.state() == SessionState::Idle {
                    tracing::info!(
                        elapsed_ms = burst_clock.elapsed().as_millis() as u64,
                        "Burst abandoned"
                    );
                    return SessionOutcome::Cancelled;
                }
            }
        }

        match frames {
            Some(frames) => {
                tracing::info!(
                    frames = frames.len(),
                    attempts = self.machine.attempts(),
                    elapsed_ms = burst_clock.elapsed().as_millis() as u64,
                    "Burst finished"
                );
                SessionOutcome::Completed(BurstResult {
                    frames,
                    attempts: self.machine.attempts(),
                    season_id,
                    started_at,
                })
            }
            None => SessionOutcome::Cancelled,
        }
    }

    fn take_shot(&mut self, index: usize, attempt: usize) -> Option<CapturedFrame> {
        let filter = *self.filter_rx.borrow();
        match self.capture.capture(&mut self.source, filter, index) {
            Ok(frame) => Some(frame),
            Err(e) if e.is_capture_unavailable() => {
                tracing::warn!(attempt, error = %e, "Capture source not ready; shot skipped");
                None
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "Capture failed; shot skipped");
                None
            }
        }
    }

    /// Wait `delay`, then yield `event`, or `Cancel` if the handle cancels first.
    async fn after(&mut self, delay: Duration, event: SessionEvent) -> SessionEvent {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        tokio::select! {
            _ = &mut sleep => event,
            changed = self.cancel_rx.changed() => match changed {
                Ok(()) => SessionEvent::Cancel,
                Err(_) => {
                    // Handle dropped: nobody can cancel any more.
                    sleep.await;
                    event
                }
            },
        }
    }
}
