//! Burst session state machine.
//!
//! [`SessionMachine::handle`] is the only way a session changes. It takes
//! one event (user action, timer expiry, capture result) and returns the
//! commands the driver must carry out. It never sleeps and never touches a
//! camera, so it can be driven by real timers or by a test.
//!
//! ```text
//!   Idle ──start──► Counting(3) ──tick──► Counting(2) ──tick──► Counting(1)
//!                        ▲                                        │ tick
//!                        │ pause elapsed                          ▼
//!                        └───────────── Capturing ◄──────── (countdown 0)
//!                                           │ last attempt
//!                                           ▼
//!                                         Done ──handoff──► ready
//! ```
//!
//! Timer events carry the epoch of the session that scheduled them. Every
//! start and cancel bumps the epoch, so a timer that outlives its session is
//! ignored instead of acting on the next one.

use std::time::Duration;

use snapstrip_common::config::CaptureDefaults;
use snapstrip_strip_model::filter::FilterDescriptor;
use snapstrip_strip_model::frame::CapturedFrame;

/// Timing and size of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Shot attempts per burst.
    pub shot_count: usize,
    /// Countdown value seeded before each shot.
    pub countdown_ticks: u8,
    pub tick: Duration,
    /// Pause between a shot and the next countdown.
    pub pause: Duration,
    /// Delay between completion and the compositing handoff.
    pub handoff: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            shot_count: 6,
            countdown_ticks: 3,
            tick: Duration::from_secs(1),
            pause: Duration::from_millis(500),
            handoff: Duration::from_millis(200),
        }
    }
}

impl From<&CaptureDefaults> for SessionTiming {
    fn from(defaults: &CaptureDefaults) -> Self {
        Self {
            shot_count: defaults.shot_count,
            countdown_ticks: defaults.countdown_ticks.max(1),
            tick: defaults.tick(),
            pause: defaults.pause(),
            handoff: defaults.handoff(),
        }
    }
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Counting { remaining: u8 },
    Capturing,
    Done,
}

impl SessionState {
    /// Whether a burst is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Counting { .. } | SessionState::Capturing)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Tick { epoch: u64 },
    /// Result of a `CaptureShot` command; `None` when the source had no frame.
    ShotResolved {
        epoch: u64,
        frame: Option<CapturedFrame>,
    },
    PauseElapsed { epoch: u64 },
    HandoffElapsed { epoch: u64 },
    Cancel,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Start => "start",
            SessionEvent::Tick { .. } => "tick",
            SessionEvent::ShotResolved { .. } => "shot-resolved",
            SessionEvent::PauseElapsed { .. } => "pause-elapsed",
            SessionEvent::HandoffElapsed { .. } => "handoff-elapsed",
            SessionEvent::Cancel => "cancel",
        }
    }
}

/// Work the driver must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Display this countdown value.
    ShowCountdown(u8),
    ScheduleTick { epoch: u64, after: Duration },
    /// Capture now and report back with `ShotResolved`.
    CaptureShot {
        epoch: u64,
        /// Index the frame will get if the shot succeeds.
        index: usize,
        /// 0-based attempt number within the burst.
        attempt: usize,
    },
    ShotStored {
        index: usize,
        filter: FilterDescriptor,
    },
    ShotSkipped { attempt: usize },
    SchedulePause { epoch: u64, after: Duration },
    /// The burst is over; the ordered frames are handed to the caller.
    Complete { frames: Vec<CapturedFrame> },
    ScheduleHandoff { epoch: u64, after: Duration },
    ReadyForCompositing,
    /// Drop any pending timers.
    ClearTimers,
}

/// The burst state machine.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    timing: SessionTiming,
    state: SessionState,
    epoch: u64,
    attempts: usize,
    frames: Vec<CapturedFrame>,
    shot_pending: bool,
    handed_off: bool,
}

impl SessionMachine {
    pub fn new(timing: SessionTiming) -> Self {
        Self {
            timing,
            state: SessionState::Idle,
            epoch: 0,
            attempts: 0,
            frames: Vec::new(),
            shot_pending: false,
            handed_off: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn timing(&self) -> &SessionTiming {
        &self.timing
    }

    /// Shot attempts made so far in the current burst.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Frames captured so far in the current burst.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Begin a burst. A no-op while one is already running.
    pub fn start(&mut self) -> Vec<SessionCommand> {
        self.handle(SessionEvent::Start)
    }

    /// Abandon the current burst, discarding partial frames.
    pub fn cancel(&mut self) -> Vec<SessionCommand> {
        self.handle(SessionEvent::Cancel)
    }

    /// Apply one event and return the resulting commands.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        match event {
            SessionEvent::Start => self.on_start(),
            SessionEvent::Cancel => self.on_cancel(),
            SessionEvent::Tick { epoch } if self.is_current(epoch) => self.on_tick(),
            SessionEvent::ShotResolved { epoch, frame } if self.is_current(epoch) => {
                self.on_shot(frame)
            }
            SessionEvent::PauseElapsed { epoch } if self.is_current(epoch) => self.on_pause(),
            SessionEvent::HandoffElapsed { epoch } if self.is_current(epoch) => self.on_handoff(),
            stale => {
                tracing::debug!(
                    event = stale.name(),
                    current_epoch = self.epoch,
                    "Ignoring stale session event"
                );
                Vec::new()
            }
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    fn on_start(&mut self) -> Vec<SessionCommand> {
        if self.state.is_active() {
            tracing::debug!(state = ?self.state, "Burst already running; start ignored");
            return Vec::new();
        }

        self.epoch += 1;
        self.attempts = 0;
        self.frames.clear();
        self.shot_pending = false;
        self.handed_off = false;

        tracing::info!(
            epoch = self.epoch,
            shots = self.timing.shot_count,
            "Burst started"
        );

        if self.timing.shot_count == 0 {
            return self.finish();
        }
        self.begin_countdown()
    }

    fn on_cancel(&mut self) -> Vec<SessionCommand> {
        if !self.state.is_active() {
            tracing::debug!(state = ?self.state, "Nothing to cancel");
            return Vec::new();
        }
        tracing::info!(
            epoch = self.epoch,
            discarded_frames = self.frames.len(),
            "Burst cancelled"
        );
        self.epoch += 1;
        self.state = SessionState::Idle;
        self.frames.clear();
        self.attempts = 0;
        self.shot_pending = false;
        vec![SessionCommand::ClearTimers]
    }

    fn on_tick(&mut self) -> Vec<SessionCommand> {
        let SessionState::Counting { remaining } = self.state else {
            tracing::debug!(state = ?self.state, "Tick outside countdown ignored");
            return Vec::new();
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.state = SessionState::Counting { remaining };
            return vec![
                SessionCommand::ShowCountdown(remaining),
                self.schedule_tick(),
            ];
        }

        self.state = SessionState::Capturing;
        self.shot_pending = true;
        vec![
            SessionCommand::ShowCountdown(0),
            SessionCommand::CaptureShot {
                epoch: self.epoch,
                index: self.frames.len(),
                attempt: self.attempts,
            },
        ]
    }

    fn on_shot(&mut self, frame: Option<CapturedFrame>) -> Vec<SessionCommand> {
        if self.state != SessionState::Capturing || !self.shot_pending {
            tracing::debug!(state = ?self.state, "Unexpected shot result ignored");
            return Vec::new();
        }
        self.shot_pending = false;

        let attempt = self.attempts;
        self.attempts += 1;

        let mut commands = Vec::with_capacity(3);
        match frame {
            Some(frame) => {
                let index = self.frames.len();
                let filter = frame.filter();
                self.frames.push(frame.reindexed(index));
                commands.push(SessionCommand::ShotStored { index, filter });
            }
            None => {
                tracing::warn!(attempt, "Shot skipped: no frame from source");
                commands.push(SessionCommand::ShotSkipped { attempt });
            }
        }

        if self.attempts < self.timing.shot_count {
            commands.push(SessionCommand::SchedulePause {
                epoch: self.epoch,
                after: self.timing.pause,
            });
        } else {
            commands.extend(self.finish());
        }
        commands
    }

    fn on_pause(&mut self) -> Vec<SessionCommand> {
        if self.state != SessionState::Capturing || self.shot_pending {
            return Vec::new();
        }
        self.begin_countdown()
    }

    fn on_handoff(&mut self) -> Vec<SessionCommand> {
        if self.state != SessionState::Done || self.handed_off {
            return Vec::new();
        }
        self.handed_off = true;
        vec![SessionCommand::ReadyForCompositing]
    }

    fn begin_countdown(&mut self) -> Vec<SessionCommand> {
        let ticks = self.timing.countdown_ticks.max(1);
        self.state = SessionState::Counting { remaining: ticks };
        vec![SessionCommand::ShowCountdown(ticks), self.schedule_tick()]
    }

    fn schedule_tick(&self) -> SessionCommand {
        SessionCommand::ScheduleTick {
            epoch: self.epoch,
            after: self.timing.tick,
        }
    }

    fn finish(&mut self) -> Vec<SessionCommand> {
        self.state = SessionState::Done;
        let frames = std::mem::take(&mut self.frames);
        tracing::info!(
            frames = frames.len(),
            attempts = self.attempts,
            "Burst complete"
        );
        vec![
            SessionCommand::Complete { frames },
            SessionCommand::ScheduleHandoff {
                epoch: self.epoch,
                after: self.timing.handoff,
            },
        ]
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(SessionTiming::default())
    }
}
