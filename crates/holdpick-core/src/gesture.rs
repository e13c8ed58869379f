#![forbid(unsafe_code)]

//! Press-hold-drag-select gesture controller.
//!
//! [`GestureController`] turns normalized [`PointerSignal`]s into a long-press
//! picker session and a single commit-or-cancel decision at release.
//!
//! # State Machine
//!
//! ```text
//! Idle --start--> Pressing --timer--> Selecting --end----> (Committed) --> Idle
//!                    |                    |  ^
//!                    |                    |  +-- move (re-map highlight)
//!                    |                    +-----cancel--> (Cancelled) --> Idle
//!                    +--end/cancel--> Idle (tap, no commit)
//! ```
//!
//! Committed and Cancelled are momentary: the session is torn down in the
//! same transition and the controller reports Idle afterwards.
//!
//! # Invariants
//!
//! 1. At most one session is live; a start signal while a session is live is
//!    ignored (`SessionAlreadyActive`).
//! 2. The long-press timer exists only inside the Pressing state and is
//!    cancelled (consumed) on every exit from it.
//! 3. The highlighted index is always inside `[0, n - 1]` of the session's
//!    candidate snapshot; the picker never opens for an empty snapshot.
//! 4. Every session acquires exactly one capture scope at start and releases
//!    it exactly once, on whichever terminal transition ends the session.
//! 5. At most one `Committed` effect per session, only on release while
//!    Selecting.
//! 6. After [`teardown`](GestureController::teardown) every call is a
//!    `Noop(Disposed)`; nothing can reach the host again.
//!
//! # Time
//!
//! The controller never reads a clock. It compares the timestamps it is
//! handed: hosts call [`poll_timer`](GestureController::poll_timer) when the
//! deadline announced by `TimerArmed` passes, and every start/move/end signal
//! first fires a due timer at its own timestamp. Replaying the same signals
//! therefore gives the same result however often the host polls.
//!
//! Movement while Pressing never cancels the pending long-press: only the
//! timer and explicit end/cancel signals leave that state.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::Span;

use crate::candidates::CandidateList;
use crate::capture::{CaptureCommand, CaptureScope, ScopeId};
use crate::config::{GestureConfig, GestureConfigError};
use crate::pointer::{CancelReason, PointerSample, PointerSignal, PointerSource};
use crate::positioner::{GeometrySource, PickerLayout};
use crate::timer::{OneShotTimer, TimerId};

/// Observable controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Idle,
    Pressing,
    Selecting,
}

/// Identifier of one gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Released before the picker opened (or with nothing to pick).
    Tap,
    /// Released while Selecting; the item at `index` was committed.
    Committed { index: usize },
    /// Cancelled; nothing was committed.
    Cancelled { reason: CancelReason },
}

/// Why a signal changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureNoopReason {
    Disposed,
    NoActiveSession,
    SessionAlreadyActive,
    SourceMismatch,
    MovementWhilePressing,
    HighlightUnchanged,
    NoCandidates,
    TimerNotDue,
    NoArmedTimer,
}

/// One observable consequence of a transition, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect<T> {
    /// Attach or detach the global move/end/cancel listeners.
    Capture(CaptureCommand),
    /// A long-press timer was armed; the host should poll at `deadline_ms`.
    TimerArmed { timer: TimerId, deadline_ms: u64 },
    /// The pending long-press timer was cancelled before it fired.
    TimerCancelled { timer: TimerId },
    /// The long-press fired and the picker opened.
    PickerOpened {
        layout: PickerLayout,
        highlighted: usize,
    },
    HighlightChanged { index: usize },
    /// The highlighted item was committed on release.
    Committed { index: usize, item: T },
    SessionEnded {
        session: SessionId,
        outcome: SessionOutcome,
    },
    Noop { reason: GestureNoopReason },
}

/// Result of one controller call.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTransition<T> {
    pub transition_id: u64,
    pub from: GesturePhase,
    pub to: GesturePhase,
    pub effects: Vec<GestureEffect<T>>,
}

impl<T> GestureTransition<T> {
    /// The committed index and item, if this transition committed.
    #[must_use]
    pub fn committed(&self) -> Option<(usize, &T)> {
        self.effects.iter().find_map(|effect| match effect {
            GestureEffect::Committed { index, item } => Some((*index, item)),
            _ => None,
        })
    }

    /// Outcome of the session this transition ended, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.effects.iter().find_map(|effect| match effect {
            GestureEffect::SessionEnded { outcome, .. } => Some(*outcome),
            _ => None,
        })
    }

    /// Reason the transition was a no-op, if it was.
    #[must_use]
    pub fn noop_reason(&self) -> Option<GestureNoopReason> {
        match self.effects.as_slice() {
            [GestureEffect::Noop { reason }] => Some(*reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.noop_reason().is_some()
    }

    /// Invoke the host callbacks for every effect, in order.
    pub fn deliver<H>(&self, host: &mut H)
    where
        H: GestureHost<T> + ?Sized,
    {
        for effect in &self.effects {
            match effect {
                GestureEffect::Capture(command) => host.on_capture(*command),
                GestureEffect::TimerArmed { timer, deadline_ms } => {
                    host.on_timer_armed(*timer, *deadline_ms);
                }
                GestureEffect::TimerCancelled { .. } | GestureEffect::Noop { .. } => {}
                GestureEffect::PickerOpened {
                    layout,
                    highlighted,
                } => host.on_picker_open(layout, *highlighted),
                GestureEffect::HighlightChanged { index } => host.on_highlight_change(*index),
                GestureEffect::Committed { index, item } => host.on_commit(*index, item),
                GestureEffect::SessionEnded { session, outcome } => {
                    host.on_session_end(*session, *outcome);
                }
            }
        }
    }
}

/// Callbacks a host receives from [`GestureTransition::deliver`].
pub trait GestureHost<T> {
    /// The highlighted row changed (including the initial highlight on open).
    fn on_highlight_change(&mut self, index: usize);

    /// The item at `index` was committed. Fires at most once per session.
    fn on_commit(&mut self, index: usize, item: &T);

    /// A session ended; the picker (if open) should close.
    fn on_session_end(&mut self, session: SessionId, outcome: SessionOutcome);

    fn on_picker_open(&mut self, _layout: &PickerLayout, _highlighted: usize) {}

    fn on_capture(&mut self, _command: CaptureCommand) {}

    fn on_timer_armed(&mut self, _timer: TimerId, _deadline_ms: u64) {}
}

#[derive(Debug)]
enum SessionState {
    Pressing { timer: Option<OneShotTimer> },
    Selecting { layout: PickerLayout, highlighted: usize },
}

#[derive(Debug, Clone, Copy)]
enum Terminal {
    Release,
    Cancel(CancelReason),
}

#[derive(Debug)]
struct GestureSession<T> {
    id: SessionId,
    start: PointerSample,
    candidates: CandidateList<T>,
    capture: CaptureScope,
    state: SessionState,
    span: Span,
}

impl<T> GestureSession<T> {
    fn phase(&self) -> GesturePhase {
        match self.state {
            SessionState::Pressing { .. } => GesturePhase::Pressing,
            SessionState::Selecting { .. } => GesturePhase::Selecting,
        }
    }

    fn accepts(&self, source: PointerSource) -> bool {
        self.capture.source() == source
    }
}

/// Long-press picker state machine.
pub struct GestureController<T> {
    config: GestureConfig,
    session: Option<GestureSession<T>>,
    disposed: bool,
    next_session: u64,
    next_scope: u64,
    next_timer: u64,
    transition_counter: u64,
}

impl<T> fmt::Debug for GestureController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureController")
            .field("phase", &self.phase())
            .field("highlighted", &self.highlighted())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<T> GestureController<T> {
    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.session
            .as_ref()
            .map_or(GesturePhase::Idle, GestureSession::phase)
    }

    /// Whether a session is live (Pressing or Selecting).
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Sample that started the live session.
    #[must_use]
    pub fn start_sample(&self) -> Option<PointerSample> {
        self.session.as_ref().map(|s| s.start)
    }

    /// Highlighted row while Selecting.
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        match self.session.as_ref()?.state {
            SessionState::Selecting { highlighted, .. } => Some(highlighted),
            SessionState::Pressing { .. } => None,
        }
    }

    /// Picker geometry while Selecting.
    #[must_use]
    pub fn picker_layout(&self) -> Option<&PickerLayout> {
        match &self.session.as_ref()?.state {
            SessionState::Selecting { layout, .. } => Some(layout),
            SessionState::Pressing { .. } => None,
        }
    }

    /// Candidate snapshot of the live session.
    #[must_use]
    pub fn candidates(&self) -> Option<&CandidateList<T>> {
        self.session.as_ref().map(|s| &s.candidates)
    }

    /// The pending long-press timer, if one is armed.
    #[must_use]
    pub fn armed_timer(&self) -> Option<&OneShotTimer> {
        match &self.session.as_ref()?.state {
            SessionState::Pressing { timer } => timer.as_ref(),
            SessionState::Selecting { .. } => None,
        }
    }

    /// When the host should next call `poll_timer`.
    #[must_use]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.armed_timer().map(OneShotTimer::deadline_ms)
    }

    /// Capture scope held by the live session.
    #[must_use]
    pub fn capture_scope(&self) -> Option<&CaptureScope> {
        self.session.as_ref().map(|s| &s.capture)
    }
}

impl<T: Clone> GestureController<T> {
    /// Create a controller with a validated configuration.
    pub fn new(config: GestureConfig) -> Result<Self, GestureConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
            disposed: false,
            next_session: 1,
            next_scope: 1,
            next_timer: 1,
            transition_counter: 0,
        })
    }

    /// Route one normalized signal to its handler.
    pub fn dispatch(
        &mut self,
        signal: &PointerSignal,
        candidates: &CandidateList<T>,
        geometry: &dyn GeometrySource,
    ) -> GestureTransition<T> {
        match *signal {
            PointerSignal::Start(sample) => self.press_start(sample, candidates, geometry),
            PointerSignal::Move(sample) => self.press_move(sample, geometry),
            PointerSignal::End {
                source,
                timestamp_ms,
            } => self.press_end(source, timestamp_ms, geometry),
            PointerSignal::Cancel {
                source,
                timestamp_ms,
                reason,
            } => self.press_cancel(source, timestamp_ms, reason),
        }
    }

    /// Idle → Pressing: snapshot candidates, acquire capture, arm the timer.
    pub fn press_start(
        &mut self,
        sample: PointerSample,
        candidates: &CandidateList<T>,
        geometry: &dyn GeometrySource,
    ) -> GestureTransition<T> {
        let from = self.phase();
        let mut effects = Vec::new();
        if self.disposed {
            return self.noop(from, effects, GestureNoopReason::Disposed);
        }
        self.fire_due_timer(sample.timestamp_ms, geometry, &mut effects);
        if self.session.is_some() {
            return self.noop(from, effects, GestureNoopReason::SessionAlreadyActive);
        }

        let id = SessionId(bump(&mut self.next_session));
        let span = tracing::debug_span!(
            "gesture.session",
            session_id = id.0,
            source = ?sample.source,
            candidates = candidates.len()
        );
        let (capture, acquire) = CaptureScope::acquire(ScopeId(bump(&mut self.next_scope)), sample.source);
        let timer = OneShotTimer::arm(
            TimerId(bump(&mut self.next_timer)),
            sample.timestamp_ms,
            self.config.long_press_threshold(),
        );
        effects.push(GestureEffect::Capture(acquire));
        effects.push(GestureEffect::TimerArmed {
            timer: timer.id(),
            deadline_ms: timer.deadline_ms(),
        });

        let max = self.config.picker.max_candidates;
        let candidates = if candidates.len() > max {
            CandidateList::from_recent(candidates.iter().cloned(), max)
        } else {
            candidates.clone()
        };
        span.in_scope(|| {
            tracing::debug!(
                message = "gesture.timer",
                action = "armed",
                timer = timer.id().0,
                deadline_ms = timer.deadline_ms()
            );
        });
        self.session = Some(GestureSession {
            id,
            start: sample,
            candidates,
            capture,
            state: SessionState::Pressing { timer: Some(timer) },
            span,
        });
        self.finish(from, effects)
    }

    /// Selecting: re-map the highlighted row. Ignored while Pressing.
    pub fn press_move(
        &mut self,
        sample: PointerSample,
        geometry: &dyn GeometrySource,
    ) -> GestureTransition<T> {
        let from = self.phase();
        let mut effects = Vec::new();
        if self.disposed {
            return self.noop(from, effects, GestureNoopReason::Disposed);
        }
        self.fire_due_timer(sample.timestamp_ms, geometry, &mut effects);
        let Some(session) = self.session.as_mut() else {
            return self.noop(from, effects, GestureNoopReason::NoActiveSession);
        };
        if !session.accepts(sample.source) {
            return self.noop(from, effects, GestureNoopReason::SourceMismatch);
        }
        let reason = match &mut session.state {
            SessionState::Pressing { .. } => GestureNoopReason::MovementWhilePressing,
            SessionState::Selecting {
                layout,
                highlighted,
            } => {
                let index = layout.rows.index_at(sample.y);
                if index == *highlighted {
                    GestureNoopReason::HighlightUnchanged
                } else {
                    *highlighted = index;
                    effects.push(GestureEffect::HighlightChanged { index });
                    return self.finish(from, effects);
                }
            }
        };
        self.noop(from, effects, reason)
    }

    /// Release: commit while Selecting, plain tap while Pressing.
    pub fn press_end(
        &mut self,
        source: PointerSource,
        timestamp_ms: u64,
        geometry: &dyn GeometrySource,
    ) -> GestureTransition<T> {
        let from = self.phase();
        let mut effects = Vec::new();
        if self.disposed {
            return self.noop(from, effects, GestureNoopReason::Disposed);
        }
        self.fire_due_timer(timestamp_ms, geometry, &mut effects);
        match self.session.as_ref() {
            None => return self.noop(from, effects, GestureNoopReason::NoActiveSession),
            Some(session) if !session.accepts(source) => {
                return self.noop(from, effects, GestureNoopReason::SourceMismatch);
            }
            Some(_) => {}
        }
        if let Some(session) = self.session.take() {
            Self::close_session(session, Terminal::Release, &mut effects);
        }
        self.finish(from, effects)
    }

    /// Cancel the live session without committing.
    ///
    /// A `source` of `None` cancels whatever session is live.
    pub fn press_cancel(
        &mut self,
        source: Option<PointerSource>,
        timestamp_ms: u64,
        reason: CancelReason,
    ) -> GestureTransition<T> {
        let from = self.phase();
        let mut effects = Vec::new();
        if self.disposed {
            return self.noop(from, effects, GestureNoopReason::Disposed);
        }
        match (self.session.as_ref(), source) {
            (None, _) => return self.noop(from, effects, GestureNoopReason::NoActiveSession),
            (Some(session), Some(source)) if !session.accepts(source) => {
                return self.noop(from, effects, GestureNoopReason::SourceMismatch);
            }
            _ => {}
        }
        if let Some(session) = self.session.take() {
            session.span.in_scope(|| {
                tracing::debug!(message = "gesture.cancel", ?reason, timestamp_ms);
            });
            Self::close_session(session, Terminal::Cancel(reason), &mut effects);
        }
        self.finish(from, effects)
    }

    /// Fire the long-press timer if it is due at `now_ms`.
    pub fn poll_timer(
        &mut self,
        now_ms: u64,
        geometry: &dyn GeometrySource,
    ) -> GestureTransition<T> {
        let from = self.phase();
        let mut effects = Vec::new();
        if self.disposed {
            return self.noop(from, effects, GestureNoopReason::Disposed);
        }
        let due = self.armed_timer().map(|timer| timer.is_due(now_ms));
        let reason = match (self.session.is_some(), due) {
            (false, _) => GestureNoopReason::NoActiveSession,
            (true, None) => GestureNoopReason::NoArmedTimer,
            (true, Some(false)) => GestureNoopReason::TimerNotDue,
            (true, Some(true)) => {
                self.fire_due_timer(now_ms, geometry, &mut effects);
                return self.finish(from, effects);
            }
        };
        self.noop(from, effects, reason)
    }

    /// Dispose the controller, cancelling any live session.
    ///
    /// Idempotent. Afterwards every call returns `Noop(Disposed)`.
    pub fn teardown(&mut self) -> GestureTransition<T> {
        let from = self.phase();
        let mut effects = Vec::new();
        if self.disposed {
            return self.noop(from, effects, GestureNoopReason::Disposed);
        }
        self.disposed = true;
        match self.session.take() {
            Some(session) => {
                Self::close_session(session, Terminal::Cancel(CancelReason::Disposed), &mut effects);
                self.finish(from, effects)
            }
            None => self.noop(from, effects, GestureNoopReason::NoActiveSession),
        }
    }

    fn fire_due_timer(
        &mut self,
        now_ms: u64,
        geometry: &dyn GeometrySource,
        effects: &mut Vec<GestureEffect<T>>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let SessionState::Pressing { timer } = &mut session.state else {
            return;
        };
        if !timer.as_ref().is_some_and(|t| t.is_due(now_ms)) {
            return;
        }
        let Some(timer) = timer.take() else {
            return;
        };
        let timer_id = timer.fire();
        let _entered = session.span.enter();

        let Some(count) = session.candidates.count() else {
            tracing::debug!(
                message = "gesture.timer",
                action = "fired_empty",
                timer = timer_id.0,
                now_ms
            );
            effects.push(GestureEffect::Noop {
                reason: GestureNoopReason::NoCandidates,
            });
            return;
        };

        let layout = PickerLayout::resolve(geometry, count, &self.config.picker);
        let highlighted = layout.rows.last_index();
        if !layout.measured {
            tracing::warn!(
                message = "gesture.geometry_unavailable",
                session_id = session.id.0
            );
        }
        tracing::debug!(
            message = "gesture.timer",
            action = "fired",
            timer = timer_id.0,
            now_ms,
            highlighted
        );
        session.state = SessionState::Selecting {
            layout,
            highlighted,
        };
        effects.push(GestureEffect::PickerOpened {
            layout,
            highlighted,
        });
        effects.push(GestureEffect::HighlightChanged { index: highlighted });
    }

    fn close_session(
        session: GestureSession<T>,
        terminal: Terminal,
        effects: &mut Vec<GestureEffect<T>>,
    ) {
        let GestureSession {
            id,
            candidates,
            capture,
            state,
            span,
            ..
        } = session;
        let _entered = span.enter();
        let outcome = match state {
            SessionState::Pressing { timer } => {
                if let Some(timer) = timer {
                    let timer = timer.cancel();
                    tracing::debug!(message = "gesture.timer", action = "cancelled", timer = timer.0);
                    effects.push(GestureEffect::TimerCancelled { timer });
                }
                match terminal {
                    Terminal::Release => SessionOutcome::Tap,
                    Terminal::Cancel(reason) => SessionOutcome::Cancelled { reason },
                }
            }
            SessionState::Selecting { highlighted, .. } => match terminal {
                Terminal::Cancel(reason) => SessionOutcome::Cancelled { reason },
                Terminal::Release => match candidates.get(highlighted) {
                    Some(item) => {
                        effects.push(GestureEffect::Committed {
                            index: highlighted,
                            item: item.clone(),
                        });
                        SessionOutcome::Committed { index: highlighted }
                    }
                    None => SessionOutcome::Tap,
                },
            },
        };
        effects.push(GestureEffect::Capture(capture.release()));
        tracing::debug!(message = "gesture.session_end", session_id = id.0, ?outcome);
        effects.push(GestureEffect::SessionEnded {
            session: id,
            outcome,
        });
    }

    fn noop(
        &mut self,
        from: GesturePhase,
        mut effects: Vec<GestureEffect<T>>,
        reason: GestureNoopReason,
    ) -> GestureTransition<T> {
        tracing::trace!(message = "gesture.noop", ?reason, phase = ?from);
        if effects.is_empty() {
            effects.push(GestureEffect::Noop { reason });
        }
        self.finish(from, effects)
    }

    fn finish(&mut self, from: GesturePhase, effects: Vec<GestureEffect<T>>) -> GestureTransition<T> {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let to = self.phase();
        if from != to {
            tracing::debug!(
                message = "gesture.transition",
                transition_id = self.transition_counter,
                ?from,
                ?to,
                effects = effects.len()
            );
        }
        GestureTransition {
            transition_id: self.transition_counter,
            from,
            to,
            effects,
        }
    }
}

impl<T> Drop for GestureController<T> {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            tracing::warn!(
                message = "gesture.dropped_live_session",
                session_id = session.id.0
            );
        }
    }
}

fn bump(counter: &mut u64) -> u64 {
    let value = *counter;
    *counter = counter.saturating_add(1);
    value
}
