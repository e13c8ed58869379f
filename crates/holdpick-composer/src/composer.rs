#![forbid(unsafe_code)]

//! Chat composer with a press-hold-drag-select attach button.
//!
//! The [`Composer`] owns the draft text, the recency list, the attached
//! item, and a [`GestureController`] bound to the attach button. Raw input
//! goes in through [`Composer::handle_input`], time through
//! [`Composer::tick`]; the UI layer drains [`ComposerEvent`]s and reads the
//! open [`PickerView`] to render.
//!
//! # Attachment rules
//!
//! - A commit replaces whatever is attached.
//! - Cancels and taps leave the attachment untouched.
//! - Only [`Composer::clear_attachment`] or a successful
//!   [`Composer::send`] removes it.

use std::collections::VecDeque;

use holdpick_core::{
    CandidateList, CaptureCommand, CaptureLedger, Clock, GestureConfig, GestureConfigError,
    GestureController, GestureHost, GesturePhase, GestureTransition, InputEvent,
    NormalizePointer, PickerLayout, PointerSignal, Rect, SessionId, SessionOutcome, Size,
    StaticGeometry,
};

use crate::picker::PickerView;
use crate::recent::{Identified, RecentItems};

/// A message handed to the transport by [`Composer::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage<T> {
    pub text: String,
    pub attachment: Option<T>,
}

/// UI-facing notifications, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent<T> {
    PickerOpened { highlighted: usize },
    HighlightChanged { index: usize },
    Attached { index: usize, item: T },
    PickerClosed { outcome: SessionOutcome },
    AttachmentCleared { item: T },
    Sent(OutgoingMessage<T>),
}

/// Composer state plus the attach-button gesture.
pub struct Composer<T: Identified + Clone> {
    controller: GestureController<T>,
    recent: RecentItems<T>,
    draft: String,
    attachment: Option<T>,
    picker: Option<PickerView<T>>,
    geometry: StaticGeometry,
    captures: CaptureLedger,
    events: VecDeque<ComposerEvent<T>>,
    disposed: bool,
}

impl<T: Identified + Clone> std::fmt::Debug for Composer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("phase", &self.controller.phase())
            .field("recent", &self.recent.len())
            .field("draft_len", &self.draft.len())
            .field("attached", &self.attachment.as_ref().map(Identified::id))
            .field("picker_open", &self.picker.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<T: Identified + Clone> Composer<T> {
    /// Empty composer.
    pub fn new(config: GestureConfig) -> Result<Self, GestureConfigError> {
        Self::with_recent(config, std::iter::empty())
    }

    /// Composer seeded with recent items, oldest first.
    pub fn with_recent(
        config: GestureConfig,
        recent: impl IntoIterator<Item = T>,
    ) -> Result<Self, GestureConfigError> {
        let controller = GestureController::new(config)?;
        let recent = RecentItems::with_items(config.picker.max_candidates, recent);
        Ok(Self {
            controller,
            recent,
            draft: String::new(),
            attachment: None,
            picker: None,
            geometry: StaticGeometry::default(),
            captures: CaptureLedger::new(),
            events: VecDeque::new(),
            disposed: false,
        })
    }

    // --- Geometry ---

    /// Bounding rect of the attach button, as last measured by the UI.
    pub fn set_anchor_rect(&mut self, rect: Option<Rect>) {
        self.geometry.anchor = rect;
    }

    pub fn set_viewport(&mut self, size: Option<Size>) {
        self.geometry.viewport = size;
    }

    #[must_use]
    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    // --- Draft and attachment ---

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    #[must_use]
    pub fn attachment(&self) -> Option<&T> {
        self.attachment.as_ref()
    }

    /// Remove the attached item.
    pub fn clear_attachment(&mut self) -> Option<T> {
        let item = self.attachment.take()?;
        tracing::debug!(message = "composer.detach", id = ?item.id());
        self.events
            .push_back(ComposerEvent::AttachmentCleared { item: item.clone() });
        Some(item)
    }

    /// Produce the outgoing message and reset draft and attachment.
    ///
    /// Returns `None` when there is neither text nor an attachment.
    pub fn send(&mut self) -> Option<OutgoingMessage<T>> {
        let text = self.draft.trim();
        if text.is_empty() && self.attachment.is_none() {
            return None;
        }
        let outgoing = OutgoingMessage {
            text: text.to_owned(),
            attachment: self.attachment.take(),
        };
        self.draft.clear();
        tracing::debug!(
            message = "composer.send",
            text_len = outgoing.text.len(),
            attached = outgoing.attachment.is_some()
        );
        self.events.push_back(ComposerEvent::Sent(outgoing.clone()));
        Some(outgoing)
    }

    // --- Recent items ---

    #[must_use]
    pub fn recent(&self) -> &RecentItems<T> {
        &self.recent
    }

    /// Record an item as most recent. A live session keeps its own snapshot.
    pub fn record_recent(&mut self, item: T) {
        self.recent.record(item);
    }

    // --- Gesture ---

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.controller.phase()
    }

    /// The open picker, if any.
    #[must_use]
    pub fn picker(&self) -> Option<&PickerView<T>> {
        self.picker.as_ref()
    }

    /// Whether the global move/end/cancel listeners are attached.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.captures.is_capturing()
    }

    #[must_use]
    pub fn captures(&self) -> &CaptureLedger {
        &self.captures
    }

    /// When the UI should next call [`tick`](Self::tick).
    #[must_use]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.controller.next_deadline_ms()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Feed one raw input event. Events with no gesture meaning return `None`.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<GestureTransition<T>> {
        let signal = event.normalize()?;
        Some(self.handle_signal(&signal))
    }

    /// Feed one normalized pointer signal.
    pub fn handle_signal(&mut self, signal: &PointerSignal) -> GestureTransition<T> {
        let snapshot = self.snapshot();
        let transition = self
            .controller
            .dispatch(signal, &snapshot, &self.geometry);
        self.apply(&transition, &snapshot);
        transition
    }

    /// Advance time; fires the long-press once its deadline has passed.
    pub fn tick(&mut self, now_ms: u64) -> Option<GestureTransition<T>> {
        let deadline = self.controller.next_deadline_ms()?;
        if now_ms < deadline {
            return None;
        }
        let snapshot = self.snapshot();
        let transition = self.controller.poll_timer(now_ms, &self.geometry);
        self.apply(&transition, &snapshot);
        Some(transition)
    }

    /// [`tick`](Self::tick) at the time `clock` reports.
    pub fn tick_with(&mut self, clock: &dyn Clock) -> Option<GestureTransition<T>> {
        self.tick(clock.now_ms())
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ComposerEvent<T>> + '_ {
        self.events.drain(..)
    }

    /// Tear the gesture down. Idempotent; also run on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let snapshot = self.snapshot();
        let transition = self.controller.teardown();
        self.apply(&transition, &snapshot);
    }

    fn snapshot(&self) -> CandidateList<T> {
        self.controller
            .candidates()
            .cloned()
            .unwrap_or_else(|| self.recent.candidates())
    }

    fn apply(&mut self, transition: &GestureTransition<T>, candidates: &CandidateList<T>) {
        let mut host = Applier {
            candidates,
            attachment: &mut self.attachment,
            picker: &mut self.picker,
            captures: &mut self.captures,
            events: &mut self.events,
        };
        transition.deliver(&mut host);
    }
}

impl<T: Identified + Clone> Drop for Composer<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Applies controller effects to the composer's fields.
struct Applier<'a, T> {
    candidates: &'a CandidateList<T>,
    attachment: &'a mut Option<T>,
    picker: &'a mut Option<PickerView<T>>,
    captures: &'a mut CaptureLedger,
    events: &'a mut VecDeque<ComposerEvent<T>>,
}

impl<T: Identified + Clone> GestureHost<T> for Applier<'_, T> {
    fn on_picker_open(&mut self, layout: &PickerLayout, highlighted: usize) {
        *self.picker = Some(PickerView::build(*layout, self.candidates, highlighted));
        self.events
            .push_back(ComposerEvent::PickerOpened { highlighted });
    }

    fn on_highlight_change(&mut self, index: usize) {
        if let Some(picker) = self.picker.as_mut() {
            picker.set_highlighted(index);
        }
        self.events
            .push_back(ComposerEvent::HighlightChanged { index });
    }

    fn on_commit(&mut self, index: usize, item: &T) {
        tracing::info!(message = "composer.attach", index, id = ?item.id());
        *self.attachment = Some(item.clone());
        self.events.push_back(ComposerEvent::Attached {
            index,
            item: item.clone(),
        });
    }

    fn on_session_end(&mut self, session: SessionId, outcome: SessionOutcome) {
        if self.picker.take().is_some() {
            tracing::debug!(message = "composer.picker_closed", session_id = session.0, ?outcome);
            self.events
                .push_back(ComposerEvent::PickerClosed { outcome });
        }
    }

    fn on_capture(&mut self, command: CaptureCommand) {
        if let Err(err) = self.captures.apply(command) {
            tracing::warn!(message = "composer.capture_mismatch", error = %err);
        }
    }
}
