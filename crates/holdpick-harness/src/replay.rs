#![forbid(unsafe_code)]

//! Deterministic replay of a [`Trace`] through a fresh [`Composer`].
//!
//! Every [`ComposerEvent`] becomes an [`Observation`] stamped with the host
//! time of the step that produced it. Observations are folded into an FNV-1a
//! checksum chain over their JSON encoding, so two replays agree on the
//! checksum exactly when they agree on every observation.
//!
//! Time lives in a [`ManualClock`] that only moves forward through the
//! timestamps in the trace; nothing reads a wall clock.

use holdpick_composer::{Composer, ComposerEvent, Identified};
use holdpick_core::{Clock, GesturePhase, ManualClock, SessionOutcome};
use serde::Serialize;

use crate::error::Result;
use crate::trace::{Trace, TraceItem, TraceRecord};

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_chain(prev: u64, bytes: &[u8]) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64_bytes(hash, bytes)
}

/// One UI-visible event produced during replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Observation {
    PickerOpened {
        ts_ms: u64,
        highlighted: usize,
    },
    HighlightChanged {
        ts_ms: u64,
        index: usize,
    },
    Attached {
        ts_ms: u64,
        index: usize,
        id: String,
    },
    PickerClosed {
        ts_ms: u64,
        #[serde(flatten)]
        outcome: SessionOutcome,
    },
    AttachmentCleared {
        ts_ms: u64,
        id: String,
    },
    Sent {
        ts_ms: u64,
        text: String,
        attachment: Option<String>,
    },
}

impl Observation {
    fn from_event(ts_ms: u64, event: ComposerEvent<TraceItem>) -> Self {
        match event {
            ComposerEvent::PickerOpened { highlighted } => Self::PickerOpened { ts_ms, highlighted },
            ComposerEvent::HighlightChanged { index } => Self::HighlightChanged { ts_ms, index },
            ComposerEvent::Attached { index, item } => Self::Attached {
                ts_ms,
                index,
                id: item.id,
            },
            ComposerEvent::PickerClosed { outcome } => Self::PickerClosed { ts_ms, outcome },
            ComposerEvent::AttachmentCleared { item } => Self::AttachmentCleared { ts_ms, id: item.id },
            ComposerEvent::Sent(message) => Self::Sent {
                ts_ms,
                text: message.text,
                attachment: message.attachment.map(|item| item.id),
            },
        }
    }

    /// Compact one-line rendering for terminal output.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::PickerOpened { ts_ms, highlighted } => {
                format!("{ts_ms:>8}  picker_opened highlighted={highlighted}")
            }
            Self::HighlightChanged { ts_ms, index } => {
                format!("{ts_ms:>8}  highlight index={index}")
            }
            Self::Attached { ts_ms, index, id } => {
                format!("{ts_ms:>8}  attached index={index} id={id}")
            }
            Self::PickerClosed { ts_ms, outcome } => {
                format!("{ts_ms:>8}  picker_closed outcome={outcome:?}")
            }
            Self::AttachmentCleared { ts_ms, id } => {
                format!("{ts_ms:>8}  attachment_cleared id={id}")
            }
            Self::Sent {
                ts_ms,
                text,
                attachment,
            } => format!("{ts_ms:>8}  sent text={text:?} attachment={attachment:?}"),
        }
    }
}

/// Result of replaying a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub observations: Vec<Observation>,
    /// FNV-1a chain over the JSON encoding of every observation.
    pub checksum: u64,
    pub steps: usize,
    /// Input records that carried no gesture meaning.
    pub ignored_inputs: usize,
    pub final_phase: GesturePhase,
    pub attachment: Option<String>,
    /// Whether global capture was still held when the trace ended.
    pub capturing_at_end: bool,
}

impl ReplayReport {
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        format!("{:016x}", self.checksum)
    }
}

/// Replay `trace` from a fresh composer.
pub fn replay(trace: &Trace) -> Result<ReplayReport> {
    let header = &trace.header;
    let _span = tracing::info_span!(
        "harness.replay",
        steps = trace.steps.len(),
        candidates = header.candidates.len()
    )
    .entered();

    let mut composer = Composer::with_recent(header.config, header.candidates.iter().cloned())?;
    composer.set_anchor_rect(header.anchor);
    composer.set_viewport(header.viewport);

    let clock = ManualClock::new(0);
    let mut ignored_inputs = 0_usize;
    let mut observations = Vec::new();
    let mut checksum = FNV_OFFSET_BASIS;

    for step in &trace.steps {
        match step {
            TraceRecord::Input { event } => {
                clock.set(event.timestamp_ms());
                if composer.handle_input(event).is_none() {
                    ignored_inputs += 1;
                }
            }
            TraceRecord::Tick { ts_ms } => {
                clock.set(*ts_ms);
                composer.tick_with(&clock);
            }
            TraceRecord::Anchor { rect } => composer.set_anchor_rect(*rect),
            TraceRecord::Viewport { size } => composer.set_viewport(*size),
            TraceRecord::Draft { text } => composer.set_draft(text.as_str()),
            TraceRecord::Send => {
                composer.send();
            }
            TraceRecord::ClearAttachment => {
                composer.clear_attachment();
            }
            TraceRecord::Dispose => composer.dispose(),
            TraceRecord::Header(_) => {}
        }
        for event in composer.drain_events() {
            let observation = Observation::from_event(clock.now_ms(), event);
            checksum = fnv1a64_chain(checksum, &serde_json::to_vec(&observation)?);
            observations.push(observation);
        }
    }

    let report = ReplayReport {
        observations,
        checksum,
        steps: trace.steps.len(),
        ignored_inputs,
        final_phase: composer.phase(),
        attachment: composer.attachment().map(|item| item.id().clone()),
        capturing_at_end: composer.is_capturing(),
    };
    tracing::info!(
        message = "harness.replay",
        observations = report.observations.len(),
        checksum = %report.checksum_hex(),
        ignored_inputs
    );
    Ok(report)
}
