#![forbid(unsafe_code)]

//! Global input capture for the lifetime of one gesture session.
//!
//! Once a press starts, the finger or pointer quickly leaves the small anchor
//! control, so move/end/cancel listeners have to live on the whole input
//! surface. The controller models that subscription as a [`CaptureScope`]:
//!
//! - acquiring a scope yields a [`CaptureCommand::Acquire`] for the host,
//! - the scope is consumed by [`CaptureScope::release`], which yields the
//!   matching [`CaptureCommand::Release`],
//! - a scope cannot be cloned, so it is released at most once.
//!
//! Hosts that want to check the pairing (tests, debug builds, replay) feed
//! every command through a [`CaptureLedger`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pointer::PointerSource;

/// Identifier of one capture scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u64);

/// Host command for attaching/detaching the global listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CaptureCommand {
    Acquire {
        scope: ScopeId,
        source: PointerSource,
    },
    Release {
        scope: ScopeId,
    },
}

impl CaptureCommand {
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        match self {
            Self::Acquire { scope, .. } | Self::Release { scope } => *scope,
        }
    }
}

/// Live subscription to the global input surface.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a CaptureScope must be released"]
pub struct CaptureScope {
    id: ScopeId,
    source: PointerSource,
}

impl CaptureScope {
    /// Open a scope for events from `source`.
    pub fn acquire(id: ScopeId, source: PointerSource) -> (Self, CaptureCommand) {
        (Self { id, source }, CaptureCommand::Acquire { scope: id, source })
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> ScopeId {
        self.id
    }

    /// Device family the listeners were attached for.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> PointerSource {
        self.source
    }

    /// Close the scope.
    #[must_use]
    pub fn release(self) -> CaptureCommand {
        CaptureCommand::Release { scope: self.id }
    }
}

/// Pairing violations detected by [`CaptureLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureLedgerError {
    /// A scope was acquired while another one was still open.
    Overlapping { open: ScopeId, requested: ScopeId },
    /// The same scope was acquired twice.
    AlreadyAcquired { scope: ScopeId },
    /// A release named a scope that is not open.
    NotAcquired { scope: ScopeId },
}

impl fmt::Display for CaptureLedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlapping { open, requested } => write!(
                f,
                "capture scope {} acquired while scope {} is still open",
                requested.0, open.0
            ),
            Self::AlreadyAcquired { scope } => {
                write!(f, "capture scope {} acquired twice", scope.0)
            }
            Self::NotAcquired { scope } => {
                write!(f, "capture scope {} released but not open", scope.0)
            }
        }
    }
}

impl std::error::Error for CaptureLedgerError {}

/// Bookkeeping of capture commands applied by a host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureLedger {
    open: Option<(ScopeId, PointerSource)>,
    acquired_total: u64,
    released_total: u64,
    last_scope: Option<ScopeId>,
}

impl CaptureLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            open: None,
            acquired_total: 0,
            released_total: 0,
            last_scope: None,
        }
    }

    /// Record one command, rejecting anything that breaks acquire/release pairing.
    pub fn apply(&mut self, command: CaptureCommand) -> Result<(), CaptureLedgerError> {
        match command {
            CaptureCommand::Acquire { scope, source } => {
                if let Some((open, _)) = self.open {
                    return Err(if open == scope {
                        CaptureLedgerError::AlreadyAcquired { scope }
                    } else {
                        CaptureLedgerError::Overlapping {
                            open,
                            requested: scope,
                        }
                    });
                }
                if self.last_scope == Some(scope) {
                    return Err(CaptureLedgerError::AlreadyAcquired { scope });
                }
                self.open = Some((scope, source));
                self.last_scope = Some(scope);
                self.acquired_total = self.acquired_total.saturating_add(1);
                Ok(())
            }
            CaptureCommand::Release { scope } => match self.open {
                Some((open, _)) if open == scope => {
                    self.open = None;
                    self.released_total = self.released_total.saturating_add(1);
                    Ok(())
                }
                _ => Err(CaptureLedgerError::NotAcquired { scope }),
            },
        }
    }

    /// Whether listeners are currently attached.
    #[inline]
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.open.is_some()
    }

    /// The open scope and its source, if any.
    #[inline]
    #[must_use]
    pub const fn open_scope(&self) -> Option<(ScopeId, PointerSource)> {
        self.open
    }

    #[inline]
    #[must_use]
    pub const fn acquired_total(&self) -> u64 {
        self.acquired_total
    }

    #[inline]
    #[must_use]
    pub const fn released_total(&self) -> u64 {
        self.released_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_release_balances() {
        let mut ledger = CaptureLedger::new();
        let (scope, acquire) = CaptureScope::acquire(ScopeId(1), PointerSource::Touch);
        assert_eq!(scope.source(), PointerSource::Touch);
        ledger.apply(acquire).expect("acquire");
        assert!(ledger.is_capturing());
        assert_eq!(ledger.open_scope(), Some((ScopeId(1), PointerSource::Touch)));

        ledger.apply(scope.release()).expect("release");
        assert!(!ledger.is_capturing());
        assert_eq!(ledger.acquired_total(), 1);
        assert_eq!(ledger.released_total(), 1);
    }

    #[test]
    fn overlapping_acquire_is_rejected() {
        let mut ledger = CaptureLedger::new();
        let (_a, acquire_a) = CaptureScope::acquire(ScopeId(1), PointerSource::Mouse);
        let (_b, acquire_b) = CaptureScope::acquire(ScopeId(2), PointerSource::Mouse);
        ledger.apply(acquire_a).expect("first acquire");
        assert_eq!(
            ledger.apply(acquire_b),
            Err(CaptureLedgerError::Overlapping {
                open: ScopeId(1),
                requested: ScopeId(2)
            })
        );
    }

    #[test]
    fn double_release_is_rejected() {
        let mut ledger = CaptureLedger::new();
        let (scope, acquire) = CaptureScope::acquire(ScopeId(7), PointerSource::Touch);
        ledger.apply(acquire).expect("acquire");
        let release = scope.release();
        ledger.apply(release).expect("release");
        assert_eq!(
            ledger.apply(release),
            Err(CaptureLedgerError::NotAcquired { scope: ScopeId(7) })
        );
    }

    #[test]
    fn reacquiring_a_closed_scope_is_rejected() {
        let mut ledger = CaptureLedger::new();
        let acquire = CaptureCommand::Acquire {
            scope: ScopeId(3),
            source: PointerSource::Touch,
        };
        ledger.apply(acquire).expect("acquire");
        ledger
            .apply(CaptureCommand::Release { scope: ScopeId(3) })
            .expect("release");
        assert_eq!(
            ledger.apply(acquire),
            Err(CaptureLedgerError::AlreadyAcquired { scope: ScopeId(3) })
        );
    }

    #[test]
    fn error_messages_name_scopes() {
        let err = CaptureLedgerError::NotAcquired { scope: ScopeId(9) };
        assert_eq!(err.to_string(), "capture scope 9 released but not open");
    }
}
