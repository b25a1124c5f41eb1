//! Deletion safety gate
//!
//! `Idle -> PendingConfirmation -> {Confirmed, Cancelled} -> Idle`. The gate
//! itself never touches the draft; the editor executes the removal after a
//! successful [`DeletionGate::confirm`].

use crate::error::GateError;
use crate::ledger::BindingState;
use survey_model::{QuestionId, RowKey};
use tracing::debug;

/// Gate phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatePhase {
    /// Nothing waiting
    Idle,
    /// A removal waits for the operator
    PendingConfirmation,
    /// Operator accepted the removal
    Confirmed,
    /// Operator declined, or the session went away
    Cancelled,
}

impl GatePhase {
    /// Phases reachable from `self`
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [GatePhase] {
        match self {
            Self::Idle => &[Self::PendingConfirmation],
            Self::PendingConfirmation => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed | Self::Cancelled => &[Self::Idle],
        }
    }

    /// Check a single transition
    ///
    /// # Errors
    /// Returns [`GateError::IllegalTransition`] when `to` is not reachable
    pub fn validate_transition(self, to: GatePhase) -> Result<(), GateError> {
        if self.allowed_transitions().contains(&to) {
            Ok(())
        } else {
            Err(GateError::IllegalTransition { from: self, to })
        }
    }
}

/// A removal waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRemoval {
    /// Index at request time, for display only
    pub index: usize,
    /// Row the removal targets
    pub key: RowKey,
    /// Persisted identifier of the target
    pub question_id: QuestionId,
    /// Binding state that triggered the gate
    pub binding: BindingState,
}

/// Confirmation state machine for destructive question removals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionGate {
    phase: GatePhase,
    pending: Option<PendingRemoval>,
}

impl Default for DeletionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl DeletionGate {
    /// Create an idle gate
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: GatePhase::Idle,
            pending: None,
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// Check if a removal is waiting
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.phase == GatePhase::PendingConfirmation
    }

    /// Removal waiting for confirmation, if any
    #[inline]
    #[must_use]
    pub fn pending(&self) -> Option<&PendingRemoval> {
        self.pending.as_ref()
    }

    /// Park a removal until the operator decides
    ///
    /// # Errors
    /// Returns [`GateError::IllegalTransition`] if a removal is already pending
    pub fn request(&mut self, removal: PendingRemoval) -> Result<(), GateError> {
        self.transition(GatePhase::PendingConfirmation)?;
        debug!(
            question_id = %removal.question_id,
            index = removal.index,
            binding = ?removal.binding,
            "removal awaiting confirmation"
        );
        self.pending = Some(removal);
        Ok(())
    }

    /// Accept the pending removal and return it to the caller for execution
    ///
    /// # Errors
    /// Returns [`GateError::NothingPending`] when idle
    pub fn confirm(&mut self) -> Result<PendingRemoval, GateError> {
        let removal = self.take_pending()?;
        self.transition(GatePhase::Confirmed)?;
        self.transition(GatePhase::Idle)?;
        debug!(question_id = %removal.question_id, "removal confirmed");
        Ok(removal)
    }

    /// Drop the pending removal
    ///
    /// # Errors
    /// Returns [`GateError::NothingPending`] when idle
    pub fn cancel(&mut self) -> Result<PendingRemoval, GateError> {
        let removal = self.take_pending()?;
        self.transition(GatePhase::Cancelled)?;
        self.transition(GatePhase::Idle)?;
        debug!(question_id = %removal.question_id, "removal cancelled");
        Ok(removal)
    }

    /// Cancel whatever is pending, returning it; no-op when idle
    pub fn reset(&mut self) -> Option<PendingRemoval> {
        if self.is_pending() {
            self.cancel().ok()
        } else {
            None
        }
    }

    fn take_pending(&mut self) -> Result<PendingRemoval, GateError> {
        if !self.is_pending() {
            return Err(GateError::NothingPending);
        }
        self.pending.take().ok_or(GateError::NothingPending)
    }

    fn transition(&mut self, to: GatePhase) -> Result<(), GateError> {
        self.phase.validate_transition(to)?;
        self.phase = to;
        Ok(())
    }
}
