use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::state::model::RoundId;

/// High-level phases of the scoring flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    /// Nothing is being scored; history and analytics are browsable.
    NoActiveRound,
    /// A working round is open.
    InProgress(RoundMode),
}

/// What the open round will do once finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundMode {
    /// Append as a new round.
    New,
    /// Replace the persisted round with this id.
    Editing(RoundId),
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// Players selected, new round opened.
    Start,
    /// Persisted round reopened for correction.
    Edit(RoundId),
    /// Complete round saved.
    Finalize,
    /// Working round thrown away.
    Discard,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: RoundPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoundEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// State machine phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: RoundPhase,
        /// Current phase.
        actual: RoundPhase,
    },
    /// State machine version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A planned state machine transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the state machine is currently in.
    pub from: RoundPhase,
    /// Phase the state machine will transition to.
    pub to: RoundPhase,
    /// Event that triggered this transition.
    pub event: RoundEvent,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: RoundPhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
    /// Event of the pending transition, if one is planned but not yet applied.
    pub pending: Option<RoundEvent>,
}

impl Snapshot {
    /// A finalize has been planned and its save is running.
    pub fn is_finalizing(&self) -> bool {
        matches!(self.pending, Some(RoundEvent::Finalize))
    }
}

/// State machine of the scoring flow.
#[derive(Debug, Clone)]
pub struct RoundStateMachine {
    phase: RoundPhase,
    version: usize,
    pending: Option<Plan>,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self {
            phase: RoundPhase::NoActiveRound,
            version: 0,
            pending: None,
        }
    }
}

impl RoundStateMachine {
    /// Create a new state machine with no active round.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase.clone()
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.event.clone()),
        }
    }

    /// Plan a transition by validating that the event can be applied from the current phase.
    /// Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, event: RoundEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event.clone())
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase.clone(),
            to: next,
            event,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition, moving the state machine to the next phase.
    /// Returns the new phase after the transition.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<RoundPhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase.clone(),
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = plan.to;
        self.version = plan.version_next;

        Ok(self.phase.clone())
    }

    /// Abort a planned transition, leaving the current phase untouched.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    fn compute_transition(&self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = match (self.phase.clone(), event) {
            (RoundPhase::NoActiveRound, RoundEvent::Start) => {
                RoundPhase::InProgress(RoundMode::New)
            }
            (RoundPhase::NoActiveRound, RoundEvent::Edit(id)) => {
                RoundPhase::InProgress(RoundMode::Editing(id))
            }
            (RoundPhase::InProgress(_), RoundEvent::Finalize | RoundEvent::Discard) => {
                RoundPhase::NoActiveRound
            }
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut RoundStateMachine, event: RoundEvent) -> RoundPhase {
        let plan = sm.plan(event).unwrap();
        sm.apply(plan.id).unwrap()
    }

    #[test]
    fn initial_state_has_no_round() {
        let sm = RoundStateMachine::new();
        assert_eq!(sm.phase(), RoundPhase::NoActiveRound);
        assert_eq!(sm.snapshot().version, 0);
    }

    #[test]
    fn new_and_edited_rounds_return_to_idle() {
        let mut sm = RoundStateMachine::new();
        assert_eq!(
            apply(&mut sm, RoundEvent::Start),
            RoundPhase::InProgress(RoundMode::New)
        );
        assert_eq!(
            apply(&mut sm, RoundEvent::Finalize),
            RoundPhase::NoActiveRound
        );
        assert_eq!(
            apply(&mut sm, RoundEvent::Edit("r_1".into())),
            RoundPhase::InProgress(RoundMode::Editing("r_1".into()))
        );
        assert_eq!(apply(&mut sm, RoundEvent::Discard), RoundPhase::NoActiveRound);
        assert_eq!(sm.snapshot().version, 4);
    }

    #[test]
    fn second_round_cannot_start_while_one_is_open() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::Start);

        let err = sm.plan(RoundEvent::Edit("r_1".into())).unwrap_err();
        match err {
            PlanError::InvalidTransition(InvalidTransition { from, event }) => {
                assert_eq!(from, RoundPhase::InProgress(RoundMode::New));
                assert_eq!(event, RoundEvent::Edit("r_1".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn finalize_without_round_is_invalid() {
        let mut sm = RoundStateMachine::new();
        let err = sm.plan(RoundEvent::Finalize).unwrap_err();
        assert!(matches!(err, PlanError::InvalidTransition(_)));
    }

    #[test]
    fn pending_finalize_reports_finalizing_until_aborted() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::Start);

        let plan = sm.plan(RoundEvent::Finalize).unwrap();
        assert!(sm.snapshot().is_finalizing());
        assert_eq!(sm.plan(RoundEvent::Discard).unwrap_err(), PlanError::AlreadyPending);

        sm.abort(plan.id).unwrap();
        let snapshot = sm.snapshot();
        assert!(!snapshot.is_finalizing());
        assert_eq!(snapshot.phase, RoundPhase::InProgress(RoundMode::New));
    }

    #[test]
    fn apply_with_wrong_id_keeps_plan() {
        let mut sm = RoundStateMachine::new();
        let plan = sm.plan(RoundEvent::Start).unwrap();
        let other = Uuid::new_v4();
        assert_eq!(
            sm.apply(other),
            Err(ApplyError::IdMismatch {
                expected: plan.id,
                got: other
            })
        );
        assert_eq!(sm.apply(plan.id), Ok(RoundPhase::InProgress(RoundMode::New)));
    }
}
