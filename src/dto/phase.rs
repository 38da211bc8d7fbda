use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    Snapshot,
    state_machine::{RoundMode, RoundPhase},
};

/// Publicly visible scoring phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// No round open.
    NoActiveRound,
    /// A new round is being scored.
    InProgress,
    /// A persisted round is being corrected.
    Editing,
    /// The round is being saved.
    Finalizing,
}

impl From<&RoundPhase> for VisiblePhase {
    fn from(value: &RoundPhase) -> Self {
        match value {
            RoundPhase::NoActiveRound => VisiblePhase::NoActiveRound,
            RoundPhase::InProgress(RoundMode::New) => VisiblePhase::InProgress,
            RoundPhase::InProgress(RoundMode::Editing(_)) => VisiblePhase::Editing,
        }
    }
}

impl From<&Snapshot> for VisiblePhase {
    fn from(value: &Snapshot) -> Self {
        if value.is_finalizing() {
            VisiblePhase::Finalizing
        } else {
            (&value.phase).into()
        }
    }
}
