use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{phase::VisiblePhase, round::RoundSummaryResponse};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Raw event with a pre-rendered data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the shared remote store is unreachable.
    pub degraded: bool,
    pub phase: VisiblePhase,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the scoring phase changes.
pub struct PhaseChangedEvent {
    pub phase: VisiblePhase,
    /// Id of the working round, if one is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Working round changed (score, hole, or auto-advance).
pub struct RoundUpdatedEvent {
    pub round_id: String,
    pub current_hole: u8,
    pub complete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Round saved; carries the summary screen.
pub struct RoundFinalizedEvent(pub RoundSummaryResponse);

#[derive(Debug, Serialize, ToSchema)]
/// Roster or persisted rounds changed.
pub struct CollectionChangedEvent {
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// The whole data set was replaced (remote load or import).
pub struct DataReloadedEvent {
    pub source: String,
    pub players: usize,
    pub rounds: usize,
}
