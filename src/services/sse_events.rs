use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        phase::VisiblePhase,
        round::RoundSummaryResponse,
        sse::{
            CollectionChangedEvent, DataReloadedEvent, PhaseChangedEvent, RoundFinalizedEvent,
            RoundUpdatedEvent, ServerEvent, SystemStatus,
        },
    },
    state::{SharedState, model::AppData, session::RoundSession},
};

const EVENT_SYSTEM_STATUS: &str = "system_status";
const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_ROUND_UPDATED: &str = "round.updated";
const EVENT_ROUND_FINALIZED: &str = "round.finalized";
const EVENT_PLAYERS_UPDATED: &str = "players.updated";
const EVENT_ROUNDS_UPDATED: &str = "rounds.updated";
const EVENT_DATA_RELOADED: &str = "data.reloaded";

/// Broadcast the degraded flag after it changed.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Broadcast the scoring phase as it stands now.
pub async fn broadcast_phase_changed(state: &SharedState) {
    let snapshot = state.snapshot().await;
    let round_id = state
        .current_round()
        .read()
        .await
        .as_ref()
        .map(|session| session.round().id.clone());
    let payload = PhaseChangedEvent {
        phase: VisiblePhase::from(&snapshot),
        round_id,
    };
    send_event(state, EVENT_PHASE_CHANGED, &payload);
}

/// Broadcast that the working round changed and views should re-render.
pub fn broadcast_round_updated(state: &SharedState, session: &RoundSession) {
    let round = session.round();
    let payload = RoundUpdatedEvent {
        round_id: round.id.clone(),
        current_hole: round.current_hole,
        complete: session.is_complete(),
    };
    send_event(state, EVENT_ROUND_UPDATED, &payload);
}

/// Broadcast the summary of a freshly saved round.
pub fn broadcast_round_finalized(state: &SharedState, summary: RoundSummaryResponse) {
    send_event(state, EVENT_ROUND_FINALIZED, &RoundFinalizedEvent(summary));
}

/// Broadcast that the roster changed.
pub fn broadcast_players_updated(state: &SharedState, count: usize) {
    send_event(state, EVENT_PLAYERS_UPDATED, &CollectionChangedEvent { count });
}

/// Broadcast that the persisted rounds changed.
pub fn broadcast_rounds_updated(state: &SharedState, count: usize) {
    send_event(state, EVENT_ROUNDS_UPDATED, &CollectionChangedEvent { count });
}

/// Broadcast that the whole data set was replaced.
pub fn broadcast_data_reloaded(state: &SharedState, source: &str, data: &AppData) {
    let payload = DataReloadedEvent {
        source: source.to_string(),
        players: data.players.len(),
        rounds: data.rounds.len(),
    };
    send_event(state, EVENT_DATA_RELOADED, &payload);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
