use time::OffsetDateTime;
use tracing::info;
use validator::Validate;

use crate::{
    dto::player::{CreatePlayerRequest, PlayerSummary},
    error::ServiceError,
    services::{sse_events::broadcast_players_updated, sync_service::commit_data},
    state::{SharedState, model::Player},
};

/// Roster with each player's current handicap, in registration order.
pub async fn list_players(state: &SharedState) -> Vec<PlayerSummary> {
    state
        .read_data(|data| {
            data.players
                .iter()
                .map(|player| PlayerSummary::build(data, player))
                .collect()
        })
        .await
}

/// Register a new player under a fresh `p_` id.
pub async fn add_player(
    state: &SharedState,
    request: CreatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    request.validate()?;
    let name = request.name.trim().to_string();
    let now = OffsetDateTime::now_utc();

    let (summary, count) = commit_data(state, |data| {
        let player = Player {
            id: data.next_player_id(now),
            name,
        };
        data.players.push(player.clone());
        Ok((PlayerSummary::build(data, &player), data.players.len()))
    })
    .await?;

    info!(player_id = %summary.id, name = %summary.name, "player added");
    broadcast_players_updated(state, count);
    Ok(summary)
}
