use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{format_diff, validation::validate_player_name},
    state::model::{AppData, Player},
    state::stats,
};

/// Payload registering a new player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePlayerRequest {
    #[validate(custom(function = "validate_player_name"))]
    pub name: String,
}

/// Roster entry with the player's current handicap.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    /// Mean strokes over par across the last ten rounds.
    pub handicap: f64,
    /// `handicap` formatted for display (`+1.3`, `E`, `-0.5`).
    pub handicap_label: String,
}

impl PlayerSummary {
    pub fn build(data: &AppData, player: &Player) -> Self {
        let handicap = stats::handicap(data, &player.id);
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            handicap,
            handicap_label: format_diff(handicap, 1),
        }
    }
}
