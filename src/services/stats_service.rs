use crate::{
    dto::{
        round::HistoryEntry,
        stats::{
            HoleDifficultyDto, LeaderboardsResponse, PlayerAnalyticsResponse, TimelinePointDto,
        },
    },
    error::ServiceError,
    state::{SharedState, stats},
};

/// Persisted rounds, newest first.
pub async fn history(state: &SharedState) -> Vec<HistoryEntry> {
    state
        .read_data(|data| {
            data.rounds
                .iter()
                .rev()
                .map(|round| HistoryEntry::build(data, round))
                .collect()
        })
        .await
}

/// Career numbers and handicap timeline of one player.
pub async fn analytics(
    state: &SharedState,
    player_id: &str,
) -> Result<PlayerAnalyticsResponse, ServiceError> {
    state
        .read_data(|data| {
            let player = data
                .player(player_id)
                .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` not found")))?;
            let stats = stats::player_analytics(data, player_id);
            Ok(PlayerAnalyticsResponse {
                player_id: player.id.clone(),
                name: player.name.clone(),
                has_data: stats.is_some(),
                stats: stats.map(Into::into),
                timeline: stats::handicap_timeline(data, player_id)
                    .into_iter()
                    .map(TimelinePointDto::from)
                    .collect(),
            })
        })
        .await
}

pub async fn leaderboards(state: &SharedState) -> LeaderboardsResponse {
    state
        .read_data(|data| stats::leaderboards(data).into())
        .await
}

/// Holes ranked hardest first; holes nobody has played yet come last.
pub async fn course_difficulty(state: &SharedState) -> Vec<HoleDifficultyDto> {
    state
        .read_data(|data| {
            stats::course_difficulty(data)
                .into_iter()
                .map(Into::into)
                .collect()
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        model::{AppData, fixtures::*},
        testing::state_with,
    };

    fn sample() -> AppData {
        AppData {
            players: vec![player("p_1", "Ravi"), player("p_2", "Mia")],
            rounds: vec![
                round_with_total("r_1", 0, "p_1", 42),
                round_with_total("r_2", 1, "p_1", 38),
                round_with_total("r_3", 2, "p_1", 40),
            ],
        }
    }

    #[tokio::test]
    async fn history_lists_newest_first() {
        let (state, _) = state_with(sample());
        let ids: Vec<_> = history(&state).await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["r_3", "r_2", "r_1"]);
    }

    #[tokio::test]
    async fn analytics_distinguish_unknown_and_idle_players() {
        let (state, _) = state_with(sample());
        assert!(matches!(
            analytics(&state, "p_9").await,
            Err(ServiceError::NotFound(_))
        ));

        let idle = analytics(&state, "p_2").await.unwrap();
        assert!(!idle.has_data);
        assert!(idle.stats.is_none());
        assert!(idle.timeline.is_empty());

        let ravi = analytics(&state, "p_1").await.unwrap();
        let stats = ravi.stats.unwrap();
        assert_eq!(stats.rounds, 3);
        assert_eq!(stats.best, 38);
        assert_eq!(stats.worst, 42);
        assert_eq!(ravi.timeline.len(), 3);
    }

    #[tokio::test]
    async fn leaderboard_ranks_lowest_first() {
        let (state, _) = state_with(sample());
        let boards = leaderboards(&state).await;
        let totals: Vec<_> = boards.overall.iter().map(|e| e.total).collect();
        assert_eq!(totals, [38, 40, 42]);
    }

    #[tokio::test]
    async fn every_hole_is_reported() {
        let (state, _) = state_with(AppData::default());
        let holes = course_difficulty(&state).await;
        assert_eq!(holes.len(), 20);
        assert!(holes.iter().all(|hole| hole.average.is_none()));
    }
}
