use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::{
    dto::{format_date, format_diff},
    state::{
        model::Course,
        stats::{HoleDifficulty, LeaderboardEntry, Leaderboards, PlayerAnalytics, TimelinePoint},
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct TimelinePointDto {
    pub date: String,
    pub handicap: f64,
}

impl From<TimelinePoint> for TimelinePointDto {
    fn from(value: TimelinePoint) -> Self {
        Self {
            date: format_date(value.date),
            handicap: value.handicap,
        }
    }
}

/// Career numbers of a player; `stats` is absent when they have no rounds yet.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerAnalyticsResponse {
    pub player_id: String,
    pub name: String,
    pub has_data: bool,
    pub stats: Option<AnalyticsDto>,
    pub timeline: Vec<TimelinePointDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsDto {
    pub rounds: usize,
    pub average: f64,
    pub best: i32,
    pub worst: i32,
    pub handicap: f64,
    pub handicap_label: String,
}

impl From<PlayerAnalytics> for AnalyticsDto {
    fn from(value: PlayerAnalytics) -> Self {
        Self {
            rounds: value.rounds,
            average: value.average,
            best: value.best,
            worst: value.worst,
            handicap: value.handicap,
            handicap_label: format_diff(value.handicap, 1),
        }
    }
}

/// One ranked (round, player) result.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntryDto {
    pub player_id: String,
    pub player_name: String,
    pub round_id: String,
    pub date: String,
    pub total: i32,
    pub diff: i32,
    pub front: i32,
    pub front_diff: i32,
    pub back: i32,
    pub back_diff: i32,
}

impl From<LeaderboardEntry> for LeaderboardEntryDto {
    fn from(value: LeaderboardEntry) -> Self {
        Self {
            player_id: value.player_id,
            player_name: value.player_name,
            round_id: value.round_id,
            date: format_date(value.date),
            total: value.overall.total,
            diff: value.overall.diff,
            front: value.front.total,
            front_diff: value.front.diff,
            back: value.back.total,
            back_diff: value.back.diff,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardsResponse {
    pub overall: Vec<LeaderboardEntryDto>,
    /// Barred Owl (holes 1-10).
    pub front: Vec<LeaderboardEntryDto>,
    /// Great Horned Owl (holes 11-20).
    pub back: Vec<LeaderboardEntryDto>,
}

impl From<Leaderboards> for LeaderboardsResponse {
    fn from(value: Leaderboards) -> Self {
        let convert = |entries: Vec<LeaderboardEntry>| -> Vec<LeaderboardEntryDto> {
            entries.into_iter().map(Into::into).collect()
        };
        Self {
            overall: convert(value.overall),
            front: convert(value.front),
            back: convert(value.back),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct HoleDifficultyDto {
    pub hole: u8,
    pub name: String,
    pub course: Course,
    pub samples: usize,
    pub average: Option<f64>,
    pub diff: Option<f64>,
    pub diff_label: Option<String>,
}

impl From<HoleDifficulty> for HoleDifficultyDto {
    fn from(value: HoleDifficulty) -> Self {
        Self {
            hole: value.hole,
            name: value.name.to_string(),
            course: value.course,
            samples: value.samples,
            average: value.average,
            diff: value.diff,
            diff_label: value.diff.map(|diff| format_diff(diff, 2)),
        }
    }
}
