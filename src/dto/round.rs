use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{format_date, format_diff, phase::VisiblePhase},
    state::{
        model::{AppData, Course, HOLES, PAR, Round, hole_name},
        session::{Direction, RoundSession},
        stats::{self, RoundSummary, RoundTotals},
    },
};

/// Payload opening a new round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartRoundRequest {
    /// Participants in display order.
    #[validate(length(min = 1, message = "select at least one player"))]
    pub player_ids: Vec<String>,
}

/// Score entered from the hole buttons or a scorecard cell.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetScoreRequest {
    pub player_id: String,
    /// 0-based hole index.
    pub hole_index: i64,
    pub value: i64,
}

/// Hole navigation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub direction: Direction,
}

/// Running totals of a score sheet.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TotalsDto {
    pub total: i32,
    pub played: usize,
    pub diff: i32,
    pub diff_label: String,
}

impl From<RoundTotals> for TotalsDto {
    fn from(value: RoundTotals) -> Self {
        Self {
            total: value.total,
            played: value.played,
            diff: value.diff,
            diff_label: format_diff(f64::from(value.diff), 0),
        }
    }
}

/// Banner line and button state for one participant on the hole screen.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundPlayerView {
    pub player_id: String,
    pub name: String,
    pub totals: TotalsDto,
    /// Score selected for the current hole.
    pub current_score: Option<u8>,
}

/// Portrait hole-by-hole view of the working round.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundView {
    pub id: String,
    pub date: String,
    pub phase: VisiblePhase,
    /// Persisted round that finalizing will replace.
    pub editing: Option<String>,
    pub current_hole: u8,
    /// `Hole 3/20`.
    pub hole_label: String,
    pub course: Course,
    pub course_name: String,
    pub hole_name: String,
    pub par: i32,
    pub players: Vec<RoundPlayerView>,
    /// Every slot set; the save button is enabled.
    pub complete: bool,
    pub auto_advance_pending: bool,
}

impl RoundView {
    pub fn build(data: &AppData, session: &RoundSession, phase: VisiblePhase) -> Self {
        let round = session.round();
        let hole = round.current_hole;
        let index = usize::from(hole.saturating_sub(1));
        let course = Course::of(hole);

        let players = round
            .player_ids
            .iter()
            .map(|player_id| RoundPlayerView {
                player_id: player_id.clone(),
                name: data.player_name(player_id).to_string(),
                totals: stats::round_totals(round, player_id)
                    .unwrap_or_default()
                    .into(),
                current_score: round
                    .scores_of(player_id)
                    .and_then(|slots| slots.get(index).copied().flatten()),
            })
            .collect();

        Self {
            id: round.id.clone(),
            date: format_date(round.date),
            phase,
            editing: session.editing().map(str::to_string),
            current_hole: hole,
            hole_label: format!("Hole {hole}/{HOLES}"),
            course,
            course_name: course.name().to_string(),
            hole_name: hole_name(hole).unwrap_or_default().to_string(),
            par: PAR,
            players,
            complete: session.is_complete(),
            auto_advance_pending: session.pending_advance().is_some(),
        }
    }
}

/// Highlight of a scorecard cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMark {
    Ace,
    Birdie,
    Bogey,
}

impl ScoreMark {
    pub fn of(score: Option<u8>) -> Option<Self> {
        match score? {
            1 => Some(ScoreMark::Ace),
            2 => Some(ScoreMark::Birdie),
            value if i32::from(value) > PAR => Some(ScoreMark::Bogey),
            _ => None,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardCell {
    pub hole_index: usize,
    pub score: Option<u8>,
    pub mark: Option<ScoreMark>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardRow {
    pub player_id: String,
    pub name: String,
    pub cells: Vec<ScorecardCell>,
    pub front: TotalsDto,
    pub back: TotalsDto,
    pub overall: TotalsDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardHole {
    pub hole: u8,
    pub name: String,
    pub course: Course,
    pub par: i32,
}

/// Landscape full-grid view of the working round.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardView {
    pub round_id: String,
    pub current_hole: u8,
    pub holes: Vec<ScorecardHole>,
    pub rows: Vec<ScorecardRow>,
    pub complete: bool,
}

impl ScorecardView {
    pub fn build(data: &AppData, round: &Round) -> Self {
        let holes = (1..=HOLES as u8)
            .map(|hole| ScorecardHole {
                hole,
                name: hole_name(hole).unwrap_or_default().to_string(),
                course: Course::of(hole),
                par: PAR,
            })
            .collect();

        let rows = round
            .player_ids
            .iter()
            .map(|player_id| {
                let totals = |course: Option<Course>| -> TotalsDto {
                    let totals = match course {
                        Some(course) => stats::course_totals(round, player_id, course),
                        None => stats::round_totals(round, player_id),
                    };
                    totals.unwrap_or_default().into()
                };
                ScorecardRow {
                    player_id: player_id.clone(),
                    name: data.player_name(player_id).to_string(),
                    cells: round
                        .scores_of(player_id)
                        .unwrap_or_default()
                        .iter()
                        .enumerate()
                        .map(|(hole_index, score)| ScorecardCell {
                            hole_index,
                            score: *score,
                            mark: ScoreMark::of(*score),
                        })
                        .collect(),
                    front: totals(Some(Course::BarredOwl)),
                    back: totals(Some(Course::GreatHornedOwl)),
                    overall: totals(None),
                }
            })
            .collect();

        Self {
            round_id: round.id.clone(),
            current_hole: round.current_hole,
            holes,
            rows,
            complete: round.is_complete(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerResultDto {
    pub player_id: String,
    pub name: String,
    pub total: i32,
    pub diff: i32,
    pub diff_label: String,
    pub front: i32,
    pub back: i32,
}

/// Result screen shown after finalizing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundSummaryResponse {
    pub round_id: String,
    pub date: String,
    pub players: Vec<PlayerResultDto>,
    /// Every participant sharing the lowest diff.
    pub winners: Vec<String>,
}

impl From<RoundSummary> for RoundSummaryResponse {
    fn from(value: RoundSummary) -> Self {
        Self {
            round_id: value.round_id,
            date: format_date(value.date),
            players: value
                .results
                .into_iter()
                .map(|result| PlayerResultDto {
                    player_id: result.player_id,
                    name: result.name,
                    total: result.overall.total,
                    diff: result.overall.diff,
                    diff_label: format_diff(f64::from(result.overall.diff), 0),
                    front: result.front,
                    back: result.back,
                })
                .collect(),
            winners: value.winners,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryPlayerDto {
    pub player_id: String,
    pub name: String,
    pub total: i32,
    pub diff: i32,
    pub diff_label: String,
}

/// One persisted round on the history screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntry {
    pub id: String,
    pub date: String,
    pub players: Vec<HistoryPlayerDto>,
}

impl HistoryEntry {
    pub fn build(data: &AppData, round: &Round) -> Self {
        Self {
            id: round.id.clone(),
            date: format_date(round.date),
            players: round
                .scores
                .keys()
                .map(|player_id| {
                    let totals = stats::round_totals(round, player_id).unwrap_or_default();
                    HistoryPlayerDto {
                        player_id: player_id.clone(),
                        name: data.player_name(player_id).to_string(),
                        total: totals.total,
                        diff: totals.diff,
                        diff_label: format_diff(f64::from(totals.diff), 0),
                    }
                })
                .collect(),
        }
    }
}
