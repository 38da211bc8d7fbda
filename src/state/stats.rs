//! Aggregation engine: pure computations over the score model.
//!
//! Nothing here mutates [`AppData`]; every function can be called as often as
//! a view needs it.

use std::cmp::Ordering;

use time::OffsetDateTime;

use crate::state::model::{
    AppData, COURSE_PAR, Course, HALF_COURSE_HOLES, HOLE_NAMES, HOLES, PAR, PlayerId, Round,
    RoundId, Slot,
};

/// Number of most recent rounds feeding a handicap.
pub const HANDICAP_WINDOW: usize = 10;
/// Entries kept on each leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Round `value` to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Running totals of one score sheet (or a slice of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundTotals {
    /// Sum of the recorded scores.
    pub total: i32,
    /// Number of holes with a recorded score.
    pub played: usize,
    /// `total` against par for the played holes.
    pub diff: i32,
}

impl RoundTotals {
    /// Totals over recorded slots only; unset slots are skipped, not counted as zero.
    pub fn from_slots(slots: &[Slot]) -> Self {
        let (total, played) = slots
            .iter()
            .flatten()
            .fold((0, 0), |(total, played), value| {
                (total + i32::from(*value), played + 1)
            });
        Self {
            total,
            played,
            diff: total - played as i32 * PAR,
        }
    }
}

/// Totals of a player's score sheet in `round`, or `None` if they did not play it.
pub fn round_totals(round: &Round, player_id: &str) -> Option<RoundTotals> {
    round.scores_of(player_id).map(RoundTotals::from_slots)
}

/// Totals of a player's score sheet restricted to one half of the course.
pub fn course_totals(round: &Round, player_id: &str, course: Course) -> Option<RoundTotals> {
    round
        .scores_of(player_id)
        .map(|slots| RoundTotals::from_slots(slots.get(course.slots()).unwrap_or_default()))
}

fn course_diff(round: &Round, player_id: &str) -> i32 {
    round_totals(round, player_id)
        .map(|totals| totals.total - COURSE_PAR)
        .unwrap_or_default()
}

fn window_handicap(rounds: &[&Round], player_id: &str) -> f64 {
    if rounds.is_empty() {
        return 0.0;
    }
    let sum: i32 = rounds
        .iter()
        .map(|round| course_diff(round, player_id))
        .sum();
    round1(f64::from(sum) / rounds.len() as f64)
}

/// Mean strokes over par across the player's last [`HANDICAP_WINDOW`] rounds.
///
/// Returns `0.0` for a player without rounds.
pub fn handicap(data: &AppData, player_id: &str) -> f64 {
    let rounds = data.player_rounds(player_id);
    let start = rounds.len().saturating_sub(HANDICAP_WINDOW);
    window_handicap(&rounds[start..], player_id)
}

/// Handicap as it stood after one of the player's rounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePoint {
    /// Date of the round.
    pub date: OffsetDateTime,
    /// Handicap over the trailing window ending at that round.
    pub handicap: f64,
}

/// One point per round played, oldest first, each over the trailing window ending there.
pub fn handicap_timeline(data: &AppData, player_id: &str) -> Vec<TimelinePoint> {
    let rounds = data.player_rounds(player_id);
    (0..rounds.len())
        .map(|index| {
            let start = (index + 1).saturating_sub(HANDICAP_WINDOW);
            TimelinePoint {
                date: rounds[index].date,
                handicap: window_handicap(&rounds[start..=index], player_id),
            }
        })
        .collect()
}

/// Career numbers of a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerAnalytics {
    /// Rounds played.
    pub rounds: usize,
    /// Mean total, one decimal.
    pub average: f64,
    /// Lowest total.
    pub best: i32,
    /// Highest total.
    pub worst: i32,
    /// Current handicap.
    pub handicap: f64,
}

/// Career numbers of a player, or `None` when they have no rounds yet.
pub fn player_analytics(data: &AppData, player_id: &str) -> Option<PlayerAnalytics> {
    let totals: Vec<i32> = data
        .player_rounds(player_id)
        .into_iter()
        .filter_map(|round| round_totals(round, player_id))
        .map(|totals| totals.total)
        .collect();

    let best = *totals.iter().min()?;
    let worst = *totals.iter().max()?;
    let sum: i32 = totals.iter().sum();

    Some(PlayerAnalytics {
        rounds: totals.len(),
        average: round1(f64::from(sum) / totals.len() as f64),
        best,
        worst,
        handicap: handicap(data, player_id),
    })
}

/// One (round, player) result as ranked on the leaderboards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Player the result belongs to.
    pub player_id: PlayerId,
    /// Display name (fallback label for removed players).
    pub player_name: String,
    /// Round the result comes from.
    pub round_id: RoundId,
    /// Date of that round.
    pub date: OffsetDateTime,
    /// Whole-course totals.
    pub overall: RoundTotals,
    /// Barred Owl totals.
    pub front: RoundTotals,
    /// Great Horned Owl totals.
    pub back: RoundTotals,
}

/// The three top lists, each sorted best (lowest) first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Leaderboards {
    /// Best whole-course totals.
    pub overall: Vec<LeaderboardEntry>,
    /// Best Barred Owl totals.
    pub front: Vec<LeaderboardEntry>,
    /// Best Great Horned Owl totals.
    pub back: Vec<LeaderboardEntry>,
}

/// Rank every recorded result. Ties keep the order rounds were recorded in.
pub fn leaderboards(data: &AppData) -> Leaderboards {
    let entries: Vec<LeaderboardEntry> = data
        .rounds
        .iter()
        .flat_map(|round| {
            round.scores.iter().map(move |(player_id, slots)| {
                let half = |course: Course| {
                    RoundTotals::from_slots(slots.get(course.slots()).unwrap_or_default())
                };
                LeaderboardEntry {
                    player_id: player_id.clone(),
                    player_name: data.player_name(player_id).to_string(),
                    round_id: round.id.clone(),
                    date: round.date,
                    overall: RoundTotals::from_slots(slots),
                    front: half(Course::BarredOwl),
                    back: half(Course::GreatHornedOwl),
                }
            })
        })
        .collect();

    let top = |key: fn(&LeaderboardEntry) -> i32| {
        let mut sorted = entries.clone();
        sorted.sort_by_key(key);
        sorted.truncate(LEADERBOARD_SIZE);
        sorted
    };

    Leaderboards {
        overall: top(|entry| entry.overall.total),
        front: top(|entry| entry.front.total),
        back: top(|entry| entry.back.total),
    }
}

/// How a single hole plays across every recorded score.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleDifficulty {
    /// 1-based hole number.
    pub hole: u8,
    /// Display name of the hole.
    pub name: &'static str,
    /// Half of the course the hole belongs to.
    pub course: Course,
    /// Number of recorded scores.
    pub samples: usize,
    /// Mean recorded score, `None` without samples.
    pub average: Option<f64>,
    /// `average` minus par, `None` without samples.
    pub diff: Option<f64>,
}

/// Per-hole averages ranked hardest first; holes without data come last.
pub fn course_difficulty(data: &AppData) -> Vec<HoleDifficulty> {
    let mut sums = [(0u32, 0usize); HOLES];
    for slots in data.rounds.iter().flat_map(|round| round.scores.values()) {
        for (index, value) in slots.iter().enumerate().take(HOLES) {
            if let Some(value) = value {
                sums[index].0 += u32::from(*value);
                sums[index].1 += 1;
            }
        }
    }

    let mut holes: Vec<HoleDifficulty> = sums
        .iter()
        .enumerate()
        .map(|(index, (sum, samples))| {
            let hole = (index + 1) as u8;
            let average = (*samples > 0).then(|| f64::from(*sum) / *samples as f64);
            HoleDifficulty {
                hole,
                name: HOLE_NAMES[index],
                course: Course::of(hole),
                samples: *samples,
                average,
                diff: average.map(|avg| avg - f64::from(PAR)),
            }
        })
        .collect();

    // `None` orders below every `Some`, so unplayed holes sink to the end.
    holes.sort_by(|a, b| b.diff.partial_cmp(&a.diff).unwrap_or(Ordering::Equal));
    holes
}

/// Result line of one participant on the round summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRoundResult {
    /// Participant.
    pub player_id: PlayerId,
    /// Display name (fallback label for removed players).
    pub name: String,
    /// Whole-course totals.
    pub overall: RoundTotals,
    /// Barred Owl total.
    pub front: i32,
    /// Great Horned Owl total.
    pub back: i32,
}

/// Outcome of a finished round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    /// Round being summarised.
    pub round_id: RoundId,
    /// Date of the round.
    pub date: OffsetDateTime,
    /// One line per participant, in selection order.
    pub results: Vec<PlayerRoundResult>,
    /// Every participant sharing the lowest diff.
    pub winners: Vec<String>,
}

/// Summarise a round: per-player totals and the winners.
pub fn round_summary(data: &AppData, round: &Round) -> RoundSummary {
    let results: Vec<PlayerRoundResult> = round
        .player_ids
        .iter()
        .map(|player_id| {
            let slots = round.scores_of(player_id).unwrap_or_default();
            let front = RoundTotals::from_slots(&slots[..HALF_COURSE_HOLES.min(slots.len())]);
            let back = RoundTotals::from_slots(slots.get(HALF_COURSE_HOLES..).unwrap_or_default());
            PlayerRoundResult {
                player_id: player_id.clone(),
                name: data.player_name(player_id).to_string(),
                overall: RoundTotals::from_slots(slots),
                front: front.total,
                back: back.total,
            }
        })
        .collect();

    let winners = results
        .iter()
        .map(|result| result.overall.diff)
        .min()
        .map(|best| {
            results
                .iter()
                .filter(|result| result.overall.diff == best)
                .map(|result| result.name.clone())
                .collect()
        })
        .unwrap_or_default();

    RoundSummary {
        round_id: round.id.clone(),
        date: round.date,
        results,
        winners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::fixtures::*;

    fn data_with_totals(player_id: &str, totals: &[i32]) -> AppData {
        AppData {
            players: vec![player(player_id, "Ravi")],
            rounds: totals
                .iter()
                .enumerate()
                .map(|(day, total)| {
                    round_with_total(&format!("r_{day}"), day as i64, player_id, *total)
                })
                .collect(),
        }
    }

    #[test]
    fn handicap_averages_diffs_to_one_decimal() {
        let data = data_with_totals("p_1", &[42, 38, 44]);
        assert_eq!(handicap(&data, "p_1"), 1.3);
    }

    #[test]
    fn handicap_is_zero_without_rounds() {
        let data = data_with_totals("p_1", &[]);
        assert_eq!(handicap(&data, "p_1"), 0.0);
    }

    #[test]
    fn handicap_only_uses_last_ten_rounds_by_date() {
        // Two terrible early rounds followed by ten rounds at par.
        let mut totals = vec![80, 80];
        totals.extend([40; 10]);
        let mut data = data_with_totals("p_1", &totals);
        // Storage order must not matter, only dates.
        data.rounds.reverse();
        assert_eq!(handicap(&data, "p_1"), 0.0);

        let data = data_with_totals("p_1", &[44, 36, 40, 42]);
        assert_eq!(handicap(&data, "p_1"), 0.5);
    }

    #[test]
    fn round_diff_matches_total_minus_course_par() {
        let round = complete_round("r_1", 0, &[("p_1", 47), ("p_2", 35)]);
        for player_id in ["p_1", "p_2"] {
            let totals = round_totals(&round, player_id).unwrap();
            assert_eq!(totals.played, HOLES);
            assert_eq!(totals.diff, totals.total - COURSE_PAR);
        }
        assert!(round_totals(&round, "p_3").is_none());
    }

    #[test]
    fn partial_totals_skip_unset_slots() {
        let mut round = Round::new("r_1".into(), EPOCH, vec!["p_1".into()]);
        let slots = round.scores.get_mut("p_1").unwrap();
        slots[0] = Some(3);
        slots[1] = Some(2);
        slots[2] = Some(1);
        let totals = round_totals(&round, "p_1").unwrap();
        assert_eq!(
            totals,
            RoundTotals {
                total: 6,
                played: 3,
                diff: 0
            }
        );
    }

    #[test]
    fn timeline_has_one_point_per_round_in_date_order() {
        let mut totals = vec![50; 3];
        totals.extend([40; 10]);
        let data = data_with_totals("p_1", &totals);
        let timeline = handicap_timeline(&data, "p_1");

        assert_eq!(timeline.len(), 13);
        assert!(timeline.windows(2).all(|pair| pair[0].date <= pair[1].date));
        assert_eq!(timeline[0].handicap, 10.0);
        assert_eq!(timeline[3].handicap, 7.5);
        // Window has slid past every bad round by the last point.
        assert_eq!(timeline[12].handicap, 0.0);
    }

    #[test]
    fn analytics_report_no_data_then_career_numbers() {
        let data = data_with_totals("p_1", &[]);
        assert!(player_analytics(&data, "p_1").is_none());

        let data = data_with_totals("p_1", &[42, 38, 44]);
        let analytics = player_analytics(&data, "p_1").unwrap();
        assert_eq!(analytics.rounds, 3);
        assert_eq!(analytics.average, 41.3);
        assert_eq!(analytics.best, 38);
        assert_eq!(analytics.worst, 44);
        assert_eq!(analytics.handicap, 1.3);
    }

    #[test]
    fn leaderboards_sort_ascending_and_keep_top_ten() {
        let data = data_with_totals("p_1", &[38, 42, 40]);
        let boards = leaderboards(&data);
        let overall: Vec<i32> = boards.overall.iter().map(|e| e.overall.total).collect();
        assert_eq!(overall, [38, 40, 42]);

        let data = data_with_totals("p_1", &[50; 12]);
        let boards = leaderboards(&data);
        assert_eq!(boards.overall.len(), LEADERBOARD_SIZE);
        // Stable: equal totals keep recording order.
        assert_eq!(boards.overall[0].round_id, "r_0");
        assert_eq!(boards.overall[9].round_id, "r_9");
    }

    #[test]
    fn leaderboards_rank_halves_independently() {
        let mut round_a = round_with_total("r_a", 0, "p_1", 40);
        let mut round_b = round_with_total("r_b", 1, "p_2", 40);
        // p_1 strong on the front, p_2 strong on the back.
        round_a.scores.get_mut("p_1").unwrap().copy_from_slice(&[
            vec![Some(1); 10],
            vec![Some(3); 10],
        ]
        .concat());
        round_b.scores.get_mut("p_2").unwrap().copy_from_slice(&[
            vec![Some(3); 10],
            vec![Some(1); 10],
        ]
        .concat());
        let data = AppData {
            players: vec![player("p_1", "Ravi")],
            rounds: vec![round_a, round_b],
        };

        let boards = leaderboards(&data);
        assert_eq!(boards.front[0].player_id, "p_1");
        assert_eq!(boards.front[0].front.total, 10);
        assert_eq!(boards.front[0].front.diff, -10);
        assert_eq!(boards.back[0].player_id, "p_2");
        assert_eq!(boards.back[0].back.total, 10);
        // Removed players still show up under the fallback label.
        assert_eq!(boards.back[0].player_name, "Player");
    }

    #[test]
    fn course_difficulty_ranks_hardest_first_and_empty_last() {
        let mut round = Round::new("r_1".into(), EPOCH, vec!["p_1".into(), "p_2".into()]);
        {
            let p1 = round.scores.get_mut("p_1").unwrap();
            p1[0] = Some(2);
            p1[1] = Some(2);
        }
        {
            let p2 = round.scores.get_mut("p_2").unwrap();
            p2[0] = Some(3);
            p2[1] = Some(2);
        }
        let mut second = Round::new("r_2".into(), EPOCH, vec!["p_1".into(), "p_2".into()]);
        second.scores.get_mut("p_1").unwrap()[0] = Some(2);
        second.scores.get_mut("p_2").unwrap()[0] = Some(4);
        // Hole 3 averages 2.2 over five samples.
        let mut third = Round::new("r_3".into(), EPOCH, vec!["p_1".into()]);
        third.scores.get_mut("p_1").unwrap()[2] = Some(3);
        let fillers: Vec<Round> = (0..4)
            .map(|index| {
                let mut filler = Round::new(format!("r_f{index}"), EPOCH, vec!["p_1".into()]);
                filler.scores.get_mut("p_1").unwrap()[2] = Some(2);
                filler
            })
            .collect();

        let mut rounds = vec![round, second, third];
        rounds.extend(fillers);
        let data = AppData {
            players: vec![],
            rounds,
        };

        let stats = course_difficulty(&data);
        assert_eq!(stats.len(), HOLES);

        let hole1 = &stats[0];
        assert_eq!(hole1.hole, 1);
        assert_eq!(hole1.samples, 4);
        assert_eq!(hole1.average, Some(2.75));
        assert_eq!(hole1.diff, Some(0.75));

        let hole3 = &stats[1];
        assert_eq!(hole3.hole, 3);
        assert!((hole3.diff.unwrap() - 0.2).abs() < 1e-9);

        let hole2 = &stats[2];
        assert_eq!(hole2.hole, 2);
        assert_eq!(hole2.diff, Some(0.0));

        assert!(stats[3..].iter().all(|hole| hole.average.is_none()));
        assert_eq!(stats[3].hole, 4);
        assert_eq!(stats[19].hole, 20);
    }

    #[test]
    fn summary_lists_every_player_and_ties_for_the_win() {
        let round = complete_round("r_1", 0, &[("p_1", 42), ("p_2", 38), ("p_3", 38)]);
        let data = AppData {
            players: vec![player("p_1", "Ravi"), player("p_2", "Mia")],
            rounds: vec![],
        };

        let summary = round_summary(&data, &round);
        assert_eq!(summary.results.len(), 3);
        assert_eq!(summary.results[0].overall.diff, 2);
        assert_eq!(
            summary.results[0].front + summary.results[0].back,
            summary.results[0].overall.total
        );
        assert_eq!(summary.winners, ["Mia", "Player"]);
    }
}
