//! Score model: players, rounds, the per-hole score grid and the fixed course layout.

use std::{collections::HashSet, ops::Range};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Expected strokes per hole.
pub const PAR: i32 = 2;
/// Number of holes on the course.
pub const HOLES: usize = 20;
/// Expected strokes for a full round.
pub const COURSE_PAR: i32 = PAR * HOLES as i32;
/// Holes in each half of the course.
pub const HALF_COURSE_HOLES: usize = HOLES / 2;
/// Lowest score accepted for a hole.
pub const MIN_SCORE: u8 = 1;
/// Highest score accepted for a hole.
pub const MAX_SCORE: u8 = 10;
/// Label used when a round references a player that is no longer in the roster.
pub const FALLBACK_PLAYER_NAME: &str = "Player";

/// Display names of the holes, in course order.
pub const HOLE_NAMES: [&str; HOLES] = [
    "First Flight",
    "Arrow Line",
    "Hunter’s Hook",
    "Rising Edge",
    "Gravity Glide",
    "Climbing Turn",
    "The Drop Point",
    "Gauntlet Ridge",
    "Perch Line",
    "Switchback",
    "Moon Curve",
    "The Ascent",
    "Silent Path",
    "Hollow Ridge",
    "The Horseshoe",
    "Reverse Shoe",
    "Second Ridge",
    "True North",
    "Slope Run",
    "Home Roost",
];

/// Identifier of a player (`p_<millis>`).
pub type PlayerId = String;
/// Identifier of a round (`r_<millis>`).
pub type RoundId = String;
/// One hole's recorded score for one player; `None` while the hole is unplayed.
pub type Slot = Option<u8>;

/// The two halves of the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Course {
    /// Holes 1 to 10.
    BarredOwl,
    /// Holes 11 to 20.
    GreatHornedOwl,
}

impl Course {
    /// Course half a 1-based hole number belongs to.
    pub fn of(hole: u8) -> Self {
        if usize::from(hole) <= HALF_COURSE_HOLES {
            Course::BarredOwl
        } else {
            Course::GreatHornedOwl
        }
    }

    /// Display name of the course half.
    pub fn name(self) -> &'static str {
        match self {
            Course::BarredOwl => "Barred Owl",
            Course::GreatHornedOwl => "Great Horned Owl",
        }
    }

    /// Zero-based slot indexes covered by this half.
    pub fn slots(self) -> Range<usize> {
        match self {
            Course::BarredOwl => 0..HALF_COURSE_HOLES,
            Course::GreatHornedOwl => HALF_COURSE_HOLES..HOLES,
        }
    }
}

/// Display name of a 1-based hole number.
pub fn hole_name(hole: u8) -> Option<&'static str> {
    usize::from(hole)
        .checked_sub(1)
        .and_then(|index| HOLE_NAMES.get(index))
        .copied()
}

/// Whether `value` is an acceptable hole score.
pub fn is_valid_score(value: i64) -> bool {
    (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&value)
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier.
    pub id: PlayerId,
    /// Display name, fixed after creation.
    pub name: String,
}

/// One play-through of the course by a fixed set of players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Unique identifier.
    pub id: RoundId,
    /// When the round was started.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Participants in selection order.
    pub player_ids: Vec<PlayerId>,
    /// 1-based hole currently shown while the round is in progress.
    pub current_hole: u8,
    /// Score sheet of every participant, [`HOLES`] slots each.
    pub scores: IndexMap<PlayerId, Vec<Slot>>,
}

impl Round {
    /// Create an empty round on hole 1 with every slot unset.
    pub fn new(id: RoundId, date: OffsetDateTime, player_ids: Vec<PlayerId>) -> Self {
        let scores = player_ids
            .iter()
            .map(|id| (id.clone(), vec![None; HOLES]))
            .collect();
        Self {
            id,
            date,
            player_ids,
            current_hole: 1,
            scores,
        }
    }

    /// Score sheet of a participant.
    pub fn scores_of(&self, player_id: &str) -> Option<&[Slot]> {
        self.scores.get(player_id).map(Vec::as_slice)
    }

    /// Whether `player_id` takes part in this round.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }

    /// True when every participant has a score on every hole.
    pub fn is_complete(&self) -> bool {
        self.player_ids.iter().all(|id| {
            self.scores_of(id).is_some_and(|slots| {
                slots.len() == HOLES && slots.iter().all(Option::is_some)
            })
        })
    }

    /// True when every participant has a score on the given zero-based hole.
    pub fn hole_scored_by_all(&self, hole_index: usize) -> bool {
        self.player_ids.iter().all(|id| {
            self.scores_of(id)
                .and_then(|slots| slots.get(hole_index))
                .is_some_and(Option::is_some)
        })
    }

    /// True when any score sheet in the round still has an unset slot.
    pub fn has_unset_slot(&self) -> bool {
        self.scores
            .values()
            .any(|slots| slots.iter().any(Option::is_none))
    }

    /// Check the structural invariants of a round read from outside the process.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let round_id = || self.id.clone();

        if self.player_ids.is_empty() {
            return Err(InvariantError::EmptyRound {
                round_id: round_id(),
            });
        }

        if !(1..=HOLES as u8).contains(&self.current_hole) {
            return Err(InvariantError::HoleOutOfRange {
                round_id: round_id(),
                hole: self.current_hole,
            });
        }

        let mut seen = HashSet::new();
        for player_id in &self.player_ids {
            if !seen.insert(player_id.as_str()) {
                return Err(InvariantError::DuplicateParticipant {
                    round_id: round_id(),
                    player_id: player_id.clone(),
                });
            }
            if !self.scores.contains_key(player_id) {
                return Err(InvariantError::MissingScores {
                    round_id: round_id(),
                    player_id: player_id.clone(),
                });
            }
        }

        for (player_id, slots) in &self.scores {
            if !seen.contains(player_id.as_str()) {
                return Err(InvariantError::UnexpectedScores {
                    round_id: round_id(),
                    player_id: player_id.clone(),
                });
            }
            if slots.len() != HOLES {
                return Err(InvariantError::SlotCount {
                    round_id: round_id(),
                    player_id: player_id.clone(),
                    len: slots.len(),
                });
            }
            if let Some((index, value)) = slots.iter().enumerate().find_map(|(index, slot)| {
                slot.filter(|value| !is_valid_score(i64::from(*value)))
                    .map(|value| (index, value))
            }) {
                return Err(InvariantError::ScoreOutOfRange {
                    round_id: round_id(),
                    player_id: player_id.clone(),
                    hole: index + 1,
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Everything the tracker knows: the roster and the finalized rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppData {
    /// Registered players, unique by id.
    #[serde(default)]
    pub players: Vec<Player>,
    /// Finalized rounds in the order they were recorded.
    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl AppData {
    /// Look up a player by id.
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Display name of a player, or [`FALLBACK_PLAYER_NAME`] when the id is unknown.
    pub fn player_name(&self, id: &str) -> &str {
        self.player(id)
            .map(|player| player.name.as_str())
            .unwrap_or(FALLBACK_PLAYER_NAME)
    }

    /// Look up a finalized round by id.
    pub fn round(&self, id: &str) -> Option<&Round> {
        self.rounds.iter().find(|round| round.id == id)
    }

    /// Rounds the player took part in, oldest first.
    pub fn player_rounds(&self, player_id: &str) -> Vec<&Round> {
        let mut rounds: Vec<&Round> = self
            .rounds
            .iter()
            .filter(|round| round.scores.contains_key(player_id))
            .collect();
        rounds.sort_by_key(|round| round.date);
        rounds
    }

    /// False while any stored round still has an unset slot.
    pub fn is_publishable(&self) -> bool {
        !self.rounds.iter().any(Round::has_unset_slot)
    }

    /// Fresh player identifier derived from `now`, unique within the roster.
    pub fn next_player_id(&self, now: OffsetDateTime) -> PlayerId {
        unique_id("p_", now, |candidate| self.player(candidate).is_some())
    }

    /// Fresh round identifier derived from `now`, unique within the stored rounds.
    pub fn next_round_id(&self, now: OffsetDateTime) -> RoundId {
        unique_id("r_", now, |candidate| self.round(candidate).is_some())
    }

    /// Check roster and round invariants of data read from outside the process.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut player_ids = HashSet::new();
        for player in &self.players {
            if !player_ids.insert(player.id.as_str()) {
                return Err(InvariantError::DuplicatePlayer(player.id.clone()));
            }
        }

        let mut round_ids = HashSet::new();
        for round in &self.rounds {
            if !round_ids.insert(round.id.as_str()) {
                return Err(InvariantError::DuplicateRound(round.id.clone()));
            }
            round.validate()?;
        }

        Ok(())
    }
}

fn unique_id(prefix: &str, now: OffsetDateTime, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = now.unix_timestamp_nanos() / 1_000_000;
    loop {
        let candidate = format!("{prefix}{millis}");
        if !taken(&candidate) {
            return candidate;
        }
        millis += 1;
    }
}

/// Broken invariant found while validating externally supplied data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// Two players share an id.
    #[error("duplicate player id `{0}`")]
    DuplicatePlayer(PlayerId),
    /// Two rounds share an id.
    #[error("duplicate round id `{0}`")]
    DuplicateRound(RoundId),
    /// Round without participants.
    #[error("round `{round_id}` has no players")]
    EmptyRound { round_id: RoundId },
    /// Participant listed twice.
    #[error("round `{round_id}` lists player `{player_id}` twice")]
    DuplicateParticipant {
        round_id: RoundId,
        player_id: PlayerId,
    },
    /// Participant without a score sheet.
    #[error("round `{round_id}` has no score sheet for player `{player_id}`")]
    MissingScores {
        round_id: RoundId,
        player_id: PlayerId,
    },
    /// Score sheet for someone who is not a participant.
    #[error("round `{round_id}` has a score sheet for non-participant `{player_id}`")]
    UnexpectedScores {
        round_id: RoundId,
        player_id: PlayerId,
    },
    /// Score sheet with the wrong number of holes.
    #[error("round `{round_id}` has {len} slots for player `{player_id}`, expected {expected}", expected = HOLES)]
    SlotCount {
        round_id: RoundId,
        player_id: PlayerId,
        len: usize,
    },
    /// Recorded score outside the accepted range.
    #[error("round `{round_id}` has score {value} on hole {hole} for player `{player_id}`")]
    ScoreOutOfRange {
        round_id: RoundId,
        player_id: PlayerId,
        hole: usize,
        value: u8,
    },
    /// Current hole outside the course.
    #[error("round `{round_id}` is on hole {hole}, outside the course")]
    HoleOutOfRange { round_id: RoundId, hole: u8 },
}
