use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::model::{
    AppData, HOLES, MAX_SCORE, MIN_SCORE, PlayerId, Round, RoundId, is_valid_score,
};

/// Errors raised by operations on the working round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No round is currently being played or edited.
    #[error("no round in progress")]
    NoActiveRound,
    /// Score outside the accepted range.
    #[error("score {value} is outside {min}..={max}", min = MIN_SCORE, max = MAX_SCORE)]
    ScoreOutOfRange { value: i64 },
    /// Hole index outside the score sheet.
    #[error("hole index {index} is outside 0..={last}", last = HOLES - 1)]
    HoleOutOfRange { index: i64 },
    /// Player is not taking part in the round.
    #[error("player {player_id} is not part of this round")]
    NotParticipant { player_id: PlayerId },
    /// Player is not in the roster.
    #[error("unknown player {player_id}")]
    UnknownPlayer { player_id: PlayerId },
    /// Finalize attempted with unset slots left.
    #[error("round is not complete yet")]
    Incomplete,
    /// Round started without any player.
    #[error("select at least one player")]
    EmptySelection,
    /// Same player selected twice.
    #[error("player {player_id} selected twice")]
    DuplicatePlayer { player_id: PlayerId },
}

/// Hole navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// One hole back.
    Prev,
    /// One hole forward.
    Next,
}

/// Move to the next hole, scheduled once everybody has scored the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    /// Token identifying this schedule; a newer one supersedes it.
    pub id: Uuid,
    /// Hole the round was on when the advance was scheduled.
    pub from_hole: u8,
}

/// Working copy of the round being played or edited.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSession {
    round: Round,
    editing: Option<RoundId>,
    pending_advance: Option<PendingAdvance>,
}

impl RoundSession {
    /// Open a fresh round for the selected players.
    pub fn start(
        data: &AppData,
        id: RoundId,
        date: OffsetDateTime,
        player_ids: Vec<PlayerId>,
    ) -> Result<Self, SessionError> {
        if player_ids.is_empty() {
            return Err(SessionError::EmptySelection);
        }
        for (index, player_id) in player_ids.iter().enumerate() {
            if player_ids[..index].contains(player_id) {
                return Err(SessionError::DuplicatePlayer {
                    player_id: player_id.clone(),
                });
            }
            if data.player(player_id).is_none() {
                return Err(SessionError::UnknownPlayer {
                    player_id: player_id.clone(),
                });
            }
        }

        Ok(Self {
            round: Round::new(id, date, player_ids),
            editing: None,
            pending_advance: None,
        })
    }

    /// Reopen a persisted round; committing replaces it in place.
    pub fn edit(round: &Round) -> Self {
        Self {
            editing: Some(round.id.clone()),
            round: round.clone(),
            pending_advance: None,
        }
    }

    /// The working round.
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Id of the persisted round being edited, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Currently scheduled advance.
    pub fn pending_advance(&self) -> Option<PendingAdvance> {
        self.pending_advance
    }

    /// Record `value` for `player_id` at `hole_index` (0-based).
    ///
    /// On success returns the advance to schedule when every participant has
    /// now scored the current hole.
    pub fn set_score(
        &mut self,
        player_id: &str,
        hole_index: i64,
        value: i64,
    ) -> Result<Option<PendingAdvance>, SessionError> {
        if !is_valid_score(value) {
            return Err(SessionError::ScoreOutOfRange { value });
        }
        let index = usize::try_from(hole_index)
            .ok()
            .filter(|index| *index < HOLES)
            .ok_or(SessionError::HoleOutOfRange { index: hole_index })?;
        let slots = self.round.scores.get_mut(player_id).ok_or_else(|| {
            SessionError::NotParticipant {
                player_id: player_id.to_string(),
            }
        })?;
        let slot = slots
            .get_mut(index)
            .ok_or(SessionError::HoleOutOfRange { index: hole_index })?;
        *slot = Some(value as u8);

        let current = self.round.current_hole;
        let current_index = usize::from(current.saturating_sub(1));
        if usize::from(current) < HOLES && self.round.hole_scored_by_all(current_index) {
            let advance = PendingAdvance {
                id: Uuid::new_v4(),
                from_hole: current,
            };
            self.pending_advance = Some(advance);
            return Ok(Some(advance));
        }
        Ok(None)
    }

    /// Step one hole back or forward, staying within the course.
    pub fn navigate(&mut self, direction: Direction) -> u8 {
        self.pending_advance = None;
        let hole = &mut self.round.current_hole;
        *hole = match direction {
            Direction::Prev => hole.saturating_sub(1).max(1),
            Direction::Next => hole.saturating_add(1).min(HOLES as u8),
        };
        *hole
    }

    /// Apply a scheduled advance if it is still the pending one and still relevant.
    pub fn apply_advance(&mut self, id: Uuid) -> bool {
        match self.pending_advance {
            Some(pending) if pending.id == id => {
                self.pending_advance = None;
                if self.round.current_hole != pending.from_hole {
                    return false;
                }
                self.round.current_hole = (pending.from_hole + 1).min(HOLES as u8);
                true
            }
            _ => false,
        }
    }

    /// Drop any scheduled advance.
    pub fn cancel_advance(&mut self) {
        self.pending_advance = None;
    }

    /// Whether every slot of every participant is set.
    pub fn is_complete(&self) -> bool {
        self.round.is_complete()
    }

    /// Fails with [`SessionError::Incomplete`] while any slot is unset.
    pub fn ensure_complete(&self) -> Result<(), SessionError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(SessionError::Incomplete)
        }
    }

    /// Write the finished round into `data`: replace when editing, append otherwise.
    pub fn commit(&self, data: &mut AppData) -> Result<Round, SessionError> {
        self.ensure_complete()?;
        let round = self.round.clone();

        match self.editing.as_deref() {
            Some(id) => match data.rounds.iter_mut().find(|existing| existing.id == id) {
                Some(existing) => *existing = round.clone(),
                None => {
                    warn!(round_id = %id, "edited round vanished; appending it instead");
                    data.rounds.push(round.clone());
                }
            },
            None => data.rounds.push(round.clone()),
        }

        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::fixtures::*;

    fn roster() -> AppData {
        AppData {
            players: vec![player("p_1", "Ravi"), player("p_2", "Mia")],
            rounds: vec![],
        }
    }

    fn two_player_session() -> RoundSession {
        RoundSession::start(
            &roster(),
            "r_1".into(),
            EPOCH,
            vec!["p_1".into(), "p_2".into()],
        )
        .unwrap()
    }

    #[test]
    fn start_refuses_bad_selections() {
        let data = roster();
        assert_eq!(
            RoundSession::start(&data, "r_1".into(), EPOCH, vec![]).unwrap_err(),
            SessionError::EmptySelection
        );
        assert!(matches!(
            RoundSession::start(&data, "r_1".into(), EPOCH, vec!["p_1".into(), "p_1".into()]),
            Err(SessionError::DuplicatePlayer { .. })
        ));
        assert!(matches!(
            RoundSession::start(&data, "r_1".into(), EPOCH, vec!["p_9".into()]),
            Err(SessionError::UnknownPlayer { .. })
        ));
    }

    #[test]
    fn fresh_round_starts_empty_on_hole_one() {
        let session = two_player_session();
        assert_eq!(session.round().current_hole, 1);
        assert!(session.editing().is_none());
        assert!(session.round().has_unset_slot());
        assert!(!session.is_complete());
    }

    #[test]
    fn range_errors_name_the_accepted_bounds() {
        assert_eq!(
            SessionError::ScoreOutOfRange { value: 11 }.to_string(),
            "score 11 is outside 1..=10"
        );
        assert_eq!(
            SessionError::HoleOutOfRange { index: 20 }.to_string(),
            "hole index 20 is outside 0..=19"
        );
    }

    #[test]
    fn out_of_range_scores_leave_the_grid_untouched() {
        let mut session = two_player_session();
        let before = session.clone();

        assert_eq!(
            session.set_score("p_1", 0, 11),
            Err(SessionError::ScoreOutOfRange { value: 11 })
        );
        assert_eq!(
            session.set_score("p_1", 0, 0),
            Err(SessionError::ScoreOutOfRange { value: 0 })
        );
        assert_eq!(
            session.set_score("p_1", 20, 3),
            Err(SessionError::HoleOutOfRange { index: 20 })
        );
        assert_eq!(
            session.set_score("p_1", -1, 3),
            Err(SessionError::HoleOutOfRange { index: -1 })
        );
        assert!(matches!(
            session.set_score("p_9", 0, 3),
            Err(SessionError::NotParticipant { .. })
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn advance_is_scheduled_once_everyone_scored_the_hole() {
        let mut session = two_player_session();
        assert_eq!(session.set_score("p_1", 0, 3), Ok(None));

        let advance = session.set_score("p_2", 0, 2).unwrap().unwrap();
        assert_eq!(advance.from_hole, 1);
        assert_eq!(session.pending_advance(), Some(advance));

        // A newer score supersedes the schedule.
        let newer = session.set_score("p_2", 0, 4).unwrap().unwrap();
        assert_ne!(newer.id, advance.id);
        assert!(!session.apply_advance(advance.id));
        assert_eq!(session.round().current_hole, 1);

        assert!(session.apply_advance(newer.id));
        assert_eq!(session.round().current_hole, 2);
        assert!(session.pending_advance().is_none());
    }

    #[test]
    fn navigation_cancels_and_outdates_advances() {
        let mut session = two_player_session();
        session.set_score("p_1", 0, 3).unwrap();
        let advance = session.set_score("p_2", 0, 3).unwrap().unwrap();

        assert_eq!(session.navigate(Direction::Next), 2);
        assert!(!session.apply_advance(advance.id));
        assert_eq!(session.round().current_hole, 2);
    }

    #[test]
    fn navigation_clamps_to_the_course() {
        let mut session = two_player_session();
        assert_eq!(session.navigate(Direction::Prev), 1);
        for _ in 0..30 {
            session.navigate(Direction::Next);
        }
        assert_eq!(session.round().current_hole, HOLES as u8);
    }

    #[test]
    fn no_advance_past_the_last_hole() {
        let mut session = two_player_session();
        for _ in 1..HOLES {
            session.navigate(Direction::Next);
        }
        session.set_score("p_1", 19, 2).unwrap();
        assert_eq!(session.set_score("p_2", 19, 2), Ok(None));
    }

    #[test]
    fn finalize_refuses_incomplete_rounds() {
        let session = two_player_session();
        let mut data = roster();
        assert_eq!(session.commit(&mut data), Err(SessionError::Incomplete));
        assert!(data.rounds.is_empty());
    }

    #[test]
    fn commit_appends_new_rounds_and_replaces_edited_ones() {
        let mut data = roster();
        data.rounds.push(complete_round("r_old", 0, &[("p_1", 44)]));
        data.rounds.push(complete_round("r_keep", 1, &[("p_2", 40)]));

        let mut session = RoundSession::edit(&data.rounds[0]);
        assert_eq!(session.editing(), Some("r_old"));
        session.set_score("p_1", 0, 1).unwrap();
        session.commit(&mut data).unwrap();

        assert_eq!(data.rounds.len(), 2);
        assert_eq!(data.rounds[0].id, "r_old");
        assert_eq!(data.rounds[0].scores["p_1"][0], Some(1));
        assert_eq!(data.rounds[1].id, "r_keep");

        let mut session = two_player_session();
        for hole in 0..HOLES as i64 {
            session.set_score("p_1", hole, 2).unwrap();
            session.set_score("p_2", hole, 3).unwrap();
        }
        let round = session.commit(&mut data).unwrap();
        assert_eq!(data.rounds.len(), 3);
        assert_eq!(data.rounds[2], round);
    }
}
