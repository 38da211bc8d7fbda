use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::{
        phase::VisiblePhase,
        round::{
            RoundSummaryResponse, RoundView, ScorecardView, SetScoreRequest, StartRoundRequest,
        },
    },
    error::ServiceError,
    services::{
        sse_events::{broadcast_round_finalized, broadcast_round_updated, broadcast_rounds_updated},
        sync_service::commit_data,
    },
    state::{
        SharedState,
        session::{Direction, PendingAdvance, RoundSession, SessionError},
        state_machine::RoundEvent,
        stats,
        transitions::run_transition_with_broadcast,
    },
};

fn no_round() -> ServiceError {
    ServiceError::NotFound(SessionError::NoActiveRound.to_string())
}

/// Open a new round for the selected players.
pub async fn start_round(
    state: &SharedState,
    request: StartRoundRequest,
) -> Result<RoundView, ServiceError> {
    request.validate()?;
    let now = OffsetDateTime::now_utc();
    let session = state
        .read_data(|data| {
            RoundSession::start(data, data.next_round_id(now), now, request.player_ids)
        })
        .await?;
    let round_id = session.round().id.clone();

    run_transition_with_broadcast(state, RoundEvent::Start, move || async move {
        let mut slot = state.current_round().write().await;
        *slot = Some(session);
        Ok(())
    })
    .await?;

    info!(round_id = %round_id, "round started");
    current_round(state).await
}

/// Reopen a persisted round for correction.
pub async fn edit_round(state: &SharedState, round_id: &str) -> Result<RoundView, ServiceError> {
    let session = state
        .read_data(|data| data.round(round_id).map(RoundSession::edit))
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("round `{round_id}` not found")))?;

    run_transition_with_broadcast(
        state,
        RoundEvent::Edit(round_id.to_string()),
        move || async move {
            let mut slot = state.current_round().write().await;
            *slot = Some(session);
            Ok(())
        },
    )
    .await?;

    info!(round_id = %round_id, "round reopened for editing");
    current_round(state).await
}

/// Hole-by-hole view of the working round.
pub async fn current_round(state: &SharedState) -> Result<RoundView, ServiceError> {
    let phase = VisiblePhase::from(&state.snapshot().await);
    let guard = state.current_round().read().await;
    let session = guard.as_ref().ok_or_else(no_round)?;
    let data = state.data().read().await;
    Ok(RoundView::build(&data, session, phase))
}

/// Full-grid view of the working round.
pub async fn scorecard(state: &SharedState) -> Result<ScorecardView, ServiceError> {
    let guard = state.current_round().read().await;
    let session = guard.as_ref().ok_or_else(no_round)?;
    let data = state.data().read().await;
    Ok(ScorecardView::build(&data, session.round()))
}

/// Record one score, scheduling the move to the next hole when it completes the current one.
pub async fn set_score(
    state: &SharedState,
    request: SetScoreRequest,
) -> Result<RoundView, ServiceError> {
    {
        let mut guard = state.current_round().write().await;
        let session = guard.as_mut().ok_or_else(no_round)?;
        let advance = session.set_score(&request.player_id, request.hole_index, request.value)?;
        debug!(
            player_id = %request.player_id,
            hole_index = request.hole_index,
            value = request.value,
            "score recorded"
        );
        if let Some(advance) = advance {
            schedule_advance(state, advance);
        }
        broadcast_round_updated(state, session);
    }
    current_round(state).await
}

fn schedule_advance(state: &SharedState, advance: PendingAdvance) {
    let state = state.clone();
    let delay = state.config().auto_advance_delay;
    tokio::spawn(async move {
        sleep(delay).await;
        let mut guard = state.current_round().write().await;
        let Some(session) = guard.as_mut() else {
            return;
        };
        if session.apply_advance(advance.id) {
            debug!(from_hole = advance.from_hole, "advanced to the next hole");
            broadcast_round_updated(&state, session);
        }
    });
}

/// Step one hole back or forward.
pub async fn navigate(state: &SharedState, direction: Direction) -> Result<RoundView, ServiceError> {
    {
        let mut guard = state.current_round().write().await;
        let session = guard.as_mut().ok_or_else(no_round)?;
        session.navigate(direction);
        broadcast_round_updated(state, session);
    }
    current_round(state).await
}

/// Save the complete working round and close it.
pub async fn finalize(state: &SharedState) -> Result<RoundSummaryResponse, ServiceError> {
    let summary = run_transition_with_broadcast(state, RoundEvent::Finalize, || async {
        let mut guard = state.current_round().write().await;
        let session = guard.as_mut().ok_or_else(no_round)?;
        let (round, count) = commit_data(state, |data| {
            let round = session.commit(data)?;
            Ok((round, data.rounds.len()))
        })
        .await?;
        session.cancel_advance();
        *guard = None;

        let summary = state
            .read_data(|data| stats::round_summary(data, &round))
            .await;
        Ok((RoundSummaryResponse::from(summary), count))
    })
    .await;

    let (summary, count) = summary?;
    info!(round_id = %summary.round_id, winners = ?summary.winners, "round finalized");
    broadcast_round_finalized(state, summary.clone());
    broadcast_rounds_updated(state, count);
    Ok(summary)
}

/// Throw the working round away without saving.
pub async fn discard(state: &SharedState) -> Result<(), ServiceError> {
    run_transition_with_broadcast(state, RoundEvent::Discard, || async {
        let mut guard = state.current_round().write().await;
        if let Some(session) = guard.take() {
            info!(round_id = %session.round().id, "round discarded");
        }
        Ok(())
    })
    .await
}

/// Remove a persisted round.
pub async fn delete_round(state: &SharedState, round_id: &str) -> Result<(), ServiceError> {
    let guard = state.current_round().read().await;
    if guard.as_ref().and_then(RoundSession::editing) == Some(round_id) {
        return Err(ServiceError::InvalidState(format!(
            "round `{round_id}` is being edited"
        )));
    }

    let count = commit_data(state, |data| {
        let before = data.rounds.len();
        data.rounds.retain(|round| round.id != round_id);
        if data.rounds.len() == before {
            return Err(ServiceError::NotFound(format!("round `{round_id}` not found")));
        }
        Ok(data.rounds.len())
    })
    .await?;
    drop(guard);

    info!(round_id = %round_id, "round deleted");
    broadcast_rounds_updated(state, count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::{
        model::{AppData, HOLES, fixtures::*},
        state_machine::{RoundMode, RoundPhase},
        testing::state_with,
    };

    fn roster() -> AppData {
        AppData {
            players: vec![player("p_1", "Ravi"), player("p_2", "Mia")],
            rounds: vec![],
        }
    }

    async fn started(state: &SharedState) -> RoundView {
        start_round(
            state,
            StartRoundRequest {
                player_ids: vec!["p_1".into(), "p_2".into()],
            },
        )
        .await
        .unwrap()
    }

    async fn score(state: &SharedState, player_id: &str, hole_index: i64, value: i64) {
        set_score(
            state,
            SetScoreRequest {
                player_id: player_id.into(),
                hole_index,
                value,
            },
        )
        .await
        .unwrap();
    }

    async fn fill(state: &SharedState) {
        for hole in 0..HOLES as i64 {
            score(state, "p_1", hole, 2).await;
            score(state, "p_2", hole, 3).await;
        }
    }

    #[tokio::test]
    async fn start_opens_an_empty_round() {
        let (state, _) = state_with(roster());
        let view = started(&state).await;
        assert_eq!(view.current_hole, 1);
        assert_eq!(view.phase, VisiblePhase::InProgress);
        assert!(!view.complete);
        assert_eq!(
            state.phase().await,
            RoundPhase::InProgress(RoundMode::New)
        );
    }

    #[tokio::test]
    async fn start_refuses_empty_or_unknown_selection() {
        let (state, _) = state_with(roster());
        let err = start_round(&state, StartRoundRequest { player_ids: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = start_round(
            &state,
            StartRoundRequest {
                player_ids: vec!["p_9".into()],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(state.phase().await, RoundPhase::NoActiveRound);
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let (state, _) = state_with(roster());
        started(&state).await;
        let err = set_score(
            &state,
            SetScoreRequest {
                player_id: "p_1".into(),
                hole_index: 0,
                value: 11,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let card = scorecard(&state).await.unwrap();
        assert!(card.rows.iter().all(|row| row.cells.iter().all(|c| c.score.is_none())));
    }

    #[tokio::test]
    async fn oversized_numbers_take_the_same_rejection_path() {
        let (state, _) = state_with(roster());
        started(&state).await;

        for body in [
            r#"{"playerId": "p_1", "holeIndex": 0, "value": 4294967299}"#,
            r#"{"playerId": "p_1", "holeIndex": 3000000000, "value": 3}"#,
        ] {
            let request: SetScoreRequest = serde_json::from_str(body).unwrap();
            let err = set_score(&state, request).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{body}");
        }

        let card = scorecard(&state).await.unwrap();
        assert!(card.rows.iter().all(|row| row.cells.iter().all(|c| c.score.is_none())));
    }

    #[tokio::test(start_paused = true)]
    async fn hole_advances_after_the_delay() {
        let (state, _) = state_with(roster());
        started(&state).await;
        score(&state, "p_1", 0, 3).await;
        score(&state, "p_2", 0, 2).await;

        assert_eq!(current_round(&state).await.unwrap().current_hole, 1);
        sleep(state.config().auto_advance_delay + Duration::from_millis(10)).await;
        assert_eq!(current_round(&state).await.unwrap().current_hole, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_cancels_the_pending_advance() {
        let (state, _) = state_with(roster());
        started(&state).await;
        score(&state, "p_1", 0, 3).await;
        score(&state, "p_2", 0, 2).await;
        navigate(&state, Direction::Next).await.unwrap();
        navigate(&state, Direction::Prev).await.unwrap();

        sleep(state.config().auto_advance_delay * 2).await;
        assert_eq!(current_round(&state).await.unwrap().current_hole, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_makes_pending_advance_a_no_op() {
        let (state, local) = state_with(roster());
        started(&state).await;
        score(&state, "p_1", 0, 3).await;
        score(&state, "p_2", 0, 2).await;
        discard(&state).await.unwrap();

        sleep(state.config().auto_advance_delay * 2).await;
        assert!(matches!(
            current_round(&state).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(local.stored().rounds.is_empty());
        assert_eq!(state.phase().await, RoundPhase::NoActiveRound);
    }

    #[tokio::test]
    async fn finalize_refuses_incomplete_round() {
        let (state, local) = state_with(roster());
        started(&state).await;
        score(&state, "p_1", 0, 3).await;

        let err = finalize(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(local.stored().rounds.is_empty());
        assert_eq!(
            state.phase().await,
            RoundPhase::InProgress(RoundMode::New)
        );
        assert!(current_round(&state).await.is_ok());
    }

    #[tokio::test]
    async fn finalize_saves_and_summarises() {
        let (state, local) = state_with(roster());
        started(&state).await;
        fill(&state).await;

        let summary = finalize(&state).await.unwrap();
        assert_eq!(summary.winners, ["Ravi"]);
        assert_eq!(summary.players[1].diff, 20);
        assert_eq!(local.stored().rounds.len(), 1);
        assert_eq!(state.phase().await, RoundPhase::NoActiveRound);
        assert!(current_round(&state).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn finalize_drops_the_pending_advance() {
        let (state, _) = state_with(roster());
        let old_id = started(&state).await.id;
        fill(&state).await;
        assert!(current_round(&state).await.unwrap().auto_advance_pending);
        finalize(&state).await.unwrap();

        let mut events = state.sse().subscribe();
        let view = started(&state).await;
        assert_ne!(view.id, old_id);
        sleep(state.config().auto_advance_delay * 3).await;

        assert_eq!(current_round(&state).await.unwrap().current_hole, 1);
        while let Ok(event) = events.try_recv() {
            if event.event.as_deref() == Some("round.updated") {
                assert!(!event.data.contains(&old_id), "{}", event.data);
            }
        }
    }

    #[tokio::test]
    async fn editing_replaces_the_round_in_place() {
        let mut data = roster();
        data.rounds.push(complete_round("r_1", 0, &[("p_1", 44)]));
        data.rounds.push(complete_round("r_2", 1, &[("p_2", 40)]));
        let (state, _) = state_with(data);

        let view = edit_round(&state, "r_1").await.unwrap();
        assert_eq!(view.editing.as_deref(), Some("r_1"));
        assert_eq!(view.phase, VisiblePhase::Editing);

        let err = delete_round(&state, "r_1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        score(&state, "p_1", 5, 1).await;
        finalize(&state).await.unwrap();

        let rounds = state.read_data(|data| data.rounds.clone()).await;
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].id, "r_1");
        assert_eq!(rounds[0].scores["p_1"][5], Some(1));
    }

    #[tokio::test]
    async fn delete_removes_known_rounds_only() {
        let mut data = roster();
        data.rounds.push(complete_round("r_1", 0, &[("p_1", 44)]));
        let (state, local) = state_with(data);

        let err = delete_round(&state, "r_9").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        delete_round(&state, "r_1").await.unwrap();
        assert!(local.stored().rounds.is_empty());
    }

    #[tokio::test]
    async fn edit_of_unknown_round_is_not_found() {
        let (state, _) = state_with(roster());
        let err = edit_round(&state, "r_9").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
