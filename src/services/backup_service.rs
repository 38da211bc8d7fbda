//! CSV and JSON exports plus the JSON backup importer.

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    dto::{
        backup::{BackupDocument, ExportFile, ImportSummary},
        format_date, format_day,
    },
    error::ServiceError,
    services::{sse_events::broadcast_data_reloaded, sync_service::replace_all},
    state::{
        SharedState,
        model::{AppData, HOLES},
    },
};

const CSV_HEADER: [&str; 4] = ["Date", "Player", "Hole", "Score"];

fn export_failed(err: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidState(format!("failed to encode export: {err}"))
}

/// Every recorded score as `Date,Player,Hole,Score` rows.
pub async fn export_csv(state: &SharedState) -> Result<ExportFile, ServiceError> {
    let body = state.read_data(encode_csv).await?;
    Ok(ExportFile {
        file_name: format!(
            "{}-scores-{}.csv",
            state.config().export_prefix,
            format_day(OffsetDateTime::now_utc())
        ),
        content_type: "text/csv; charset=utf-8",
        body,
    })
}

fn encode_csv(data: &AppData) -> Result<String, ServiceError> {
    if data.rounds.is_empty() {
        return Err(ServiceError::InvalidState("no rounds to export".into()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(export_failed)?;
    for round in &data.rounds {
        let date = format_date(round.date);
        for (player_id, slots) in &round.scores {
            let name = data.player_name(player_id);
            for (index, slot) in slots.iter().enumerate().take(HOLES) {
                let hole = (index + 1).to_string();
                let score = slot.map(|value| value.to_string()).unwrap_or_default();
                writer
                    .write_record([date.as_str(), name, hole.as_str(), score.as_str()])
                    .map_err(export_failed)?;
            }
        }
    }

    let bytes = writer.into_inner().map_err(export_failed)?;
    String::from_utf8(bytes).map_err(export_failed)
}

/// The whole data set as pretty JSON, importable as is.
pub async fn export_json(state: &SharedState) -> Result<ExportFile, ServiceError> {
    let body = state
        .read_data(|data| serde_json::to_string_pretty(data))
        .await
        .map_err(export_failed)?;
    Ok(ExportFile {
        file_name: format!(
            "{}-backup-{}.json",
            state.config().export_prefix,
            format_day(OffsetDateTime::now_utc())
        ),
        content_type: "application/json",
        body,
    })
}

/// Replace every player and round with the content of a JSON backup.
pub async fn import(state: &SharedState, body: &str) -> Result<ImportSummary, ServiceError> {
    let data = parse_backup(body).inspect_err(|err| warn!(error = %err, "import rejected"))?;
    let summary = ImportSummary {
        players: data.players.len(),
        rounds: data.rounds.len(),
    };

    replace_all(state, data.clone()).await?;
    info!(
        players = summary.players,
        rounds = summary.rounds,
        "score data imported"
    );
    broadcast_data_reloaded(state, "import", &data);
    Ok(summary)
}

fn parse_backup(body: &str) -> Result<AppData, ServiceError> {
    let document: BackupDocument = serde_json::from_str(body)
        .map_err(|err| ServiceError::InvalidInput(format!("unreadable backup: {err}")))?;
    let (Some(players), Some(rounds)) = (document.players, document.rounds) else {
        return Err(ServiceError::InvalidInput(
            "backup must contain both `players` and `rounds`".into(),
        ));
    };

    let data = AppData { players, rounds };
    data.validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        model::{Round, fixtures::*},
        testing::state_with,
    };

    fn sample() -> AppData {
        AppData {
            players: vec![player("p_1", "Ravi"), player("p_2", "Mia")],
            rounds: vec![
                complete_round("r_1", 0, &[("p_1", 42), ("p_2", 45)]),
                round_with_total("r_2", 3, "p_1", 38),
            ],
        }
    }

    #[tokio::test]
    async fn csv_has_one_row_per_hole() {
        let (state, _) = state_with(sample());
        let file = export_csv(&state).await.unwrap();
        assert!(file.file_name.starts_with("rio-links-scores-"));
        assert!(file.file_name.ends_with(".csv"));

        let lines: Vec<_> = file.body.lines().collect();
        assert_eq!(lines[0], "Date,Player,Hole,Score");
        assert_eq!(lines.len(), 1 + 3 * HOLES);
        assert!(lines[1].starts_with("2025-06-01T09:00:00Z,Ravi,1,"));
        assert!(lines[HOLES + 1].contains(",Mia,1,"));
    }

    #[tokio::test]
    async fn csv_leaves_unset_scores_blank() {
        let mut round = Round::new("r_1".into(), EPOCH, vec!["p_x".into()]);
        round.scores.get_mut("p_x").unwrap()[0] = Some(3);
        let (state, _) = state_with(AppData {
            players: vec![],
            rounds: vec![round],
        });

        let body = export_csv(&state).await.unwrap().body;
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines[1], "2025-06-01T09:00:00Z,Player,1,3");
        assert_eq!(lines[2], "2025-06-01T09:00:00Z,Player,2,");
    }

    #[tokio::test]
    async fn csv_export_needs_rounds() {
        let (state, _) = state_with(AppData::default());
        assert!(matches!(
            export_csv(&state).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn json_export_imports_back_identically() {
        let (source, _) = state_with(sample());
        let file = export_json(&source).await.unwrap();
        assert!(file.file_name.starts_with("rio-links-backup-"));

        let (target, local) = state_with(AppData::default());
        let mut events = target.sse().subscribe();
        let summary = import(&target, &file.body).await.unwrap();

        assert_eq!(summary.players, 2);
        assert_eq!(summary.rounds, 2);
        assert_eq!(target.read_data(Clone::clone).await, sample());
        assert_eq!(local.stored(), sample());
        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("data.reloaded"));
    }

    #[tokio::test]
    async fn broken_backups_leave_data_untouched() {
        let (state, _) = state_with(sample());

        for body in [
            "not json",
            r#"{"players": []}"#,
            r#"{"rounds": []}"#,
            r#"{"players": [{"id": "p_1", "name": "A"}, {"id": "p_1", "name": "B"}], "rounds": []}"#,
        ] {
            let err = import(&state, body).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{body}");
        }

        let mut data = sample();
        data.rounds[0].scores.get_mut("p_2").unwrap()[7] = Some(11);
        let body = serde_json::to_string(&data).unwrap();
        assert!(matches!(
            import(&state, &body).await,
            Err(ServiceError::InvalidInput(_))
        ));

        assert_eq!(state.read_data(Clone::clone).await, sample());
    }
}
