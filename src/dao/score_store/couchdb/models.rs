use serde::{Deserialize, Serialize};

use crate::state::model::{AppData, Player, Round};

use super::error::{CouchDaoError, CouchResult};

/// Score data as stored in CouchDB: the local format plus `_id`/`_rev`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchScoreDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<Player>>,
    #[serde(default)]
    pub rounds: Option<Vec<Round>>,
}

impl CouchScoreDocument {
    pub fn from_data(id: String, rev: Option<String>, data: AppData) -> Self {
        Self {
            id,
            rev,
            players: Some(data.players),
            rounds: Some(data.rounds),
        }
    }

    /// Both collections are required; a half document is never trusted.
    pub fn into_data(self) -> CouchResult<AppData> {
        let field = match (self.players, self.rounds) {
            (Some(players), Some(rounds)) => return Ok(AppData { players, rounds }),
            (None, _) => "players",
            (_, None) => "rounds",
        };
        Err(CouchDaoError::MissingCollection {
            doc_id: self.id,
            field,
        })
    }
}
