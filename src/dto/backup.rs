use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::model::{Player, Round};

/// Backup file as accepted by the importer; both collections must be present.
#[derive(Debug, Deserialize)]
pub struct BackupDocument {
    #[serde(default)]
    pub players: Option<Vec<Player>>,
    #[serde(default)]
    pub rounds: Option<Vec<Round>>,
}

/// Counts reported after a successful import.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportSummary {
    pub players: usize,
    pub rounds: usize,
}

/// Exported file with the name the browser should save it under.
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}
