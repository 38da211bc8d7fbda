use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    dao::{
        score_store::LocalStore,
        storage::{StorageError, StorageResult},
    },
    state::model::AppData,
};

/// Stores the score data as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the file at `path`; the file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LocalStore for JsonFileStore {
    fn load(&self) -> AppData {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no local score data yet, starting empty");
                return AppData::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read local score data, starting empty");
                return AppData::default();
            }
        };

        match serde_json::from_str::<AppData>(&raw) {
            Ok(data) => {
                info!(
                    path = %self.path.display(),
                    players = data.players.len(),
                    rounds = data.rounds.len(),
                    "loaded local score data"
                );
                data
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "local score data is malformed, starting empty");
                AppData::default()
            }
        }
    }

    fn save(&self, data: &AppData) -> StorageResult<()> {
        let unavailable = |err: io::Error| {
            StorageError::unavailable(format!("writing {}", self.path.display()), err)
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }

        let payload = serde_json::to_vec(data)
            .map_err(|err| StorageError::unavailable("encoding score data".into(), err))?;

        // Write next to the target then rename so a crash never leaves half a file.
        let temp = self.temp_path();
        fs::write(&temp, payload).map_err(unavailable)?;
        fs::rename(&temp, &self.path).map_err(unavailable)?;
        Ok(())
    }
}
