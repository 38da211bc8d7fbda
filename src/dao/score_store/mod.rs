#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod local;
#[cfg(test)]
pub mod memory;

use futures::future::BoxFuture;

use crate::{dao::storage::StorageResult, state::model::AppData};

/// Device-local copy of the score data, always available.
pub trait LocalStore: Send + Sync {
    /// Load the stored data; a missing or unreadable copy yields empty data.
    fn load(&self) -> AppData;
    /// Persist the full data set.
    fn save(&self, data: &AppData) -> StorageResult<()>;
}

/// Shared copy of the score data, reachable over the network.
pub trait RemoteStore: Send + Sync {
    /// Fetch the shared document, `None` when it was never written.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppData>>>;
    /// Overwrite the shared document.
    fn save(&self, data: AppData) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
