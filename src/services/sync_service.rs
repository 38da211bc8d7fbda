//! Commit path shared by every mutation: local save first, then the remote copy.

use std::sync::Arc;

use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dao::{score_store::RemoteStore, storage::StorageError},
    error::ServiceError,
    services::sse_events::broadcast_data_reloaded,
    state::{SharedState, model::AppData},
};

/// Apply `mutate` to a copy of the data, save it locally, then publish it.
///
/// Nothing changes when `mutate` or the local save fails. The remote save
/// runs in the background and never rolls the local state back.
pub async fn commit_data<F, T>(state: &SharedState, mutate: F) -> Result<T, ServiceError>
where
    F: FnOnce(&mut AppData) -> Result<T, ServiceError>,
{
    let mut guard = state.data().write().await;
    let mut next = guard.clone();
    let value = mutate(&mut next)?;
    let next = save_local(state, next).await?;
    *guard = next.clone();
    spawn_remote_save(state, next);
    drop(guard);
    Ok(value)
}

/// Replace the whole data set (import), with the same local-then-remote order.
pub async fn replace_all(state: &SharedState, data: AppData) -> Result<(), ServiceError> {
    commit_data(state, |current| {
        *current = data;
        Ok(())
    })
    .await
}

/// Write `data` to the local store on the blocking pool and hand it back.
async fn save_local(state: &SharedState, data: AppData) -> Result<AppData, StorageError> {
    let store = state.local_store();
    task::spawn_blocking(move || store.save(&data).map(|()| data))
        .await
        .map_err(|err| StorageError::unavailable("local save task failed".into(), err))?
}

/// Fire-and-forget save of `data` to the remote store, if one is connected.
///
/// Data holding an incomplete round is never published. Saves go through a
/// single writer and a snapshot older than one already written is dropped.
pub fn spawn_remote_save(state: &SharedState, data: AppData) -> Option<JoinHandle<()>> {
    if !data.is_publishable() {
        warn!("score data holds an incomplete round; skipping remote save");
        return None;
    }

    let revision = state.next_remote_revision();
    let state = state.clone();
    Some(tokio::spawn(async move {
        let Some(store) = state.remote_store().await else {
            debug!(revision, "no remote store connected; remote save skipped");
            return;
        };
        publish(&state, store.as_ref(), revision, data).await;
    }))
}

async fn publish(state: &SharedState, store: &dyn RemoteStore, revision: u64, data: AppData) {
    let mut written = state.remote_writer().lock().await;
    if *written >= revision {
        debug!(revision, latest = *written, "superseded remote snapshot dropped");
        return;
    }
    *written = revision;

    let rounds = data.rounds.len();
    match store.save(data).await {
        Ok(()) => debug!(revision, rounds, "remote score document saved"),
        Err(err) => warn!(revision, error = %err, "remote save failed; local data kept"),
    }
}

/// Pull the shared document once the remote store is reachable.
///
/// A stored document replaces the local data; a missing one is created from it.
pub async fn load_remote(state: &SharedState, store: &Arc<dyn RemoteStore>) {
    match store.load().await {
        Ok(Some(data)) => {
            if let Err(err) = data.validate() {
                warn!(error = %err, "remote score document is invalid; keeping local data");
                return;
            }

            state.replace_data(data.clone()).await;
            if let Err(err) = save_local(state, data.clone()).await {
                warn!(error = %err, "failed to save remote data locally");
            }
            info!(
                players = data.players.len(),
                rounds = data.rounds.len(),
                "loaded score data from remote store"
            );
            broadcast_data_reloaded(state, "remote", &data);
        }
        Ok(None) => {
            let (revision, data) = {
                let guard = state.data().read().await;
                (state.next_remote_revision(), guard.clone())
            };
            if !data.is_publishable() {
                warn!("score data holds an incomplete round; remote document not initialized");
                return;
            }
            info!("remote score document missing; initializing it from local data");
            publish(state, store.as_ref(), revision, data).await;
        }
        Err(err) => warn!(error = %err, "failed to load remote score data; keeping local data"),
    }
}
