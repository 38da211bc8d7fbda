//! In-memory stores used by service tests.

use std::{
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::time::sleep;

use crate::{
    dao::{
        score_store::{LocalStore, RemoteStore},
        storage::{StorageError, StorageResult},
    },
    state::model::AppData,
};

fn offline() -> StorageError {
    StorageError::unavailable(
        "memory store offline".into(),
        io::Error::new(io::ErrorKind::Other, "offline"),
    )
}

#[derive(Default)]
pub struct MemoryLocalStore {
    pub data: Mutex<AppData>,
    pub saves: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemoryLocalStore {
    pub fn with_data(data: AppData) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> AppData {
        self.data.lock().unwrap().clone()
    }
}

impl LocalStore for MemoryLocalStore {
    fn load(&self) -> AppData {
        self.stored()
    }

    fn save(&self, data: &AppData) -> StorageResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(offline());
        }
        *self.data.lock().unwrap() = data.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRemoteStore {
    pub document: Mutex<Option<AppData>>,
    /// Delay applied to the next save only.
    pub first_save_delay: Mutex<Option<Duration>>,
    pub saves: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn with_document(data: AppData) -> Arc<Self> {
        Arc::new(Self {
            document: Mutex::new(Some(data)),
            ..Self::default()
        })
    }

    pub fn stored(&self) -> Option<AppData> {
        self.document.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RemoteStore for Arc<MemoryRemoteStore> {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppData>>> {
        let store = self.clone();
        Box::pin(async move {
            if store.fail.load(Ordering::SeqCst) {
                return Err(offline());
            }
            Ok(store.stored())
        })
    }

    fn save(&self, data: AppData) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let delay = store.first_save_delay.lock().unwrap().take();
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            if store.fail.load(Ordering::SeqCst) {
                return Err(offline());
            }
            *store.document.lock().unwrap() = Some(data);
            store.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let failing = self.fail.load(Ordering::SeqCst);
        Box::pin(async move { if failing { Err(offline()) } else { Ok(()) } })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}
