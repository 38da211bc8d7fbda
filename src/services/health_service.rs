use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report the degraded flag, pinging the remote store when one is connected.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.remote_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "remote store health check failed");
            }
        }
        None => warn!("remote store not connected (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::score_store::{RemoteStore, memory::MemoryRemoteStore},
        services::storage_supervisor::set_degraded,
        state::{model::AppData, testing::state_with},
    };

    #[tokio::test]
    async fn reports_degraded_until_remote_connects() {
        let (state, _) = state_with(AppData::default());
        assert_eq!(health_status(&state).await.status, "degraded");

        let store: Arc<dyn RemoteStore> = Arc::new(Arc::new(MemoryRemoteStore::default()));
        state.set_remote_store(store).await;
        set_degraded(&state, false);
        assert_eq!(health_status(&state).await.status, "ok");
    }
}
