pub mod model;
pub mod session;
mod sse;
pub mod state_machine;
pub mod stats;
pub mod transitions;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::score_store::{LocalStore, RemoteStore},
    error::ServiceError,
    state::{model::AppData, session::RoundSession, state_machine::RoundPhase},
};

pub use self::sse::SseHub;
pub use self::state_machine::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};
use self::state_machine::{RoundEvent, RoundStateMachine};

pub type SharedState = Arc<AppState>;
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);
const SSE_CAPACITY: usize = 32;

/// Central application state: score data, the working round and storage handles.
///
/// Locks are always taken in the order `current_round` then `data`.
pub struct AppState {
    config: AppConfig,
    local_store: Arc<dyn LocalStore>,
    remote_store: RwLock<Option<Arc<dyn RemoteStore>>>,
    remote_revision: AtomicU64,
    remote_writer: Mutex<u64>,
    data: RwLock<AppData>,
    current_round: RwLock<Option<RoundSession>>,
    machine: RwLock<RoundStateMachine>,
    sse: SseHub,
    degraded: watch::Sender<bool>,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`], seeded from the local store.
    ///
    /// The application starts in degraded mode until a remote store is installed.
    pub fn new(config: AppConfig, local_store: Arc<dyn LocalStore>) -> SharedState {
        let data = local_store.load();
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            local_store,
            remote_store: RwLock::new(None),
            remote_revision: AtomicU64::new(0),
            remote_writer: Mutex::new(0),
            data: RwLock::new(data),
            current_round: RwLock::new(None),
            machine: RwLock::new(RoundStateMachine::new()),
            sse: SseHub::new(SSE_CAPACITY),
            degraded: degraded_tx,
            transition_gate: Mutex::new(()),
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Device-local store, always present.
    pub fn local_store(&self) -> Arc<dyn LocalStore> {
        self.local_store.clone()
    }

    /// Obtain a handle to the remote store, if one is connected.
    pub async fn remote_store(&self) -> Option<Arc<dyn RemoteStore>> {
        let guard = self.remote_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a connected remote store.
    pub async fn set_remote_store(&self, store: Arc<dyn RemoteStore>) {
        let mut guard = self.remote_store.write().await;
        *guard = Some(store);
    }

    /// Number the next snapshot sent to the remote store.
    ///
    /// Callers take it while holding the data lock so numbers follow commit order.
    pub fn next_remote_revision(&self) -> u64 {
        self.remote_revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Single-writer gate for remote saves, holding the last revision written.
    pub fn remote_writer(&self) -> &Mutex<u64> {
        &self.remote_writer
    }

    /// The persisted score data.
    pub fn data(&self) -> &RwLock<AppData> {
        &self.data
    }

    /// Run `f` against a read view of the score data.
    pub async fn read_data<R>(&self, f: impl FnOnce(&AppData) -> R) -> R {
        let guard = self.data.read().await;
        f(&guard)
    }

    /// Swap the whole score data set.
    pub async fn replace_data(&self, data: AppData) {
        let mut guard = self.data.write().await;
        *guard = data;
    }

    /// Working round, if one is open.
    pub fn current_round(&self) -> &RwLock<Option<RoundSession>> {
        &self.current_round
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Store the degraded flag, returning whether it changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        if self.is_degraded() == value {
            return false;
        }
        self.degraded.send_replace(value);
        true
    }

    /// Broadcast hub used for the SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Snapshot the current phase of the round state machine.
    pub async fn phase(&self) -> RoundPhase {
        self.machine.read().await.phase()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let sm = self.machine.read().await;
        sm.snapshot()
    }

    /// Plan a transition to the round state machine, returning the plan.
    async fn plan_transition(&self, event: RoundEvent) -> Result<Plan, PlanError> {
        let mut sm = self.machine.write().await;
        sm.plan(event)
    }

    /// Apply the planned transition, returning the next phase.
    async fn apply_planned_transition(&self, plan_id: PlanId) -> Result<RoundPhase, ApplyError> {
        let mut sm = self.machine.write().await;
        sm.apply(plan_id)
    }

    /// Abort a planned transition of the round state machine.
    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut sm = self.machine.write().await;
        sm.abort(plan_id)
    }

    /// Plan `event`, run `work`, then apply the plan on success or abort it on failure.
    pub async fn run_transition<F, Fut, T>(
        &self,
        event: RoundEvent,
        work: F,
    ) -> Result<(T, RoundPhase), ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.plan_transition(event.clone()).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self.apply_planned_transition(plan_id).await?;
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }
}
