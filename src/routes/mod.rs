use axum::Router;

use crate::state::SharedState;

pub mod backup;
pub mod docs;
pub mod health;
pub mod players;
pub mod round;
pub mod rounds;
pub mod sse;
pub mod stats;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(players::router())
        .merge(round::router())
        .merge(rounds::router())
        .merge(stats::router())
        .merge(backup::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
