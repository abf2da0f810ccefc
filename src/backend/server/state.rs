/**
 * Application State Management
 *
 * `AppState` is the single state container handed to the axum router. The
 * `FromRef` implementations let handlers extract only the part they need.
 *
 * Every field is cheap to clone: the store is behind an `Arc`, and the
 * coordinator and room router share their interior state.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::mutations::MutationCoordinator;
use crate::backend::realtime::RoomRouter;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    /// Document store, already wrapped with the call timeout
    pub store: Arc<dyn DocumentStore>,
    /// Sole path for persisted mutations
    pub coordinator: MutationCoordinator,
    /// Live connections and rooms
    pub rooms: RoomRouter,
    pub sessions: SessionKeys,
    pub config: Arc<ServerConfig>,
}

impl FromRef<AppState> for Arc<dyn DocumentStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for MutationCoordinator {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.coordinator.clone()
    }
}

impl FromRef<AppState> for RoomRouter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
