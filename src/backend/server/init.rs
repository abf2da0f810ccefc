/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Pick the document store: Postgres when `DATABASE_URL` connects,
 *    otherwise the in-memory store
 * 2. Wrap it with the configured call timeout
 * 3. Build the room router, ordered collection and mutation coordinator
 * 4. Create the router
 * 5. Spawn the housekeeping task that prunes idle lock scopes and empty
 *    rooms every five minutes
 */

use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::mutations::MutationCoordinator;
use crate::backend::ordering::{OrderedCollection, ParentScopes};
use crate::backend::realtime::{PresenceRegistry, RoomRouter};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{DocumentStore, MemoryStore, PgStore, TimedStore};

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(300);

/// Assemble application state around an existing store
pub fn build_state(config: ServerConfig, store: Arc<dyn DocumentStore>) -> AppState {
    let store: Arc<dyn DocumentStore> = Arc::new(TimedStore::new(store, config.store_timeout));
    let rooms = RoomRouter::new(PresenceRegistry::new(), config.outbound_buffer);
    let ordering = OrderedCollection::new(ParentScopes::new(), config.conflict_retries);
    let coordinator = MutationCoordinator::new(store.clone(), ordering, rooms.clone());

    AppState {
        store,
        coordinator,
        rooms,
        sessions: SessionKeys::new(&config.jwt_secret),
        config: Arc::new(config),
    }
}

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing task board backend");

    let store: Arc<dyn DocumentStore> = match load_database(&config).await {
        Some(pool) => {
            tracing::info!("[Store] Using Postgres document store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("[Store] Using in-memory document store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = build_state(config, store);
    let app = create_router(app_state.clone());
    spawn_housekeeping(&app_state);

    tracing::info!("[Server] Router configured with periodic housekeeping task");
    app
}

fn spawn_housekeeping(app_state: &AppState) {
    let scopes = app_state.coordinator.ordering().scopes().clone();
    let rooms = app_state.rooms.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        loop {
            interval.tick().await;
            let scopes_pruned = scopes.prune().await;
            let rooms_pruned = rooms.prune_empty_rooms().await;
            tracing::debug!(
                "[Server] Housekeeping pruned {} lock scopes and {} empty rooms",
                scopes_pruned,
                rooms_pruned
            );
        }
    });
}
