/**
 * API Routes
 *
 * # Routes
 *
 * ## Authentication (public)
 * - `POST /api/auth/signup`
 * - `POST /api/auth/login`
 *
 * ## Everything else (bearer token required)
 * - `GET /api/auth/me`
 * - `/api/boards`, `/api/boards/{id}`, members and admins
 * - `/api/columns`, `/api/boards/{id}/columns`, move and order
 * - `/api/tasks`, `/api/columns/{id}/tasks`, move and comments
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::backend::auth::{get_me, login, signup};
use crate::backend::handlers::{boards, columns, tasks};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>, app_state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login));

    let protected = Router::new()
        .route("/api/auth/me", get(get_me))
        // Boards
        .route("/api/boards", post(boards::create_board).get(boards::list_boards))
        .route(
            "/api/boards/{id}",
            get(boards::get_board)
                .patch(boards::update_board)
                .delete(boards::delete_board),
        )
        .route("/api/boards/{id}/members", post(boards::add_member))
        .route("/api/boards/{id}/members/{user_id}", delete(boards::remove_member))
        .route("/api/boards/{id}/admins", post(boards::grant_admin))
        .route("/api/boards/{id}/admins/{user_id}", delete(boards::revoke_admin))
        // Columns
        .route("/api/boards/{id}/columns", get(columns::list_columns))
        .route("/api/boards/{id}/columns/order", put(columns::reorder_columns))
        .route("/api/columns", post(columns::create_column))
        .route(
            "/api/columns/{id}",
            patch(columns::update_column).delete(columns::delete_column),
        )
        .route("/api/columns/{id}/move", put(columns::move_column))
        // Tasks
        .route("/api/columns/{id}/tasks", get(tasks::list_tasks))
        .route("/api/tasks", post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            patch(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/api/tasks/{id}/move", put(tasks::move_task))
        .route("/api/tasks/{id}/comments", post(tasks::add_comment))
        .route_layer(from_fn_with_state(app_state, auth_middleware));

    router.merge(public).merge(protected)
}
