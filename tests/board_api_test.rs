//! Board and membership endpoints

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use taskboard::backend::store::DocumentStore;

use common::{id_of, test_app};

#[tokio::test]
async fn test_create_and_list_boards() {
    let app = test_app();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;

    let (status, board) = app
        .post(
            "/api/boards",
            &ada.token,
            json!({ "title": "Roadmap", "visibility": "workspace", "members": [bob.id] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(board["title"], "Roadmap");
    assert_eq!(board["createdBy"], json!(ada.id));
    assert_eq!(board["members"], json!([bob.id]));

    let (status, boards) = app.get("/api/boards", &bob.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(boards.as_array().map(Vec::len), Some(1));
    assert_eq!(boards[0]["id"], board["id"]);
}

#[tokio::test]
async fn test_create_board_requires_title() {
    let app = test_app();
    let ada = app.register("ada").await;

    let (status, body) = app
        .post("/api/boards", &ada.token, json!({ "title": "  ", "visibility": "private" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"], "validation");
}

#[tokio::test]
async fn test_non_member_cannot_view_board() {
    let app = test_app();
    let ada = app.register("ada").await;
    let eve = app.register("eve").await;

    let (_, board) = app
        .post("/api/boards", &ada.token, json!({ "title": "Secret", "visibility": "workspace" }))
        .await;
    let board_id = id_of(&board);

    let (status, body) = app.get(&format!("/api/boards/{}", board_id), &eve.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["category"], "forbidden");

    let (status, _) = app
        .get(&format!("/api/boards/{}/columns", board_id), &eve.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_private_board_rejects_members() {
    let app = test_app();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;

    let (_, board) = app
        .post("/api/boards", &ada.token, json!({ "title": "Diary", "visibility": "private" }))
        .await;

    let (status, _) = app
        .post(
            &format!("/api/boards/{}/members", id_of(&board)),
            &ada.token,
            json!({ "userId": bob.id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_and_admin_lifecycle() {
    let app = test_app();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;
    let cat = app.register("cat").await;

    let (_, board) = app
        .post("/api/boards", &ada.token, json!({ "title": "Team", "visibility": "workspace" }))
        .await;
    let board_id = id_of(&board);

    let (status, board) = app
        .post(&format!("/api/boards/{}/members", board_id), &ada.token, json!({ "userId": bob.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["members"], json!([bob.id]));
    app.post(&format!("/api/boards/{}/members", board_id), &ada.token, json!({ "userId": cat.id }))
        .await;

    // Adding members stays with the creator
    let dan = app.register("dan").await;
    let (status, _) = app
        .post(&format!("/api/boards/{}/members", board_id), &bob.token, json!({ "userId": dan.id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A plain member cannot remove anyone
    let (status, _) = app
        .delete(&format!("/api/boards/{}/members/{}", board_id, cat.id), &bob.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, board) = app
        .post(&format!("/api/boards/{}/admins", board_id), &ada.token, json!({ "userId": bob.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["admins"], json!([bob.id]));

    // An admin can
    let (status, board) = app
        .delete(&format!("/api/boards/{}/members/{}", board_id, cat.id), &bob.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["members"], json!([bob.id]));

    // Removing a member also drops their admin grant
    let (status, board) = app
        .delete(&format!("/api/boards/{}/members/{}", board_id, bob.id), &ada.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["members"], json!([]));
    assert_eq!(board["admins"], json!([]));
}

#[tokio::test]
async fn test_creator_cannot_be_removed() {
    let app = test_app();
    let ada = app.register("ada").await;

    let (_, board) = app
        .post("/api/boards", &ada.token, json!({ "title": "Mine", "visibility": "workspace" }))
        .await;

    let (status, _) = app
        .delete(&format!("/api/boards/{}/members/{}", id_of(&board), ada.id), &ada.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_creator_deletes_board_and_delete_cascades() {
    let app = test_app();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;

    let (_, board) = app
        .post(
            "/api/boards",
            &ada.token,
            json!({ "title": "Doomed", "visibility": "workspace", "members": [bob.id] }),
        )
        .await;
    let board_id = id_of(&board);
    let (_, column) = app
        .post("/api/columns", &ada.token, json!({ "boardId": board_id, "title": "Todo" }))
        .await;
    let (_, task) = app
        .post("/api/tasks", &ada.token, json!({ "columnId": id_of(&column), "title": "Write" }))
        .await;

    let (status, _) = app.delete(&format!("/api/boards/{}", board_id), &bob.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&format!("/api/boards/{}", board_id), &ada.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);

    let (status, _) = app.get(&format!("/api/boards/{}", board_id), &ada.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let task_id = uuid::Uuid::parse_str(&id_of(&task)).expect("uuid");
    let stored = app.state.store.get_task(task_id).await.expect("store");
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_update_board_requires_creator() {
    let app = test_app();
    let ada = app.register("ada").await;
    let bob = app.register("bob").await;

    let (_, board) = app
        .post(
            "/api/boards",
            &ada.token,
            json!({ "title": "Old", "visibility": "workspace", "members": [bob.id] }),
        )
        .await;
    let uri = format!("/api/boards/{}", id_of(&board));

    let (status, _) = app.patch(&uri, &bob.token, json!({ "title": "Hijacked" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, board) = app.patch(&uri, &ada.token, json!({ "title": "New" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["title"], "New");
}

#[tokio::test]
async fn test_unknown_route_returns_json_not_found() {
    let app = test_app();
    let ada = app.register("ada").await;

    let (status, body) = app.get("/api/nowhere", &ada.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["category"], "not_found");
}

#[tokio::test]
async fn test_malformed_board_id_is_validation_error() {
    let app = test_app();
    let ada = app.register("ada").await;

    let (status, body) = app.get("/api/boards/not-a-uuid", &ada.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"], "validation");
}
