use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use shared::domain::WineFields;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    created: Arc<Mutex<Vec<(i64, serde_json::Value)>>>,
    patched: Arc<Mutex<Vec<serde_json::Value>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
}

fn fields(list_id: i64, name: &str) -> WineFields {
    WineFields {
        name: name.into(),
        vintage: 2016,
        price: 150.0,
        quantity: 2,
        origin: "Tuscany".into(),
        winelist_id: WineListId(list_id),
    }
}

async fn handle_list(Path(list_id): Path<i64>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "wines": [
            { "id": 10, "name": "Brunello", "vintage": 2016, "price": 150.0,
              "quantity": 2, "origin": "Tuscany", "winelist_id": list_id },
        ]
    }))
}

async fn handle_create(
    State(state): State<ServerState>,
    Path(list_id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.created.lock().await.push((list_id, body.clone()));
    let mut created = body;
    created["id"] = serde_json::json!(77);
    Json(created)
}

async fn handle_update(
    State(state): State<ServerState>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.patched.lock().await.push(body);
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_delete(
    State(state): State<ServerState>,
    Path(wine_id): Path<i64>,
) -> Json<serde_json::Value> {
    state.deleted.lock().await.push(wine_id);
    Json(serde_json::json!({ "deleted": wine_id }))
}

async fn handle_failure() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn serve(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_wine_server() -> anyhow::Result<(String, ServerState)> {
    let state = ServerState::default();
    let app = Router::new()
        .route("/wine_list/:list_id", get(handle_list))
        .route("/create_wine/:list_id", post(handle_create))
        .route("/update_wines", patch(handle_update))
        .route("/delete_wine/:wine_id", delete(handle_delete))
        .with_state(state.clone());
    Ok((serve(app).await?, state))
}

async fn spawn_failing_server() -> anyhow::Result<String> {
    let app = Router::new()
        .route("/wine_list/:list_id", get(handle_failure))
        .route("/create_wine/:list_id", post(handle_failure))
        .route("/update_wines", patch(handle_failure))
        .route("/delete_wine/:wine_id", delete(handle_failure));
    serve(app).await
}

#[tokio::test]
async fn lists_wines_from_envelope() {
    let (server_url, _state) = spawn_wine_server().await.expect("spawn server");
    let api = HttpWineApi::new(server_url);

    let wines = api.list_wines(WineListId(5)).await.expect("list");

    assert_eq!(wines.len(), 1);
    assert_eq!(wines[0].id, WineServerId(10));
    assert_eq!(wines[0].fields, fields(5, "Brunello"));
}

#[tokio::test]
async fn create_posts_flat_record_to_list_path() {
    let (server_url, state) = spawn_wine_server().await.expect("spawn server");
    let api = HttpWineApi::new(format!("{server_url}/"));

    let created = api
        .create_wine(WineListId(3), &fields(3, "Chianti"))
        .await
        .expect("create");

    assert_eq!(created.id, WineServerId(77));
    assert_eq!(created.fields.name, "Chianti");
    let created_bodies = state.created.lock().await;
    let (list_id, body) = &created_bodies[0];
    assert_eq!(*list_id, 3);
    assert_eq!(body["winelist_id"], 3);
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn update_sends_partial_patch_array() {
    let (server_url, state) = spawn_wine_server().await.expect("spawn server");
    let api = HttpWineApi::new(server_url);
    let patch = WinePatch {
        price: Some(99.0),
        ..WinePatch::new(WineServerId(10))
    };

    api.update_wines(&[patch]).await.expect("update");

    let patched = state.patched.lock().await;
    assert_eq!(patched[0], serde_json::json!([{ "id": 10, "price": 99.0 }]));
}

#[tokio::test]
async fn delete_targets_wine_path() {
    let (server_url, state) = spawn_wine_server().await.expect("spawn server");
    let api = HttpWineApi::new(server_url);

    let body = api.delete_wine(WineServerId(10)).await.expect("delete");

    assert_eq!(body["deleted"], 10);
    assert_eq!(*state.deleted.lock().await, vec![10]);
}

#[tokio::test]
async fn non_success_status_fails_every_operation() {
    let server_url = spawn_failing_server().await.expect("spawn server");
    let api = HttpWineApi::new(server_url);

    assert!(api.list_wines(WineListId(1)).await.is_err());
    assert!(api
        .create_wine(WineListId(1), &fields(1, "x"))
        .await
        .is_err());
    assert!(api.update_wines(&[]).await.is_err());
    assert!(api.delete_wine(WineServerId(1)).await.is_err());
}

#[tokio::test]
async fn unreachable_server_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = HttpWineApi::new(format!("http://{addr}"));

    assert!(api.list_wines(WineListId(1)).await.is_err());
}

#[test]
fn base_url_drops_trailing_slash() {
    assert_eq!(
        HttpWineApi::new("http://127.0.0.1:5000/").base_url(),
        "http://127.0.0.1:5000"
    );
    assert_eq!(HttpWineApi::default().base_url(), DEFAULT_API_BASE_URL);
}
