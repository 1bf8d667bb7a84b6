//! HTTP API tests against a server spawned on an ephemeral port.

mod common;

use common::{client, spawn_server, spawn_with, RUY_LOPEZ, SCHOLARS_MATE};
use serde_json::{json, Value};
use viewer_server::config::Config;

async fn upload(server: &common::TestServer, pgn: &str) -> Value {
    let resp = client()
        .post(server.url("/api/libraries"))
        .json(&json!({ "pgn": pgn }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = spawn_server().await;
    let body: Value = client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["libraries"], 0);
}

#[tokio::test]
async fn test_upload_and_describe_game() {
    let server = spawn_server().await;
    let library = upload(&server, RUY_LOPEZ).await;
    let id = library["id"].as_u64().unwrap();
    assert_eq!(library["games"][0]["displayName"], "Alice vs Bob (Casual)");
    assert_eq!(library["games"][0]["moveCount"], 6);
    assert_eq!(library["games"][0]["result"], "Draw");

    let game: Value = client()
        .get(server.url(&format!("/api/libraries/{id}/games/0")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(game["whiteLabel"], "Alice (2100)");
    assert_eq!(game["moves"][1]["label"], "1... e5");
    assert_eq!(game["illegalMove"], Value::Null);

    let listed: Value = client()
        .get(server.url("/api/libraries"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_pgn_is_rejected() {
    let server = spawn_server().await;
    let resp = client()
        .post(server.url("/api/libraries"))
        .json(&json!({ "pgn": "this is not a game" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "no valid games found");
}

#[tokio::test]
async fn test_oversized_pgn_is_rejected() {
    let server = spawn_with(Config {
        max_pgn_bytes: 16,
        ..Config::default()
    })
    .await;
    let resp = client()
        .post(server.url("/api/libraries"))
        .json(&json!({ "pgn": RUY_LOPEZ }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
}

#[tokio::test]
async fn test_snapshot_endpoint() {
    let server = spawn_server().await;
    let id = upload(&server, SCHOLARS_MATE).await["id"].as_u64().unwrap();
    let base = format!("/api/libraries/{id}/games/0/snapshot");

    let start: Value = client().get(server.url(&base)).send().await.unwrap().json().await.unwrap();
    assert_eq!(start["ply"], -1);
    assert_eq!(start["lastMove"], Value::Null);

    let mate: Value = client()
        .get(server.url(&format!("{base}?ply=6")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mate["inCheckmate"], true);
    assert_eq!(mate["kingSquare"], "e8");
    assert_eq!(mate["lastMove"]["to"], "f7");
    assert_eq!(mate["captured"]["black"], json!(["p"]));

    let clamped: Value = client()
        .get(server.url(&format!("{base}?ply=500")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(clamped, mate);
}

#[tokio::test]
async fn test_evaluation_endpoint() {
    let server = spawn_server().await;
    let id = upload(&server, SCHOLARS_MATE).await["id"].as_u64().unwrap();
    let series: Value = client()
        .get(server.url(&format!("/api/libraries/{id}/games/0/evaluation?ply=2")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let points = series.as_array().unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(points[2]["isCurrent"], true);
    assert_eq!(points[0]["quality"], "neutral");
}

#[tokio::test]
async fn test_unknown_library_and_game() {
    let server = spawn_server().await;
    let resp = client().get(server.url("/api/libraries/42")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Library not found");

    let id = upload(&server, SCHOLARS_MATE).await["id"].as_u64().unwrap();
    let resp = client()
        .get(server.url(&format!("/api/libraries/{id}/games/3/snapshot")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
