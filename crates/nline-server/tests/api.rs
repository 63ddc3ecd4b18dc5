//! End-to-end tests of the HTTP API against the in-process router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use nline_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, alias: &str) -> String {
    let (status, body) = send(app, "POST", "/devices", Some(json!({ "alias": alias }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["device_id"].as_str().unwrap().to_string()
}

/// Pair two fresh devices; returns (x, o, match_id).
async fn start_match(app: &Router, size: usize) -> (String, String, String) {
    let d1 = register(app, "P1").await;
    let d2 = register(app, "P2").await;
    let (status, _) = send(app, "POST", "/matches", Some(json!({"device_id": d1, "size": size}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, body) = send(app, "POST", "/matches", Some(json!({"device_id": d2, "size": size}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let players = body["players"].as_object().unwrap();
    let x = players.iter().find(|(_, m)| *m == "X").unwrap().0.clone();
    let o = players.iter().find(|(_, m)| *m == "O").unwrap().0.clone();
    (x, o, body["match_id"].as_str().unwrap().to_string())
}

async fn play(app: &Router, match_id: &str, device: &str, x: usize, y: usize) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/matches/{match_id}/moves"),
        Some(json!({"device_id": device, "x": x, "y": y})),
    )
    .await
}

#[tokio::test]
async fn register_and_list_devices() {
    let app = router(AppState::default());
    let id = register(&app, "TestDev").await;

    let (status, body) = send(&app, "GET", "/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["connected_devices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![id.as_str()]);
}

#[tokio::test]
async fn register_without_body() {
    let app = router(AppState::default());
    let (status, body) = send(&app, "POST", "/devices", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["device_id"].as_str().unwrap();

    let (_, info) = send(&app, "GET", &format!("/devices/{id}/info"), None).await;
    assert_eq!(info["alias"], &id[..8]);
}

#[tokio::test]
async fn inactive_device_is_disconnected() {
    let state = AppState::default();
    let stale = state
        .lobby
        .write()
        .await
        .register(None, Utc::now() - chrono::Duration::minutes(6));
    let app = router(state);

    let (status, body) = send(&app, "GET", &format!("/devices/{stale}/info"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("device not found"));

    let (_, body) = send(&app, "GET", "/devices", None).await;
    assert!(body["connected_devices"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn device_info_for_connected_device() {
    let app = router(AppState::default());
    let id = register(&app, "A").await;
    let (status, body) = send(&app, "GET", &format!("/devices/{id}/info"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);
    assert_eq!(body["wins"], 0);
    assert_eq!(body["ratio"], 0.0);
}

#[tokio::test]
async fn match_making_pairs_same_size() {
    let app = router(AppState::default());
    let d1 = register(&app, "TestDev1").await;
    let d2 = register(&app, "TestDev2").await;
    let d3 = register(&app, "TestDev3").await;

    let (status, body) = send(&app, "POST", "/matches", Some(json!({"device_id": d1, "size": 5}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].as_str().unwrap().starts_with("Waiting for an opponent"));

    let (status, _) = send(&app, "POST", "/matches", Some(json!({"device_id": d2, "size": 3}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = send(&app, "POST", "/matches", Some(json!({"device_id": d3, "size": 5}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["board_size"], 5);
    let players = body["players"].as_object().unwrap();
    assert!(players.contains_key(&d1) && players.contains_key(&d3));
    assert!(!players.contains_key(&d2));
    assert_eq!(players[&d3], "X");

    let match_id = body["match_id"].as_str().unwrap();
    let (_, state) = send(&app, "GET", &format!("/matches/{match_id}"), None).await;
    assert_eq!(state["board"].as_array().unwrap().len(), 5);
    assert_eq!(state["turn"], d3.as_str());

    let (_, status) = send(&app, "GET", &format!("/matches/waiting-status?device_id={d2}"), None).await;
    assert_eq!(status, json!({"status": "waiting", "board_size": 3}));

    let (_, status) = send(&app, "GET", &format!("/matches/waiting-status?device_id={d1}"), None).await;
    assert_eq!(status["status"], "matched");
    assert_eq!(status["match_id"], match_id);
}

#[tokio::test]
async fn match_request_validation() {
    let app = router(AppState::default());
    let (status, _) = send(&app, "POST", "/matches", Some(json!({"device_id": "ghost"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/matches", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/matches/waiting-status", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = register(&app, "A").await;
    let (status, body) = send(&app, "GET", &format!("/matches/waiting-status?device_id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "idle"}));

    send(&app, "POST", "/matches", Some(json!({"device_id": id}))).await;
    let (status, body) = send(&app, "POST", "/matches", Some(json!({"device_id": id}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].as_str().unwrap().starts_with("Already waiting"));
}

#[tokio::test]
async fn move_changes_turn() {
    let app = router(AppState::default());
    let (x, o, match_id) = start_match(&app, 3).await;

    let (status, body) = play(&app, &match_id, &x, 0, 0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next_turn"], o.as_str());
    assert_eq!(body["board"][0][0], "X");
    assert!(body["winner"].is_null());
}

#[tokio::test]
async fn move_rejections() {
    let app = router(AppState::default());
    let (x, o, match_id) = start_match(&app, 3).await;

    let (status, _) = play(&app, &match_id, &o, 0, 0).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = play(&app, &match_id, &x, 3, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    play(&app, &match_id, &x, 0, 0).await;
    let (status, body) = play(&app, &match_id, &o, 0, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("occupied"));

    let (status, _) = play(&app, "no-such-match", &o, 1, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/matches/{match_id}/moves"),
        Some(json!({"device_id": o})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_returns_full_state() {
    let app = router(AppState::default());
    let (x, o, match_id) = start_match(&app, 3).await;

    let (status, body) = send(&app, "GET", &format!("/matches/{match_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let mut keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["board", "players", "size", "turn", "winner"]);
    assert_eq!(body["players"][&x], "X");
    assert_eq!(body["players"][&o], "O");
    assert_eq!(body["size"], 3);
}

#[tokio::test]
async fn full_game_x_wins_and_stats() {
    let app = router(AppState::default());
    let (x, o, match_id) = start_match(&app, 3).await;

    for (device, r, c) in [(&x, 0, 0), (&o, 1, 0), (&x, 0, 1), (&o, 1, 1)] {
        let (status, _) = play(&app, &match_id, device, r, c).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = play(&app, &match_id, &x, 0, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner"], "X");
    assert!(body["next_turn"].is_null());

    let (status, _) = play(&app, &match_id, &o, 2, 2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats_x) = send(&app, "GET", &format!("/devices/{x}/info"), None).await;
    assert_eq!((stats_x["wins"].as_u64(), stats_x["losses"].as_u64()), (Some(1), Some(0)));
    assert_eq!(stats_x["ratio"], 1.0);
    let (_, stats_o) = send(&app, "GET", &format!("/devices/{o}/info"), None).await;
    assert_eq!((stats_o["wins"].as_u64(), stats_o["losses"].as_u64()), (Some(0), Some(1)));
    assert_eq!(stats_o["ratio"], 0.0);
}

#[tokio::test]
async fn full_game_draw() {
    let app = router(AppState::default());
    let (x, o, match_id) = start_match(&app, 3).await;

    let moves = [
        (&x, 0, 0),
        (&o, 0, 1),
        (&x, 0, 2),
        (&o, 1, 1),
        (&x, 1, 0),
        (&o, 1, 2),
        (&x, 2, 1),
        (&o, 2, 0),
        (&x, 2, 2),
    ];
    for (device, r, c) in moves {
        let (status, _) = play(&app, &match_id, device, r, c).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, state) = send(&app, "GET", &format!("/matches/{match_id}"), None).await;
    assert_eq!(state["winner"], "Draw");
    assert_eq!(
        state["board"],
        json!([["X", "O", "X"], ["X", "O", "O"], ["O", "X", "X"]])
    );

    for id in [&x, &o] {
        let (_, stats) = send(&app, "GET", &format!("/devices/{id}/info"), None).await;
        assert_eq!(stats["wins"], 0);
        assert_eq!(stats["losses"], 0);
    }
}

#[tokio::test]
async fn surrender_ends_match() {
    let app = router(AppState::default());
    let (x, o, match_id) = start_match(&app, 4).await;
    let uri = format!("/matches/{match_id}/surrender");

    let (status, _) = send(&app, "POST", &uri, Some(json!({"device_id": "stranger"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", &uri, Some(json!({"device_id": x}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner"], "O");

    let (status, _) = send(&app, "POST", &uri, Some(json!({"device_id": o}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = send(&app, "GET", &format!("/devices/{o}/info"), None).await;
    assert_eq!(stats["wins"], 1);
}

#[tokio::test]
async fn health_check() {
    let app = router(AppState::default());
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn out_of_range_sizes_queue_on_smallest_board() {
    let app = router(AppState::default());
    for size in [json!(-2), json!(0)] {
        let device = register(&app, "small").await;
        let (status, body) =
            send(&app, "POST", "/matches", Some(json!({"device_id": device, "size": size}))).await;
        if status == StatusCode::ACCEPTED {
            assert!(body["message"].as_str().unwrap().contains("3x3"), "{body}");
            let (_, waiting) = send(
                &app,
                "GET",
                &format!("/matches/waiting-status?device_id={device}"),
                None,
            )
            .await;
            assert_eq!(waiting, json!({"status": "waiting", "board_size": 3}));
        } else {
            // The second device pairs with the first one on the same clamped size
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["board_size"], 3);
        }
    }
}

#[tokio::test]
async fn numeric_string_size_is_accepted() {
    let app = router(AppState::default());
    let device = register(&app, "text").await;
    let (status, body) =
        send(&app, "POST", "/matches", Some(json!({"device_id": device, "size": "5"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].as_str().unwrap().contains("5x5"));
}

#[tokio::test]
async fn bad_size_with_device_id_is_reported_as_such() {
    let app = router(AppState::default());
    let device = register(&app, "bad").await;
    let (status, body) =
        send(&app, "POST", "/matches", Some(json!({"device_id": device, "size": "huge"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("invalid size"), "{message}");

    let (status, body) = send(&app, "POST", "/matches", Some(json!({"size": 3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid or unregistered device_id");
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let app = router(AppState::default());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/matches")
        .header("origin", "http://phone.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST") && methods.contains("GET"), "{methods}");
    let allowed = headers["access-control-allow-headers"].to_str().unwrap();
    assert!(allowed.contains("content-type"), "{allowed}");
}

#[tokio::test]
async fn malformed_move_body_is_bad_request() {
    let app = router(AppState::default());
    let (_, _, match_id) = start_match(&app, 3).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/matches/{match_id}/moves"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(!body["message"].as_str().unwrap().is_empty());
}
