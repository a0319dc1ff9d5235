mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use autojudge::routes::build_router;
use autojudge::state::AppState;
use autojudge::train;

fn app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("problems.jsonl");
    common::write_dataset(&data);

    let mut cfg = common::small_config();
    cfg.model.dir = dir.path().join("processed");
    cfg.server.static_dir = dir.path().join("static");
    std::fs::create_dir_all(&cfg.server.static_dir).unwrap();
    std::fs::write(cfg.server.static_dir.join("index.html"), "<h1>AutoJudge</h1>").unwrap();
    train::run(&data, &cfg.model.dir, &cfg).unwrap();

    let state = Arc::new(AppState::load(cfg).unwrap());
    (dir, build_router(state))
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_analyze(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health() {
    let (_dir, app) = app();
    let res = app
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn analyze_returns_a_verdict() {
    let (_dir, app) = app();
    let res = app
        .oneshot(post_analyze(serde_json::json!({
            "description": "Find the shortest path in a weighted graph using dijkstra",
            "input_description": "n m then m edges",
            "output_description": "the distance"
        })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let v = body_json(res).await;
    let label = v["label"].as_str().unwrap();
    assert!(["easy", "medium", "hard"].contains(&label));
    assert_eq!(v["display"].as_str().unwrap(), label.to_uppercase());
    let score = v["score"].as_f64().unwrap();
    assert_eq!(v["score_text"].as_str().unwrap(), format!("{score:.2}"));
    assert!((v["progress"].as_f64().unwrap() - score / 10.0).abs() < 1e-12);
}

#[tokio::test]
async fn blank_description_gets_a_warning() {
    let (_dir, app) = app();
    let res = app
        .oneshot(post_analyze(serde_json::json!({
            "description": "   ",
            "input_description": "something"
        })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(res).await["warning"],
        "Please enter a problem description before analyzing."
    );
}

#[tokio::test]
async fn model_info_describes_the_bundle() {
    let (_dir, app) = app();
    let res = app
        .oneshot(Request::builder().uri("/api/v1/model").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    assert_eq!(v["classes"], serde_json::json!(["easy", "hard", "medium"]));
    assert_eq!(v["classifier_trees"], 15);
    assert_eq!(
        v["n_features"].as_u64().unwrap(),
        v["vocabulary"].as_u64().unwrap() + 9
    );
}

#[tokio::test]
async fn unknown_paths_fall_back_to_the_dashboard() {
    let (_dir, app) = app();
    let res = app
        .oneshot(Request::builder().uri("/some/page").body(Body::empty()).unwrap())
        .await
        .unwrap();
    // ServeDir's not-found service answers with the index page under a 404.
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("AutoJudge"));
}
