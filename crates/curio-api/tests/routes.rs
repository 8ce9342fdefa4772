use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use curio_api::{AppStateInner, router};
use curio_db::Database;

const FEATURE_SECRET: &str = "paid-promotion";

fn app() -> Router {
    router(Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
        feature_secret: Some(FEATURE_SECRET.into()),
    }))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": username, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["user_id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn submit(app: &Router, token: &str, title: &str, materials: &[&str], country: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/products",
        Some(token),
        Some(json!({
            "title": title,
            "company_name": "Studio",
            "link": "https://studio.test/p",
            "image_url": "https://studio.test/p.png",
            "country": country,
            "materials": materials,
            "collection": "Furniture",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["score"], 1);
    body["id"].as_i64().unwrap()
}

async fn score(app: &Router, product_id: i64) -> i64 {
    let (_, body) = send(app, Method::GET, &format!("/products/{product_id}"), None, None).await;
    body["score"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = app();
    let (id, token) = register(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "another pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], id);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&token),
        Some(json!({ "is_subscribed_to_newsletter": true, "email": "alice@shop.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_subscribed_to_newsletter"], true);

    let (status, _) = send(&app, Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn voting_scenario() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (bob_id, bob) = register(&app, "bob").await;
    let p = submit(&app, &alice, "Chair", &["Oak"], "Italy").await;
    let vote_uri = format!("/products/{p}/vote");

    let (status, body) = send(&app, Method::GET, &vote_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::POST, &vote_uri, None, Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::POST, &vote_uri, Some(&bob), Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], bob_id);
    assert_eq!(body["value"], 1);
    assert_eq!(score(&app, p).await, 2);

    send(&app, Method::POST, &vote_uri, Some(&bob), Some(json!({ "value": 1 }))).await;
    assert_eq!(score(&app, p).await, 2);

    send(&app, Method::POST, &vote_uri, Some(&bob), Some(json!({ "value": 0 }))).await;
    assert_eq!(score(&app, p).await, 1);

    let (status, _) = send(&app, Method::POST, &vote_uri, Some(&alice), Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(score(&app, p).await, 1);

    let (status, _) = send(&app, Method::POST, &vote_uri, Some(&bob), Some(json!({ "value": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/products/999/vote", Some(&bob), Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, &vote_uri, Some(&bob), None).await;
    assert_eq!(body["value"], 0);
    let (_, body) = send(&app, Method::GET, "/votes", Some(&bob), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(&app, Method::GET, "/votes", None, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;
    let p = submit(&app, &alice, "Chair", &["Oak"], "Italy").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/products/{p}/comments"),
        Some(&bob),
        Some(json!({ "content": "hi", "parentId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("parentId"));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/products/{p}/vote"),
        Some(&bob),
        Some(json!({ "value": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(score(&app, p).await, 1);

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/products/{p}/vote"))
        .header(header::AUTHORIZATION, format!("Bearer {bob}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_token_is_anonymous() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let p = submit(&app, &alice, "Lamp", &[], "Japan").await;

    let (status, body) = send(&app, Method::GET, &format!("/products/{p}/vote"), Some("garbage"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/products/{p}/comments"),
        Some("garbage"),
        Some(json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn comment_thread() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;
    let p = submit(&app, &alice, "Rug", &["Wool"], "Peru").await;
    let uri = format!("/products/{p}/comments");

    let mut parent: Option<i64> = None;
    let mut ids = Vec::new();
    for level in 0..7 {
        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(&bob),
            Some(json!({ "content": format!("level {level}"), "parent_id": parent })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        parent = body["id"].as_i64();
        ids.push(parent.unwrap());
    }

    let (_, flat) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(flat.as_array().unwrap().len(), 7);
    assert_eq!(flat[0]["parent_id"], Value::Null);

    let (_, thread) = send(&app, Method::GET, &format!("/products/{p}/thread"), None, None).await;
    let mut node = &thread[0];
    for (depth, id) in ids.iter().take(6).enumerate() {
        assert_eq!(node["id"], *id);
        assert_eq!(node["depth"], depth);
        if depth < 5 {
            node = &node["replies"][0];
        }
    }
    assert_eq!(node["replies"], json!([]));

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&bob),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let root = format!("/comments/{}", ids[0]);
    let (status, _) = send(&app, Method::PATCH, &root, Some(&alice), Some(json!({ "content": "mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, Method::PATCH, &root, Some(&bob), Some(json!({ "content": "edited" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");

    let (status, _) = send(&app, Method::DELETE, &root, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let leaf = format!("/comments/{}", ids[6]);
    let (status, _) = send(&app, Method::DELETE, &leaf, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn facets_and_featuring() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let first = submit(&app, &alice, "Table", &["Oak", "Steel"], "Italy").await;
    let second = submit(&app, &alice, "Shelf", &["Oak"], "Spain").await;

    let (status, body) = send(&app, Method::GET, "/facets/materials", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taxonomy"], "materials");
    assert_eq!(
        body["counts"],
        json!([{ "value": "Oak", "count": 2 }, { "value": "Steel", "count": 1 }])
    );

    let (status, _) = send(&app, Method::GET, "/facets/colours", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let featured_uri = format!("/products/{first}/featured");
    let (status, _) = send(&app, Method::POST, &featured_uri, Some(&alice), Some(json!({ "featured": true }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method(Method::POST)
        .uri(&featured_uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-feature-secret", "paid-promotioN")
        .body(Body::from(json!({ "featured": true }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method(Method::POST)
        .uri(&featured_uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-feature-secret", FEATURE_SECRET)
        .body(Body::from(json!({ "featured": true }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/facets/materials/Oak", None, None).await;
    let ids: Vec<i64> = body.as_array().unwrap().iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![first, second]);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{second}"),
        Some(&alice),
        Some(json!({ "score": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("score"));
    assert_eq!(score(&app, second).await, 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{second}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/facets/countries", None, None).await;
    assert_eq!(body["counts"], json!([{ "value": "Italy", "count": 1 }]));
}
