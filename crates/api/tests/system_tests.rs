mod common;

use api::app::build_router;
use api::gql::build_schema;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::*;
use http_body_util::BodyExt;
use infra::models::Role;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(state: api::AppState) -> Router {
    let schema = build_schema(state.clone());
    build_router(state, schema)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_server_time_query() {
    let schema = build_schema(setup_test_state());
    let data = graphql_ok(&schema, "{ serverTime }", json!({}), None).await;
    let time = data["serverTime"].as_str().unwrap();
    assert!(time.starts_with("2027-05-01T03:00:00"), "{time}");
}

#[tokio::test]
async fn test_invalid_query() {
    let schema = build_schema(setup_test_state());
    let response = execute_graphql(&schema, "{ noSuchField }", None, None).await;
    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn anonymous_callers_have_no_identity_or_capabilities() {
    let schema = build_schema(setup_test_state());
    let data = graphql_ok(&schema, "{ me { id } myCapabilities }", json!({}), None).await;
    assert!(data["me"].is_null());
    assert_eq!(data["myCapabilities"], json!([]));
}

#[tokio::test]
async fn capabilities_follow_the_role() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let organizer = create_test_user(&state, "org@example.jp", Role::Organizer).await;

    let data = graphql_ok(&schema, "{ me { role } myCapabilities }", json!({}), Some(&organizer)).await;
    assert_eq!(data["me"]["role"], "ORGANIZER");
    let caps: Vec<&str> = data["myCapabilities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert!(caps.contains(&"CREATE_EVENTS"));
    assert!(caps.contains(&"REQUEST_PARTICIPATION"));
    assert!(!caps.contains(&"MANAGE_ALL_EVENTS"));
}

#[tokio::test]
async fn settings_start_from_defaults_and_persist_changes() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let user = create_test_user(&state, "u@example.jp", Role::Participant).await;

    let data = graphql_ok(
        &schema,
        "{ notificationSettings { emailOnRequest newsDigest } privacySettings { showProfile } }",
        json!({}),
        Some(&user),
    )
    .await;
    assert_eq!(data["notificationSettings"], json!({ "emailOnRequest": true, "newsDigest": false }));
    assert_eq!(data["privacySettings"]["showProfile"], true);

    graphql_ok(
        &schema,
        "mutation { updateNotificationSettings(input: { newsDigest: true }) { newsDigest } updatePrivacySettings(input: { showProfile: false }) { showProfile } }",
        json!({}),
        Some(&user),
    )
    .await;

    let data = graphql_ok(
        &schema,
        "{ notificationSettings { emailOnRequest newsDigest } privacySettings { showProfile } }",
        json!({}),
        Some(&user),
    )
    .await;
    assert_eq!(data["notificationSettings"], json!({ "emailOnRequest": true, "newsDigest": true }));
    assert_eq!(data["privacySettings"]["showProfile"], false);
}

#[tokio::test]
async fn favorites_toggle_on_and_off() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let user = create_test_user(&state, "fan@example.jp", Role::Participant).await;

    let listing = graphql_ok(&schema, "{ events { events { id name } } }", json!({}), None).await;
    let event = &listing["events"]["events"][0];
    let toggle = "mutation T($id: ID!) { toggleFavorite(eventId: $id) }";

    let on = graphql_ok(&schema, toggle, json!({ "id": event["id"] }), Some(&user)).await;
    assert_eq!(on["toggleFavorite"], true);
    let favorites = graphql_ok(&schema, "{ favoriteEvents { name } }", json!({}), Some(&user)).await;
    assert_eq!(favorites["favoriteEvents"], json!([{ "name": event["name"] }]));

    let off = graphql_ok(&schema, toggle, json!({ "id": event["id"] }), Some(&user)).await;
    assert_eq!(off["toggleFavorite"], false);

    let missing = graphql_err(&schema, toggle, json!({ "id": uuid::Uuid::new_v4().to_string() }), Some(&user)).await;
    assert!(missing.starts_with("not found"), "{missing}");
}

#[tokio::test]
async fn register_login_and_query_with_the_token() {
    let app = router(setup_test_state());

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "Aoi@Example.jp", "password": "beach2027", "name": "葵" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "aoi@example.jp");
    assert_eq!(body["user"]["role"], "participant");

    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "aoi@example.jp", "password": "beach2027", "name": "葵" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        post_json("/auth/login", json!({ "email": "aoi@example.jp", "password": "wrong-pass1" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        post_json("/auth/login", json!({ "email": "aoi@example.jp", "password": "beach2027" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, post_json("/graphql", json!({ "query": "{ me { email name } }" }), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"], json!({ "email": "aoi@example.jp", "name": "葵" }));

    // a forged token leaves the caller anonymous
    let (_, body) = send(&app, post_json("/graphql", json!({ "query": "{ me { email } }" }), Some("not-a-token"))).await;
    assert!(body["data"]["me"].is_null());
}

#[tokio::test]
async fn configured_super_admin_can_hand_out_roles() {
    let mut config = test_config();
    config.super_admin_email = Some("root@example.jp".into());
    let app = router(setup_state_with(config));

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "Root@Example.jp", "password": "beach2027", "name": "管理者" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "super_admin");
    let root_token = body["token"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "email": "staff@example.jp", "password": "beach2027", "name": "スタッフ" }),
            None,
        ),
    )
    .await;
    assert_eq!(body["user"]["role"], "participant");
    let staff_id = body["user"]["id"].as_str().unwrap().to_string();

    let set_role = json!({
        "query": "mutation S($id: ID!, $role: Role!) { setUserRole(userId: $id, role: $role) { email role } }",
        "variables": { "id": staff_id, "role": "ADMIN" },
    });
    let (status, body) = send(&app, post_json("/graphql", set_role, Some(&root_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["setUserRole"], json!({ "email": "staff@example.jp", "role": "ADMIN" }));
}

#[tokio::test]
async fn existing_account_is_promoted_at_startup() {
    let mut config = test_config();
    config.super_admin_email = Some("root@example.jp".into());
    let state = setup_state_with(config);
    create_test_user(&state, "root@example.jp", Role::Participant).await;

    state.bootstrap_super_admin().await.unwrap();

    let user = infra::repos::UserRepo::new(state.store.clone())
        .get_by_email("root@example.jp")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::SuperAdmin);
}

#[tokio::test]
async fn weak_passwords_are_refused() {
    let app = router(setup_test_state());
    let (status, body) = send(
        &app,
        post_json("/auth/register", json!({ "email": "x@example.jp", "password": "short", "name": "x" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn demo_mode_acts_as_the_demo_user() {
    let mut config = test_config();
    config.demo_mode = true;
    let app = router(setup_state_with(config));

    let query = json!({ "query": "{ me { email role } }" });
    let (_, first) = send(&app, post_json("/graphql", query.clone(), None)).await;
    assert_eq!(first["data"]["me"]["role"], "PARTICIPANT");
    assert_eq!(first["data"]["me"]["email"], infra::repos::users::DEMO_EMAIL);

    // the same demo user on every request
    let (_, second) = send(&app, post_json("/graphql", json!({ "query": "{ me { id } }" }), None)).await;
    let (_, third) = send(&app, post_json("/graphql", json!({ "query": "{ me { id } }" }), None)).await;
    assert_eq!(second["data"]["me"]["id"], third["data"]["me"]["id"]);
}

#[tokio::test]
async fn demo_events_stay_local() {
    let mut config = test_config();
    config.demo_mode = true;
    let state = setup_state_with(config);
    let app = router(state.clone());

    // promote the demo user so it can create events
    let demo = infra::repos::UserRepo::new(state.store.clone())
        .ensure_demo_user(state.now())
        .await
        .unwrap();
    infra::repos::UserRepo::new(state.store.clone())
        .set_role(demo.id, Role::Organizer, state.now())
        .await
        .unwrap();

    let create = json!({
        "query": r#"mutation { createEvent(input: { name: "デモ練習", eventType: PRACTICE, eventDate: "2027-06-01", venue: "砂浜", prefecture: "千葉県" }) { id creatorId } }"#,
    });
    let (_, body) = send(&app, post_json("/graphql", create, None)).await;
    assert_eq!(body["data"]["createEvent"]["creatorId"], demo.id.to_string());

    let stored: Vec<infra::models::Event> = state.store.list().await.unwrap();
    assert!(stored.iter().any(|e| e.name == "デモ練習"));
}

#[tokio::test]
async fn health_reports_storage() {
    let app = router(setup_test_state());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "store": "ok", "database": "disabled" }));
}
