use api::auth::Session;
use api::config::AppConfig;
use api::gql::AppSchema;
use api::AppState;
use async_graphql::{Request, Variables};
use chrono::{DateTime, TimeZone, Utc};
use infra::models::Role;
use infra::repos::{NewUser, UserRepo};
use infra::{Clock, LocalStore};

pub const TEST_JWT_SECRET: &str = "volley-test-secret";

/// 2027-05-01 12:00 in Japan. Every seed event is still ahead.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2027, 5, 1, 3, 0, 0).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig::local(TEST_JWT_SECRET)
}

/// In-memory store, no database, pinned clock.
pub fn setup_test_state() -> AppState {
    setup_state_with(test_config())
}

pub fn setup_state_with(config: AppConfig) -> AppState {
    AppState::from_parts(config, LocalStore::in_memory(), None, Clock::Fixed(fixed_now()))
}

/// Helper function to execute GraphQL queries and mutations
pub async fn execute_graphql(
    schema: &AppSchema,
    query: &str,
    variables: Option<Variables>,
    session: Option<&Session>,
) -> async_graphql::Response {
    let mut request = Request::new(query);

    if let Some(vars) = variables {
        request = request.variables(vars);
    }

    if let Some(session) = session {
        request = request.data(session.clone());
    }

    schema.execute(request).await
}

/// Runs the request and returns its data, failing the test on any error.
#[allow(dead_code)]
pub async fn graphql_ok(
    schema: &AppSchema,
    query: &str,
    variables: serde_json::Value,
    session: Option<&Session>,
) -> serde_json::Value {
    let response = execute_graphql(schema, query, Some(Variables::from_json(variables)), session).await;
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

/// First error message of a request expected to fail.
#[allow(dead_code)]
pub async fn graphql_err(
    schema: &AppSchema,
    query: &str,
    variables: serde_json::Value,
    session: Option<&Session>,
) -> String {
    let response = execute_graphql(schema, query, Some(Variables::from_json(variables)), session).await;
    assert!(!response.errors.is_empty(), "expected an error, got {:?}", response.data);
    response.errors[0].message.clone()
}

/// Create test user and return a session acting as them
#[allow(dead_code)]
pub async fn create_test_user(state: &AppState, email: &str, role: Role) -> Session {
    let user = UserRepo::new(state.store.clone())
        .create(
            NewUser {
                email: email.to_string(),
                name: format!("test {email}"),
                password_hash: None,
                role,
            },
            state.now(),
        )
        .await
        .expect("Failed to create test user");

    Session { user, demo: false }
}

pub const CREATE_EVENT: &str = r#"
    mutation Create($input: CreateEventInput!) {
        createEvent(input: $input) { id name date region isNew creatorId status }
    }
"#;

/// Create an event as `organizer` and return its id.
#[allow(dead_code)]
pub async fn create_test_event(
    schema: &AppSchema,
    organizer: &Session,
    name: &str,
    event_date: &str,
    max_participants: Option<i32>,
) -> String {
    let data = graphql_ok(
        schema,
        CREATE_EVENT,
        serde_json::json!({
            "input": {
                "name": name,
                "eventType": "PRACTICE",
                "eventDate": event_date,
                "startTime": "09:00",
                "endTime": "12:00",
                "venue": "片瀬西浜",
                "prefecture": "神奈川県",
                "maxParticipants": max_participants,
                "entryFee": 500,
                "beginnerFriendly": true,
            }
        }),
        Some(organizer),
    )
    .await;
    data["createEvent"]["id"].as_str().unwrap().to_string()
}
