mod common;

use api::gql::build_schema;
use common::*;
use infra::models::Role;
use serde_json::json;

const APPLY: &str = r#"
    mutation Apply($input: OrganizerApplicationInput!) {
        applyForOrganizer(input: $input) { id status userEmail reason }
    }
"#;
const APPROVE: &str = r#"
    mutation Approve($id: ID!) {
        approveOrganizerApplication(id: $id) {
            application { status processedBy }
            promotedUser { id role }
        }
    }
"#;

fn application() -> serde_json::Value {
    json!({ "input": {
        "reason": "地元で練習会を開きたい",
        "experience": "競技歴5年",
        "location": "茅ヶ崎",
        "frequency": "毎週土曜",
    }})
}

#[tokio::test]
async fn approval_promotes_the_applicant() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let applicant = create_test_user(&state, "kenta@example.jp", Role::Participant).await;
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;

    let data = graphql_ok(&schema, APPLY, application(), Some(&applicant)).await;
    assert_eq!(data["applyForOrganizer"]["status"], "PENDING");
    let id = data["applyForOrganizer"]["id"].clone();

    let pending = graphql_ok(
        &schema,
        "{ organizerApplications(status: PENDING) { id userEmail } }",
        json!({}),
        Some(&admin),
    )
    .await;
    assert_eq!(pending["organizerApplications"][0]["userEmail"], "kenta@example.jp");

    let data = graphql_ok(&schema, APPROVE, json!({ "id": id }), Some(&admin)).await;
    let decision = &data["approveOrganizerApplication"];
    assert_eq!(decision["application"]["status"], "APPROVED");
    assert_eq!(decision["promotedUser"]["role"], "ORGANIZER");

    // the applicant's next session carries the new role
    let users = graphql_ok(&schema, "{ users(role: ORGANIZER) { email } }", json!({}), Some(&admin)).await;
    assert_eq!(users["users"], json!([{ "email": "kenta@example.jp" }]));

    let again = graphql_err(&schema, APPROVE, json!({ "id": id }), Some(&admin)).await;
    assert!(again.contains("approved"), "{again}");
}

#[tokio::test]
async fn rejection_leaves_the_role_alone() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let applicant = create_test_user(&state, "yui@example.jp", Role::Participant).await;
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;

    let data = graphql_ok(&schema, APPLY, application(), Some(&applicant)).await;
    let id = data["applyForOrganizer"]["id"].clone();

    let data = graphql_ok(
        &schema,
        r#"mutation R($id: ID!) { rejectOrganizerApplication(id: $id) { application { status } promotedUser { id } } }"#,
        json!({ "id": id }),
        Some(&admin),
    )
    .await;
    assert_eq!(data["rejectOrganizerApplication"]["application"]["status"], "REJECTED");
    assert!(data["rejectOrganizerApplication"]["promotedUser"].is_null());

    let mine = graphql_ok(&schema, "{ myOrganizerApplications { status } }", json!({}), Some(&applicant)).await;
    assert_eq!(mine["myOrganizerApplications"], json!([{ "status": "REJECTED" }]));
}

#[tokio::test]
async fn one_pending_application_per_user() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let applicant = create_test_user(&state, "sora@example.jp", Role::Participant).await;

    graphql_ok(&schema, APPLY, application(), Some(&applicant)).await;
    let message = graphql_err(&schema, APPLY, application(), Some(&applicant)).await;
    assert!(message.contains("pending"), "{message}");
}

#[tokio::test]
async fn organizers_cannot_apply_and_participants_cannot_review() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let organizer = create_test_user(&state, "org@example.jp", Role::Organizer).await;
    let participant = create_test_user(&state, "p@example.jp", Role::Participant).await;

    let message = graphql_err(&schema, APPLY, application(), Some(&organizer)).await;
    assert!(message.contains("already"), "{message}");

    let denied = graphql_err(&schema, "{ organizerApplications { id } }", json!({}), Some(&participant)).await;
    assert!(denied.starts_with("forbidden"), "{denied}");
}

#[tokio::test]
async fn empty_reason_is_rejected() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let applicant = create_test_user(&state, "empty@example.jp", Role::Participant).await;

    let message = graphql_err(&schema, APPLY, json!({ "input": { "reason": "  " } }), Some(&applicant)).await;
    assert!(message.contains("reason"), "{message}");
}
