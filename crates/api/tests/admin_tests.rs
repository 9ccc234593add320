mod common;

use api::gql::build_schema;
use common::*;
use infra::models::Role;
use serde_json::json;

#[tokio::test]
async fn announcements_are_capped_at_ten() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;
    let create = r#"
        mutation A($title: String!) {
            createAnnouncement(input: { title: $title, content: "本文", category: EVENT }) { id category isActive }
        }
    "#;

    for i in 1..=11 {
        let data = graphql_ok(&schema, create, json!({ "title": format!("お知らせ{i}") }), Some(&admin)).await;
        assert_eq!(data["createAnnouncement"]["category"], "EVENT");
    }

    let data = graphql_ok(&schema, "{ announcements { title } }", json!({}), None).await;
    assert_eq!(data["announcements"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn hidden_announcements_leave_the_public_list() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;

    let data = graphql_ok(
        &schema,
        r#"mutation { createAnnouncement(input: { title: "メンテナンス", content: "深夜に停止します" }) { id } }"#,
        json!({}),
        Some(&admin),
    )
    .await;
    let id = data["createAnnouncement"]["id"].clone();

    graphql_ok(
        &schema,
        "mutation H($id: ID!) { setAnnouncementActive(id: $id, active: false) { isActive } }",
        json!({ "id": id }),
        Some(&admin),
    )
    .await;

    let public = graphql_ok(&schema, "{ announcements { id } }", json!({}), None).await;
    assert!(public["announcements"].as_array().unwrap().is_empty());
    let all = graphql_ok(&schema, "{ allAnnouncements { id isActive } }", json!({}), Some(&admin)).await;
    assert_eq!(all["allAnnouncements"][0]["isActive"], false);
}

#[tokio::test]
async fn drafts_stay_private_until_published() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;

    let data = graphql_ok(
        &schema,
        r#"mutation { createNews(input: { title: "大会結果", body: "優勝は…", category: TOURNAMENT }) { id isPublished publishedAt } }"#,
        json!({}),
        Some(&admin),
    )
    .await;
    assert_eq!(data["createNews"]["isPublished"], false);
    assert!(data["createNews"]["publishedAt"].is_null());
    let id = data["createNews"]["id"].clone();

    let article = "query N($id: ID!) { newsArticle(id: $id) { title } }";
    let hidden = graphql_ok(&schema, article, json!({ "id": id }), None).await;
    assert!(hidden["newsArticle"].is_null());
    let visible = graphql_ok(&schema, article, json!({ "id": id }), Some(&admin)).await;
    assert_eq!(visible["newsArticle"]["title"], "大会結果");

    graphql_ok(
        &schema,
        "mutation P($id: ID!) { setNewsPublished(id: $id, published: true) { isPublished } }",
        json!({ "id": id }),
        Some(&admin),
    )
    .await;
    let data = graphql_ok(&schema, "{ news { title publishedAt } }", json!({}), None).await;
    assert_eq!(data["news"][0]["title"], "大会結果");
    assert!(data["news"][0]["publishedAt"].is_string());
}

#[tokio::test]
async fn venues_are_deactivated_not_removed() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;

    let data = graphql_ok(
        &schema,
        r#"mutation {
            createVenue(input: { name: "須磨海岸", address: "神戸市須磨区", prefecture: "兵庫県", facilities: ["シャワー", " 駐車場 "] }) {
                id region facilities
            }
        }"#,
        json!({}),
        Some(&admin),
    )
    .await;
    assert_eq!(data["createVenue"]["region"], "KINKI");
    let id = data["createVenue"]["id"].clone();

    let listed = graphql_ok(&schema, r#"{ venues(prefecture: "兵庫県") { name } }"#, json!({}), None).await;
    assert_eq!(listed["venues"], json!([{ "name": "須磨海岸" }]));

    graphql_ok(
        &schema,
        "mutation D($id: ID!) { setVenueActive(id: $id, active: false) { isActive } }",
        json!({ "id": id }),
        Some(&admin),
    )
    .await;
    let listed = graphql_ok(&schema, "{ venues { name } }", json!({}), None).await;
    assert!(listed["venues"].as_array().unwrap().is_empty());
    let all = graphql_ok(&schema, "{ allVenues { name isActive } }", json!({}), Some(&admin)).await;
    assert_eq!(all["allVenues"], json!([{ "name": "須磨海岸", "isActive": false }]));
}

#[tokio::test]
async fn anonymous_inquiries_reach_admins() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;

    let data = graphql_ok(
        &schema,
        r#"mutation {
            submitInquiry(input: { name: "佐藤", email: "sato@example.jp", subject: "駐車場", message: "ありますか？" }) {
                id status category
            }
        }"#,
        json!({}),
        None,
    )
    .await;
    assert_eq!(data["submitInquiry"]["status"], "OPEN");
    let id = data["submitInquiry"]["id"].clone();

    let denied = graphql_err(&schema, "{ inquiries { id } }", json!({}), None).await;
    assert!(denied.starts_with("unauthorized"), "{denied}");

    graphql_ok(
        &schema,
        "mutation S($id: ID!) { setInquiryStatus(id: $id, status: IN_PROGRESS) { status } }",
        json!({ "id": id }),
        Some(&admin),
    )
    .await;
    let data = graphql_ok(
        &schema,
        r#"mutation R($id: ID!) { replyInquiry(id: $id, reply: "あります") { status reply } }"#,
        json!({ "id": id }),
        Some(&admin),
    )
    .await;
    assert_eq!(data["replyInquiry"], json!({ "status": "RESOLVED", "reply": "あります" }));

    let open = graphql_ok(&schema, "{ inquiries(status: OPEN) { id } }", json!({}), Some(&admin)).await;
    assert!(open["inquiries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn only_super_admins_assign_roles_and_never_their_own() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let root = create_test_user(&state, "root@example.jp", Role::SuperAdmin).await;
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;
    let member = create_test_user(&state, "member@example.jp", Role::Participant).await;
    let set_role = "mutation S($id: ID!, $role: Role!) { setUserRole(userId: $id, role: $role) { email role } }";

    let denied = graphql_err(
        &schema,
        set_role,
        json!({ "id": member.user_id().to_string(), "role": "ADMIN" }),
        Some(&admin),
    )
    .await;
    assert!(denied.starts_with("forbidden"), "{denied}");

    let own = graphql_err(
        &schema,
        set_role,
        json!({ "id": root.user_id().to_string(), "role": "PARTICIPANT" }),
        Some(&root),
    )
    .await;
    assert!(own.contains("your own role"), "{own}");

    let data = graphql_ok(
        &schema,
        set_role,
        json!({ "id": member.user_id().to_string(), "role": "ADMIN" }),
        Some(&root),
    )
    .await;
    assert_eq!(data["setUserRole"], json!({ "email": "member@example.jp", "role": "ADMIN" }));
}

#[tokio::test]
async fn users_are_searchable_by_admins_only() {
    let state = setup_test_state();
    let schema = build_schema(state.clone());
    let admin = create_test_user(&state, "admin@example.jp", Role::Admin).await;
    let organizer = create_test_user(&state, "hanako@example.jp", Role::Organizer).await;

    let data = graphql_ok(&schema, r#"{ users(search: "HANAKO") { email } }"#, json!({}), Some(&admin)).await;
    assert_eq!(data["users"], json!([{ "email": "hanako@example.jp" }]));

    let denied = graphql_err(&schema, "{ users { email } }", json!({}), Some(&organizer)).await;
    assert!(denied.starts_with("forbidden"), "{denied}");
}
