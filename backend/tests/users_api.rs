use std::future::IntoFuture;
use std::path::Path;

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use usertable_server::app::{router, AppState};
use usertable_server::model::db::connect;
use usertable_server::schema::auth::Token;
use usertable_server::schema::user::UserResponse;

const TEST_SECRET: &str = "test-secret";

async fn test_server() -> TestServer {
    let db = connect(":memory:").await.unwrap();
    // The frontend sources double as the static root: its index.html is the page.
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../frontend");
    TestServer::new(router(AppState::new(db, TEST_SECRET), &static_dir)).unwrap()
}

async fn create_user(server: &TestServer, name: &str, email: &str) -> UserResponse {
    let response = server
        .post("/users/")
        .json(&json!({ "name": name, "email": email, "password": "secret" }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn log_in(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/auth/token")
        .form(&json!({ "username": email, "password": password }))
        .await
}

async fn access_token(server: &TestServer, email: &str, password: &str) -> String {
    let response = log_in(server, email, password).await;
    response.assert_status_ok();
    let token: Token = response.json();
    assert_eq!(token.token_type, "bearer");
    token.access_token
}

fn assert_json_error(response: &TestResponse, status: StatusCode) {
    response.assert_status(status);
    let body: Value = response.json();
    assert!(body["error"].is_string(), "not a JSON error body: {body}");
}

#[tokio::test]
async fn empty_database_lists_no_users() {
    let server = test_server().await;

    let response = server.get("/users/").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn created_users_are_listed_in_insertion_order() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;
    let bo = create_user(&server, "Bo", "bo@x.com").await;

    let users: Vec<UserResponse> = server.get("/users/").await.json();

    assert_eq!(users, vec![ann, bo]);
    assert!(users[0].is_active);
    assert!(!users[0].is_admin);
    assert_eq!(users[0].role, "user");
}

#[tokio::test]
async fn responses_never_carry_the_password_hash() {
    let server = test_server().await;
    create_user(&server, "Ann", "ann@x.com").await;

    let users: Vec<Value> = server.get("/users/").await.json();

    let fields = users[0].as_object().unwrap();
    assert!(!fields.contains_key("hashed_password"));
    assert!(!fields.contains_key("password"));
}

#[tokio::test]
async fn list_is_readable_by_the_table_loader() {
    let server = test_server().await;
    create_user(&server, "Ann", "ann@x.com").await;
    server
        .post("/users/")
        .json(&json!({
            "name": "Root",
            "email": "root@x.com",
            "password": "secret",
            "is_active": false,
            "is_admin": true,
            "role": "admin"
        }))
        .await
        .assert_status_ok();

    let response = server.get("/users/").await;
    let users =
        usertable_ui::api::parse_users(response.status_code().as_u16(), &response.text()).unwrap();

    let rows: Vec<[String; 5]> = users.iter().map(|user| user.cells()).collect();
    assert_eq!(rows[0], ["1", "Ann", "ann@x.com", "Yes", "No"].map(str::to_string));
    assert_eq!(rows[1], ["2", "Root", "root@x.com", "No", "Yes"].map(str::to_string));
}

#[tokio::test]
async fn skip_and_limit_page_through_users() {
    let server = test_server().await;
    for n in 1..=12 {
        create_user(&server, &format!("User {n}"), &format!("user{n}@x.com")).await;
    }

    let first_page: Vec<UserResponse> = server.get("/users/").await.json();
    let second_page: Vec<UserResponse> = server
        .get("/users/")
        .add_query_param("skip", 10)
        .await
        .json();
    let middle: Vec<UserResponse> = server
        .get("/users/")
        .add_query_param("skip", 3)
        .add_query_param("limit", 2)
        .await
        .json();

    assert_eq!(first_page.len(), 10);
    assert_eq!(second_page.len(), 2);
    assert_eq!(second_page[0].name, "User 11");
    let names: Vec<&str> = middle.iter().map(|user| user.name.as_str()).collect();
    assert_eq!(names, ["User 4", "User 5"]);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let server = test_server().await;
    create_user(&server, "Ann", "ann@x.com").await;

    let response = server
        .post("/users/register")
        .json(&json!({ "name": "Other Ann", "email": "ann@x.com", "password": "pw" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Email already registered" }));
}

#[tokio::test]
async fn register_creates_a_user() {
    let server = test_server().await;

    let response = server
        .post("/users/register")
        .json(&json!({ "name": "Cy", "email": "cy@x.com", "password": "pw" }))
        .await;

    response.assert_status_ok();
    let user: UserResponse = response.json();
    assert_eq!(user.email, "cy@x.com");
    server.get(&format!("/users/{}", user.id)).await.assert_status_ok();
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let server = test_server().await;

    let no_name = server
        .post("/users/")
        .json(&json!({ "name": " ", "email": "a@x.com", "password": "pw" }))
        .await;
    let bad_email = server
        .post("/users/")
        .json(&json!({ "name": "A", "email": "nope", "password": "pw" }))
        .await;
    let no_password = server
        .post("/users/")
        .json(&json!({ "name": "A", "email": "a@x.com", "password": "" }))
        .await;

    no_name.assert_status(StatusCode::BAD_REQUEST);
    bad_email.assert_status(StatusCode::BAD_REQUEST);
    no_password.assert_status(StatusCode::BAD_REQUEST);
    server.get("/users/").await.assert_json(&json!([]));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let server = test_server().await;

    let get = server.get("/users/42").await;
    let update = server
        .put("/users/42")
        .json(&json!({ "name": "Ghost", "email": "ghost@x.com" }))
        .await;
    let delete = server.delete("/users/42").await;

    get.assert_status(StatusCode::NOT_FOUND);
    get.assert_json(&json!({ "error": "User not found" }));
    update.assert_status(StatusCode::NOT_FOUND);
    delete.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_replaces_the_profile() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;

    let response = server
        .put(&format!("/users/{}", ann.id))
        .json(&json!({
            "name": "Ann Lee",
            "email": "ann.lee@x.com",
            "is_active": false,
            "is_admin": true,
            "role": "editor",
            "password": "new-secret"
        }))
        .await;

    response.assert_status_ok();
    let updated: UserResponse = response.json();
    assert_eq!(
        updated,
        UserResponse {
            id: ann.id,
            name: "Ann Lee".to_string(),
            email: "ann.lee@x.com".to_string(),
            is_active: false,
            is_admin: true,
            role: "editor".to_string(),
        }
    );
}

#[tokio::test]
async fn update_cannot_steal_another_users_email() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;
    create_user(&server, "Bo", "bo@x.com").await;

    let stolen = server
        .put(&format!("/users/{}", ann.id))
        .json(&json!({ "name": "Ann", "email": "bo@x.com" }))
        .await;
    let kept = server
        .put(&format!("/users/{}", ann.id))
        .json(&json!({ "name": "Ann B.", "email": "ann@x.com" }))
        .await;

    stolen.assert_status(StatusCode::BAD_REQUEST);
    kept.assert_status_ok();
}

#[tokio::test]
async fn delete_returns_the_removed_user() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;
    let bo = create_user(&server, "Bo", "bo@x.com").await;

    let response = server.delete(&format!("/users/{}", ann.id)).await;

    response.assert_status_ok();
    assert_eq!(response.json::<UserResponse>(), ann);
    server
        .get(&format!("/users/{}", ann.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let remaining: Vec<UserResponse> = server.get("/users/").await.json();
    assert_eq!(remaining, vec![bo]);
}

#[tokio::test]
async fn page_with_the_table_is_served() {
    let server = test_server().await;

    let response = server.get("/").await;

    response.assert_status_ok();
    assert!(response.text().contains(r#"<tbody id="user-table-body">"#));
    server.get("/health").await.assert_text("OK");
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let server = test_server().await;

    let bad_id = server.get("/users/abc").await;
    let bad_skip = server.get("/users/").add_query_param("skip", -1).await;
    let no_password = server
        .post("/users/")
        .json(&json!({ "name": "Ann", "email": "ann@x.com" }))
        .await;
    let not_json = server.put("/users/1").text("name=Ann").await;

    assert_json_error(&bad_id, StatusCode::BAD_REQUEST);
    assert_json_error(&bad_skip, StatusCode::BAD_REQUEST);
    assert_json_error(&no_password, StatusCode::BAD_REQUEST);
    assert!(no_password.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("password"));
    assert_json_error(&not_json, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_signups_with_one_email_create_one_user() {
    let server = test_server().await;
    let sign_up = |name: &'static str| {
        server
            .post("/users/")
            .json(&json!({ "name": name, "email": "ann@x.com", "password": "pw" }))
            .into_future()
    };

    let (first, second) = tokio::join!(sign_up("Ann"), sign_up("Other Ann"));

    let mut statuses = [first.status_code().as_u16(), second.status_code().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [200, 400]);
    let users: Vec<UserResponse> = server.get("/users/").await.json();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn token_identifies_the_logged_in_user() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;

    let token = access_token(&server, "ann@x.com", "secret").await;
    let me = server.get("/users/me").authorization_bearer(&token).await;

    me.assert_status_ok();
    assert_eq!(me.json::<UserResponse>(), ann);
}

#[tokio::test]
async fn wrong_credentials_are_rejected() {
    let server = test_server().await;
    create_user(&server, "Ann", "ann@x.com").await;

    let wrong_password = log_in(&server, "ann@x.com", "nope").await;
    let unknown_email = log_in(&server, "bo@x.com", "secret").await;

    wrong_password.assert_status(StatusCode::BAD_REQUEST);
    wrong_password.assert_json(&json!({ "error": "Incorrect email or password" }));
    unknown_email.assert_status(StatusCode::BAD_REQUEST);
    unknown_email.assert_json(&json!({ "error": "Incorrect email or password" }));
}

#[tokio::test]
async fn current_user_needs_a_valid_token() {
    let server = test_server().await;

    let missing = server.get("/users/me").await;
    let forged = server.get("/users/me").authorization_bearer("not.a.token").await;

    assert_json_error(&missing, StatusCode::UNAUTHORIZED);
    assert_json_error(&forged, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_user_cannot_use_its_token() {
    let server = test_server().await;
    server
        .post("/users/")
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "password": "secret", "is_active": false }))
        .await
        .assert_status_ok();

    let token = access_token(&server, "ann@x.com", "secret").await;
    let me = server.get("/users/me").authorization_bearer(&token).await;

    me.assert_status(StatusCode::BAD_REQUEST);
    me.assert_json(&json!({ "error": "Inactive user" }));
}

#[tokio::test]
async fn update_without_password_keeps_the_old_one() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;

    server
        .put(&format!("/users/{}", ann.id))
        .json(&json!({ "name": "Ann Lee", "email": "ann@x.com" }))
        .await
        .assert_status_ok();

    log_in(&server, "ann@x.com", "secret").await.assert_status_ok();
}

#[tokio::test]
async fn update_with_password_replaces_it_with_the_profile() {
    let server = test_server().await;
    let ann = create_user(&server, "Ann", "ann@x.com").await;

    server
        .put(&format!("/users/{}", ann.id))
        .json(&json!({ "name": "Ann Lee", "email": "ann.lee@x.com", "password": "new-secret" }))
        .await
        .assert_status_ok();

    log_in(&server, "ann.lee@x.com", "secret")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    log_in(&server, "ann.lee@x.com", "new-secret").await.assert_status_ok();
    let user: UserResponse = server.get(&format!("/users/{}", ann.id)).await.json();
    assert_eq!(user.name, "Ann Lee");
}
