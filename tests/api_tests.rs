use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskweb::api::{ApiClient, TaskApi};
use taskweb::auth::RegisterForm;
use taskweb::error::ApiError;
use taskweb::models::{NewTask, Priority, Route, Session, Status, TaskUpdate};
use taskweb::session::SessionStore;

fn task_json(id: u64, title: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": status,
        "priority": "medium",
        "created_at": "2025-01-01T09:30:00.123456",
        "user_id": "alice"
    })
}

fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
    let session = SessionStore::in_memory();
    if let Some(token) = token {
        session.set(&Session { token: token.into(), username: "alice".into() }).unwrap();
    }
    ApiClient::new(server.uri(), session)
}

#[tokio::test]
async fn attaches_bearer_token_when_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(1, "Buy milk", "pending")])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client_for(&server, Some("abc123")).list_tasks().await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].status, Status::Pending);
    assert_eq!(tasks[0].created_display(), "2025-01-01 09:30");
}

#[tokio::test]
async fn sends_no_authorization_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({ "username": "alice", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "User registered successfully" })))
        .mount(&server)
        .await;

    let body = client_for(&server, None).register("alice", "secret1").await.unwrap();

    assert_eq!(body["message"], "User registered successfully");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn login_token_authenticates_the_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "jwt-1", "token_type": "bearer" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let login = client.login("alice", "secret1").await.unwrap();
    client.session().set(&Session { token: login.access_token, username: "alice".into() }).unwrap();

    assert!(client.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn error_detail_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Username already exists" })))
        .mount(&server)
        .await;

    let err = client_for(&server, None).register("alice", "secret1").await.unwrap_err();

    match &err {
        ApiError::Status { status, detail } => {
            assert_eq!(*status, 400);
            assert_eq!(detail.as_deref(), Some("Username already exists"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.detail(), Some("Username already exists"));
}

#[tokio::test]
async fn error_without_body_has_no_detail() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("t")).delete_task(9).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, detail: None }));
}

#[tokio::test]
async fn update_sends_only_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/3"))
        .and(body_json(json!({ "status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(3, "Walk dog", "completed")))
        .expect(1)
        .mount(&server)
        .await;

    let task = client_for(&server, Some("t"))
        .update_task(3, &TaskUpdate::status(Status::Completed))
        .await
        .unwrap();

    assert_eq!(task.status, Status::Completed);
}

#[tokio::test]
async fn create_and_delete_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_json(json!({ "title": "Buy milk", "priority": "high" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Buy milk",
            "status": "pending",
            "priority": "high",
            "created_at": "2025-01-01T09:30:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Task deleted successfully" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("t"));
    let created = client
        .create_task(&NewTask { title: "Buy milk".into(), description: None, priority: Some(Priority::High) })
        .await
        .unwrap();
    assert_eq!(created.id, 7);
    assert_eq!(created.priority, Priority::High);
    assert!(created.user_id.is_none());

    client.delete_task(7).await.unwrap();
}

#[tokio::test]
async fn register_accepts_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "alice", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "jwt" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let mut form = RegisterForm {
        username: "alice".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        ..Default::default()
    };

    assert_eq!(form.submit(&client, client.session()).await.unwrap(), Route::Dashboard);
    assert_eq!(client.session().token().as_deref(), Some("jwt"));
    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, vec!["/register", "/login"]);
}

#[tokio::test]
async fn null_detail_counts_as_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": null })))
        .mount(&server)
        .await;

    let err = client_for(&server, None).register("alice", "secret1").await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 400, detail: None }));
}
