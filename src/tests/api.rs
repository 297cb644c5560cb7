//! HTTP-level tests against the assembled application.
//!
//! Each test builds the real router over a fresh in-memory database and
//! sends requests with `oneshot`, so middleware, extractors, error mapping
//! and the success envelope are all exercised together.

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{
    AppState, build_app,
    config::{LmsConfig, ServerConfig},
    db::tests::harness::create_test_db,
    middleware::REQUEST_ID_HEADER,
    models::Role,
    services::tests::test_auth_config,
    timeout_layer,
};

struct TestApp {
    app: axum::Router,
    state: AppState,
}

struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

/// A registered account and its session token.
struct Account {
    id: String,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        let config = LmsConfig {
            auth: test_auth_config(),
            ..Default::default()
        };
        let state = AppState::with_db(config.clone(), create_test_db().await).unwrap();
        let app = build_app(&config, state.clone());
        Self { app, state }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> Response {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Response {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    async fn register(&self, email: &str, role: Role) -> Account {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "firstName": "Test",
                    "lastName": "User",
                    "email": email,
                    "password": "secret-password",
                    "role": role.as_str(),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        Account {
            id: response.body["user"]["id"].as_str().unwrap().to_string(),
            token: response.body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Bootstrap an admin the way the command line does, then log in.
    async fn admin(&self) -> Account {
        let user = self
            .state
            .services
            .auth
            .bootstrap_admin(crate::models::CreateUser {
                first_name: "Root".to_string(),
                last_name: "Admin".to_string(),
                email: "root@example.com".to_string(),
                password: "secret-password".to_string(),
                role: None,
                phone: None,
                avatar: None,
            })
            .await
            .unwrap();
        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": "root@example.com", "password": "secret-password" }),
            )
            .await;
        Account {
            id: user.id.to_string(),
            token: response.body["token"].as_str().unwrap().to_string(),
        }
    }

    async fn create_course(&self, token: &str, title: &str) -> String {
        let response = self
            .post(
                "/api/courses",
                Some(token),
                json!({
                    "title": title,
                    "description": "An introduction to the subject.",
                    "category": "Computer Science",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"].as_str().unwrap().to_string()
    }
}

fn cookie_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[tokio::test]
async fn test_health_has_security_and_request_id_headers() {
    let app = TestApp::new().await;
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["timestamp"].is_string());
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["referrer-policy"], "no-referrer");
    assert!(response.headers.contains_key(REQUEST_ID_HEADER));

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_routes_are_json_404() {
    let app = TestApp::new().await;

    for uri in ["/nope", "/api/nope"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({ "message": "Route not found" }));
    }
}

#[tokio::test]
async fn test_register_login_profile() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "Ada@Example.com",
                "password": "analytical",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["user"]["email"], "ada@example.com");
    assert_eq!(response.body["user"]["role"], "student");
    assert!(response.body["user"].get("passwordHash").is_none());
    let cookie = cookie_header(&response.headers).unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let response = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "analytical" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap().to_string();

    let response = app.get("/api/auth/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["user"]["firstName"], "Ada");
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = TestApp::new().await;
    let account = app.register("ada@example.com", Role::Student).await;

    let request = Request::builder()
        .uri("/api/auth/profile")
        .header(header::COOKIE, format!("token={}", account.token))
        .body(Body::empty())
        .unwrap();
    let response = app.send_request(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["id"], account.id.as_str());
}

#[tokio::test]
async fn test_bad_credentials_are_401() {
    let app = TestApp::new().await;
    app.register("ada@example.com", Role::Student).await;

    let response = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "message": "Invalid credentials" }));
}

#[tokio::test]
async fn test_registration_validation_is_json_400() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "firstName": "A",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "password": "analytical",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "First name must be at least 2 characters"
    );
}

#[tokio::test]
async fn test_self_registration_cannot_mint_admin() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "firstName": "Eve",
                "lastName": "Mallory",
                "email": "eve@example.com",
                "password": "let-me-in",
                "role": "admin",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case::profile("/api/auth/profile")]
#[case::users("/api/users")]
#[case::my_courses("/api/courses/my-courses")]
#[case::my_enrollments("/api/enrollments/my-enrollments")]
#[case::assignments("/api/assignments")]
#[case::quizzes("/api/quizzes")]
#[case::stats("/api/admin/stats")]
#[tokio::test]
async fn test_protected_routes_need_a_caller(#[case] uri: &str) {
    let app = TestApp::new().await;
    let response = app.get(uri, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body,
        json!({ "message": "Access denied. No token provided." })
    );
}

#[tokio::test]
async fn test_invalid_token_is_rejected_even_on_public_routes() {
    let app = TestApp::new().await;

    let response = app.get("/api/courses", Some("not.a.jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/api/courses", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let account = app.register("ada@example.com", Role::Student).await;
    let id = account.id.parse().unwrap();

    let expired = app
        .state
        .services
        .auth
        .tokens()
        .issue_at(id, Role::Student, Utc::now() - Duration::days(30))
        .unwrap();

    let response = app.get("/api/auth/profile", Some(&expired)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stale_cookie_does_not_block_login_or_logout() {
    let app = TestApp::new().await;
    app.register("ada@example.com", Role::Student).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::COOKIE, "token=stale")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "ada@example.com", "password": "secret-password" }).to_string(),
        ))
        .unwrap();
    let response = app.send_request(request).await;
    assert_eq!(response.status, StatusCode::OK);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .header(header::COOKIE, "token=stale")
        .body(Body::empty())
        .unwrap();
    let response = app.send_request(request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged out successfully");
    let cookie = cookie_header(&response.headers).unwrap();
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
}

#[tokio::test]
async fn test_course_creation_is_role_gated() {
    let app = TestApp::new().await;
    let student = app.register("stu@example.com", Role::Student).await;
    let faculty = app.register("prof@example.com", Role::Faculty).await;

    let body = json!({
        "title": "Compilers",
        "description": "Lexing, parsing and code generation.",
        "category": "Computer Science",
    });
    let response = app.post("/api/courses", Some(&student.token), body.clone()).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.post("/api/courses", Some(&faculty.token), body).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["instructor"]["id"], faculty.id.as_str());
    assert_eq!(response.body["data"]["instructor"]["email"], "prof@example.com");
}

#[tokio::test]
async fn test_missing_target_is_404_before_403() {
    let app = TestApp::new().await;
    let student = app.register("stu@example.com", Role::Student).await;

    let response = app
        .put(
            &format!("/api/courses/{}", uuid::Uuid::new_v4()),
            Some(&student.token),
            json!({ "title": "Hijacked course" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "message": "Course not found" }));
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let app = TestApp::new().await;
    let response = app.get("/api/courses/not-a-uuid", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_course_listing_is_paginated() {
    let app = TestApp::new().await;
    let faculty = app.register("prof@example.com", Role::Faculty).await;
    for title in ["Compilers", "Databases", "Networks"] {
        app.create_course(&faculty.token, title).await;
    }

    let response = app.get("/api/courses?page=2&limit=2", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["page"], 2);
    assert_eq!(response.body["totalPages"], 2);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_enrollment_through_certificate() {
    let app = TestApp::new().await;
    let faculty = app.register("prof@example.com", Role::Faculty).await;
    let student = app.register("stu@example.com", Role::Student).await;
    let course_id = app.create_course(&faculty.token, "Compilers").await;

    let response = app
        .post(
            "/api/enrollments",
            Some(&student.token),
            json!({ "courseId": course_id }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let enrollment_id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .post(
            "/api/enrollments",
            Some(&student.token),
            json!({ "courseId": course_id }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let certificate_uri = format!("/api/certificates/generate/{enrollment_id}");
    let response = app.get(&certificate_uri, Some(&student.token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "message": "Course not completed" }));

    let enrollment_uri = format!("/api/enrollments/{enrollment_id}");
    let progress = json!({ "progress": 100, "grade": 91.5 });
    let response = app
        .put(&enrollment_uri, Some(&faculty.token), progress.clone())
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .put(&enrollment_uri, Some(&student.token), progress)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert!(response.body["data"]["completedAt"].is_string());

    let response = app.get(&certificate_uri, Some(&student.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Certificate generated successfully");
    assert_eq!(response.body["data"]["courseTitle"], "Compilers");
    assert_eq!(response.body["data"]["studentName"], "Test User");
    assert_eq!(response.body["data"]["grade"], 91.5);

    let other = app.register("other@example.com", Role::Student).await;
    let response = app.get(&certificate_uri, Some(&other.token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/api/courses/my-courses", Some(&student.token)).await;
    assert_eq!(response.body["count"], 1);
}

#[tokio::test]
async fn test_quiz_submission_is_scored_server_side() {
    let app = TestApp::new().await;
    let faculty = app.register("prof@example.com", Role::Faculty).await;
    let student = app.register("stu@example.com", Role::Student).await;
    let course_id = app.create_course(&faculty.token, "Compilers").await;

    let response = app
        .post(
            "/api/quizzes",
            Some(&faculty.token),
            json!({
                "title": "Parsing basics",
                "courseId": course_id,
                "questions": [
                    { "question": "LL or LR?", "options": ["LL", "LR"], "correctAnswer": "LR" },
                    { "question": "Tokens come from?", "options": ["lexer", "linker"], "correctAnswer": "lexer" },
                ],
                "maxPoints": 10,
                "duration": 15,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let quiz_id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .post(
            "/api/results",
            Some(&student.token),
            json!({
                "quizId": quiz_id,
                "answers": [
                    { "questionIndex": 0, "selectedAnswer": "LR" },
                    { "questionIndex": 1, "selectedAnswer": "linker" },
                ],
                "score": 2,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    assert_eq!(response.body["data"]["score"], 1);
    assert_eq!(response.body["data"]["percentage"], 50.0);

    let response = app
        .post(
            "/api/results",
            Some(&student.token),
            json!({ "quizId": quiz_id, "answers": [] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app.get("/api/results", Some(&faculty.token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "message": "Quiz ID is required" }));

    let response = app
        .get(&format!("/api/results?quizId={quiz_id}"), Some(&faculty.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["data"][0]["user"]["id"], student.id.as_str());

    let response = app
        .get(&format!("/api/results?quizId={quiz_id}"), Some(&student.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submissions_require_assignment_id() {
    let app = TestApp::new().await;
    let faculty = app.register("prof@example.com", Role::Faculty).await;

    let response = app.get("/api/submissions", Some(&faculty.token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "message": "Assignment ID is required" }));
}

#[tokio::test]
async fn test_admin_surface() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let student = app.register("stu@example.com", Role::Student).await;

    let response = app.get("/api/admin/stats", Some(&student.token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/api/admin/stats", Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["totalUsers"], 2);

    let response = app.get("/api/users?role=student", Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);

    let response = app
        .put(
            &format!("/api/users/change-role/{}", student.id),
            Some(&admin.token),
            json!({ "role": "faculty" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["role"], "faculty");

    let response = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}", admin.id),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}", student.id),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "User removed");

    // The deleted account's token no longer resolves.
    let response = app.get("/api/auth/profile", Some(&student.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_may_register_admin_without_losing_cookie() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let response = app
        .post(
            "/api/auth/register",
            Some(&admin.token),
            json!({
                "firstName": "Second",
                "lastName": "Admin",
                "email": "second@example.com",
                "password": "secret-password",
                "role": "admin",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["role"], "admin");
    assert!(cookie_header(&response.headers).is_none());
}

#[tokio::test]
async fn test_deleting_an_instructor_who_owns_courses_is_conflict() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let faculty = app.register("prof@example.com", Role::Faculty).await;
    app.create_course(&faculty.token, "Compilers").await;

    let response = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}", faculty.id),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT, "{}", response.body);
    assert!(response.body["message"].is_string());

    // The account survives the refused delete.
    let response = app.get("/api/auth/profile", Some(&faculty.token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_slow_request_times_out_with_408() {
    let server = ServerConfig {
        timeout_secs: 0,
        ..Default::default()
    };
    let app = axum::Router::new()
        .route(
            "/slow",
            axum::routing::get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }),
        )
        .layer(timeout_layer(&server));

    let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}
