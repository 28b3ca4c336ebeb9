use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, Role};
use migration::MigratorTrait;
use server::{ServerState, TokenKeys, router};

struct TestApp {
    app: Router,
    engine: Arc<Engine>,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Arc::new(Engine::builder().database(db).build().await.unwrap());
    let state = ServerState {
        engine: engine.clone(),
        tokens: Arc::new(TokenKeys::new("test-secret", 60)),
    };
    TestApp {
        app: router(state),
        engine,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: &str,
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

        let res = self.app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, username: &str, email: &str) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/api/users/register",
                None,
                Some(json!({"username": username, "email": email, "password": "secret12"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": "secret12"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn register_login_and_me() {
    let app = test_app().await;
    let user = app.register("anna", "anna@example.com").await;
    assert_eq!(user["roles"], json!(["CO_OWNER"]));

    let token = app.login("anna@example.com").await;
    let (status, me) = app.send("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "anna@example.com");
    assert_eq!(me["id"], user["id"]);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = test_app().await;
    app.register("anna", "anna@example.com").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "anna@example.com", "password": "wrong-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app().await;

    let (status, body) = app.send("GET", "/api/groups", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .send("GET", "/api/groups", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let app = test_app().await;
    app.register("anna", "anna@example.com").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/users/register",
            None,
            Some(json!({"username": "other", "email": "anna@example.com", "password": "secret12"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT_ERROR");
}

#[tokio::test]
async fn malformed_requests_are_validation_errors() {
    let app = test_app().await;
    app.register("anna", "anna@example.com").await;
    let token = app.login("anna@example.com").await;

    let (status, body) = app
        .send("POST", "/api/groups", Some(&token), Some(json!({"name": 42})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .send("GET", "/api/groups/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .send(
            "POST",
            "/api/users/register",
            None,
            Some(json!({"username": "short", "email": "short@example.com", "password": "123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_listings_are_admin_only() {
    let app = test_app().await;
    app.register("anna", "anna@example.com").await;
    let token = app.login("anna@example.com").await;

    let (status, body) = app.send("GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    app.engine
        .create_user("root", "root@example.com", "secret12", &[Role::Admin])
        .await
        .unwrap();
    let admin = app.login("root@example.com").await;
    let (status, body) = app.send("GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_app().await;
    let req = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();
    let res = app.app.clone().oneshot(req).await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn group_booking_and_expense_flow() {
    let app = test_app().await;
    let anna = app.register("anna", "anna@example.com").await;
    let bruno = app.register("bruno", "bruno@example.com").await;
    let anna_token = app.login("anna@example.com").await;
    let bruno_token = app.login("bruno@example.com").await;

    let (status, group) = app
        .send(
            "POST",
            "/api/groups",
            Some(&anna_token),
            Some(json!({"name": "Blue Leaf"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap().to_string();

    for (user, pct) in [(&anna, 0.6), (&bruno, 0.4)] {
        let (status, body) = app
            .send(
                "POST",
                &format!("/api/groups/{group_id}/members"),
                Some(&anna_token),
                Some(json!({"user_id": user["id"], "percentage": pct})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, vehicle) = app
        .send(
            "POST",
            "/api/vehicles",
            Some(&anna_token),
            Some(json!({
                "group_id": group_id,
                "vin": "5YJ3E1EA7KF000001",
                "plate": "AB123CD",
                "model": "Model 3",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{vehicle}");
    let vehicle_id = vehicle["id"].as_str().unwrap().to_string();

    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::hours(3);
    let (status, booking) = app
        .send(
            "POST",
            "/api/bookings",
            Some(&bruno_token),
            Some(json!({"vehicle_id": vehicle_id, "start_time": start, "end_time": end})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["status"], "CONFIRMED");

    let (status, body) = app
        .send(
            "POST",
            "/api/bookings",
            Some(&anna_token),
            Some(json!({
                "vehicle_id": vehicle_id,
                "start_time": start + Duration::hours(1),
                "end_time": end + Duration::hours(1),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT_ERROR");

    let (status, created) = app
        .send(
            "POST",
            "/api/expenses",
            Some(&anna_token),
            Some(json!({
                "group_id": group_id,
                "vehicle_id": vehicle_id,
                "expense_type": "CHARGING",
                "amount": "100.00",
                "date": "2026-01-15",
                "split_method": "BY_OWNERSHIP",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["expense"]["status"], "PENDING");
    let shares = created["shares"].as_array().unwrap();
    let bruno_share = shares
        .iter()
        .find(|s| s["user_id"] == bruno["id"])
        .unwrap();
    assert_eq!(bruno_share["amount"], "40.00");

    let (status, payment) = app
        .send(
            "POST",
            "/api/payments",
            Some(&bruno_token),
            Some(json!({
                "expense_share_id": bruno_share["id"],
                "amount": "40.00",
                "method": "E_WALLET",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");
    assert_eq!(payment["status"], "COMPLETED");

    let (status, mine) = app
        .send("GET", "/api/expense-shares/mine", Some(&bruno_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["status"], "PAID");
    assert_eq!(mine[0]["paid_amount"], "40.00");

    let (status, share_payments) = app
        .send(
            "GET",
            &format!("/api/payments/expense-share/{}", bruno_share["id"].as_str().unwrap()),
            Some(&anna_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{share_payments}");
    assert_eq!(share_payments.as_array().unwrap().len(), 1);
    assert_eq!(share_payments[0]["id"], payment["id"]);

    // anna cannot pay bruno's share
    let (status, _) = app
        .send(
            "POST",
            "/api/payments",
            Some(&anna_token),
            Some(json!({
                "expense_share_id": bruno_share["id"],
                "amount": "1.00",
                "method": "CASH",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn group_report_requires_date_range() {
    let app = test_app().await;
    app.register("anna", "anna@example.com").await;
    let token = app.login("anna@example.com").await;
    let (_, group) = app
        .send("POST", "/api/groups", Some(&token), Some(json!({"name": "G"})))
        .await;
    let group_id = group["id"].as_str().unwrap();

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/reports/group/{group_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/reports/group/{group_id}?from=2026-01-01&to=2026-12-31"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_expenses"], "0.00");
    assert_eq!(body["expense_count"], 0);
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, TokenKeys::new("test-secret", 60), listener)
        .unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/auth/me HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 401"), "{response}");
}
