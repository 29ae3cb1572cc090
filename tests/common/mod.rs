#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    test, web,
};
use serde_json::{json, Value};
use taskboard::{auth::TokenSigner, store::MemoryStore, AppState};

/// Cheapest bcrypt cost, keeps registration fast in tests.
pub const COST: u32 = 4;
pub const PASSWORD: &str = "Password123!";

pub fn memory_state() -> (MemoryStore, web::Data<AppState>) {
    let store = MemoryStore::new();
    let state = AppState::memory(store.clone(), TokenSigner::new("integration-test-secret", 3600), COST);
    (store, web::Data::new(state))
}

pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register_user<S, B>(app: &S, username: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    TestUser {
        id: body["user"]["id"].as_i64().expect("user id"),
        username: username.to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}
