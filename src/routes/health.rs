use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::state::AppState;

/// Liveness probe.
#[get("/ping")]
pub async fn ping() -> impl Responder {
    HttpResponse::Ok().json(json!({ "pong": true }))
}

/// Health check endpoint
///
/// Reports whether the backing store answers. Returns 503 when it does not.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let database = match state.users.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            log::error!("Health check failed: {}", err);
            "error"
        }
    };

    let body = json!({
        "status": if database == "ok" { "healthy" } else { "unhealthy" },
        "checks": { "database": database, "jwt": "ok" },
    });

    if database == "ok" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSigner;
    use crate::store::MemoryStore;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_ping_endpoint() {
        let app = test::init_service(App::new().service(ping)).await;

        let req = test::TestRequest::get().uri("/ping").to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(json, json!({ "pong": true }));
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let state = AppState::memory(MemoryStore::new(), TokenSigner::new("health-secret", 60), 4);
        let app = test::init_service(App::new().app_data(web::Data::new(state)).service(health)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["checks"]["database"], "ok");
        assert_eq!(json["checks"]["jwt"], "ok");
    }
}
