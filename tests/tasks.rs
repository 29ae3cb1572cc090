mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskboard::build_app;

use common::{memory_state, register_user};

#[actix_rt::test]
async fn test_task_crud_flow() {
    let (store, state) = memory_state();
    let app = test::init_service(build_app(state)).await;
    let user = register_user(&app, "crud_user").await;

    // 1. Create
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .set_json(json!({
            "title": "CRUD Task",
            "description": "Initial description",
            "status": "todo",
            "priority": "medium",
            "dueDate": "2024-12-31T23:59:59"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Task created successfully");
    let created = &body["data"];
    assert_eq!(created["title"], "CRUD Task");
    assert_eq!(created["priority"], "medium");
    assert_eq!(created["dueDate"], "2024-12-31T23:59:59");
    assert_eq!(created["updatedAt"], Value::Null);
    assert_eq!(created["owner"], json!({ "id": user.id, "username": "crud_user" }));
    let task_id = created["id"].as_i64().unwrap();

    // 2. Read
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["description"], "Initial description");

    // 3. Partial update; untouched fields survive, null clears the due date
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(user.bearer())
        .set_json(json!({ "status": "done", "dueDate": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Task updated successfully");
    assert_eq!(body["data"]["status"], "done");
    assert_eq!(body["data"]["title"], "CRUD Task");
    assert_eq!(body["data"]["priority"], "medium");
    assert_eq!(body["data"]["dueDate"], Value::Null);
    assert!(body["data"]["updatedAt"].is_string());

    // 4. Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "Task deleted successfully" }));
    assert_eq!(store.task_count().await, 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Task not found");
}

#[actix_rt::test]
async fn test_create_task_rejections() {
    let (store, state) = memory_state();
    let app = test::init_service(build_app(state)).await;
    let user = register_user(&app, "picky").await;

    let cases = [
        (json!({ "title": "No status", "priority": "low" }), "Missing required fields: title, status, priority"),
        (
            json!({ "title": "Bad date", "status": "todo", "priority": "low", "dueDate": "tomorrow" }),
            "Invalid dueDate format. Use ISO 8601 format (e.g., 2024-12-31T23:59:59)",
        ),
        (json!({ "title": "", "status": "todo", "priority": "urgent" }), "Validation failed"),
    ];
    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header(user.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], expected);
    }

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid JSON");

    assert_eq!(store.task_count().await, 0);
}

#[actix_rt::test]
async fn test_other_users_tasks_are_forbidden() {
    let (_, state) = memory_state();
    let app = test::init_service(build_app(state)).await;
    let owner = register_user(&app, "owner").await;
    let intruder = register_user(&app, "intruder").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(owner.bearer())
        .set_json(json!({ "title": "Private", "status": "todo", "priority": "high" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let task_uri = format!("/api/tasks/{}", body["data"]["id"]);

    let requests = [
        test::TestRequest::get().uri(&task_uri),
        test::TestRequest::delete().uri(&task_uri),
        // Ownership is checked before the body is looked at
        test::TestRequest::put()
            .uri(&task_uri)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{garbage"),
    ];
    for request in requests {
        let resp = test::call_service(&app, request.append_header(intruder.bearer()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Access denied");
    }

    // Still intact for its owner
    let req = test::TestRequest::get()
        .uri(&task_uri)
        .append_header(owner.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The intruder's list does not include it
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(intruder.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["meta"]["total"], 0);
    assert_eq!(body["data"], json!([]));
}

#[actix_rt::test]
async fn test_update_missing_or_malformed() {
    let (_, state) = memory_state();
    let app = test::init_service(build_app(state)).await;
    let user = register_user(&app, "updater").await;

    let req = test::TestRequest::put()
        .uri("/api/tasks/999")
        .append_header(user.bearer())
        .set_json(json!({ "title": "ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/tasks/not-a-number")
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .set_json(json!({ "title": "Mine", "status": "todo", "priority": "low" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let task_uri = format!("/api/tasks/{}", body["data"]["id"]);

    let req = test::TestRequest::put()
        .uri(&task_uri)
        .append_header(user.bearer())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{garbage")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid JSON");

    let req = test::TestRequest::put()
        .uri(&task_uri)
        .append_header(user.bearer())
        .set_json(json!({ "priority": "critical" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");

    // The rejected update left the task untouched
    let req = test::TestRequest::get()
        .uri(&task_uri)
        .append_header(user.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["priority"], "low");
    assert_eq!(body["data"]["updatedAt"], Value::Null);
}

#[actix_rt::test]
async fn test_list_paginates_and_filters() {
    let (_, state) = memory_state();
    let app = test::init_service(build_app(state)).await;
    let user = register_user(&app, "lister").await;

    for i in 0..12 {
        let (status, priority) = if i % 3 == 0 { ("done", "high") } else { ("todo", "low") };
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header(user.bearer())
            .set_json(json!({ "title": format!("Task {}", i), "status": status, "priority": priority }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(user.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["meta"], json!({ "total": 12, "page": 1, "limit": 10, "pages": 2 }));
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"][0]["title"], "Task 11");

    let req = test::TestRequest::get()
        .uri("/api/tasks?page=2&limit=5")
        .append_header(user.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["meta"], json!({ "total": 12, "page": 2, "limit": 5, "pages": 3 }));
    assert_eq!(body["data"][0]["title"], "Task 6");

    let req = test::TestRequest::get()
        .uri("/api/tasks?status=done&priority=high")
        .append_header(user.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["meta"]["total"], 4);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|task| task["status"] == "done" && task["priority"] == "high"));

    // Out-of-range values are clamped, not rejected
    let req = test::TestRequest::get()
        .uri("/api/tasks?page=0&limit=500")
        .append_header(user.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["meta"], json!({ "total": 12, "page": 1, "limit": 100, "pages": 1 }));

    let req = test::TestRequest::get()
        .uri("/api/tasks?page=9")
        .append_header(user.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 12);
}
