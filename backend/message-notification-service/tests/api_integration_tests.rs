/// Integration tests for the message trigger HTTP API
///
/// This test module covers:
/// - Successful dispatch response format
/// - Status codes for failed invocations
/// - Request validation
mod common;

use actix_web::{test, web, App};
use common::{strings, InMemoryUsers, MockPush};
use message_notification_service::handlers::register_routes;
use message_notification_service::models::DeliveryResult;
use message_notification_service::{AppError, NotificationDispatcher};
use serde_json::{json, Value};
use std::sync::Arc;

const TRIGGER_URI: &str = "/triggers/messages/chat-1/chat-1-thread/1700000000000";

fn app_data(users: Arc<InMemoryUsers>, push: MockPush) -> web::Data<Arc<NotificationDispatcher>> {
    web::Data::new(Arc::new(NotificationDispatcher::new(users, Arc::new(push))))
}

#[actix_web::test]
async fn test_trigger_returns_outcome() {
    let users = Arc::new(InMemoryUsers::with_user("u1", Some(&["A", "B", "C"])));
    let mut push = MockPush::new();
    push.expect_send_to_devices().times(1).returning(|_, _| {
        Ok(vec![
            DeliveryResult::success("A"),
            DeliveryResult::failure("B", "messaging/registration-token-not-registered", ""),
            DeliveryResult::failure("C", "messaging/unknown-error", "boom"),
        ])
    });

    let app = test::init_service(
        App::new()
            .app_data(app_data(users.clone(), push))
            .configure(register_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(TRIGGER_URI)
        .set_json(json!({ "to": "u1", "from": "u2", "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "delivered");
    assert_eq!(body["data"]["removed_tokens"], json!(["B"]));
    assert_eq!(body["data"]["remaining_tokens"], json!(["A", "C"]));

    assert_eq!(users.tokens("u1"), Some(strings(&["A", "C"])));
}

#[actix_web::test]
async fn test_trigger_without_tokens() {
    let users = Arc::new(InMemoryUsers::with_user("u1", None));
    let mut push = MockPush::new();
    push.expect_send_to_devices().never();

    let app = test::init_service(
        App::new()
            .app_data(app_data(users, push))
            .configure(register_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(TRIGGER_URI)
        .set_json(json!({ "to": "u1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "no_tokens");
}

#[actix_web::test]
async fn test_missing_recipient_is_not_found() {
    let users = Arc::new(InMemoryUsers::default());
    let mut push = MockPush::new();
    push.expect_send_to_devices().never();

    let app = test::init_service(
        App::new()
            .app_data(app_data(users, push))
            .configure(register_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(TRIGGER_URI)
        .set_json(json!({ "to": "ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[actix_web::test]
async fn test_provider_failure_is_bad_gateway() {
    let users = Arc::new(InMemoryUsers::with_user("u1", Some(&["A"])));
    let mut push = MockPush::new();
    push.expect_send_to_devices()
        .times(1)
        .returning(|_, _| Err(AppError::Provider("unreachable".to_string())));

    let app = test::init_service(
        App::new()
            .app_data(app_data(users, push))
            .configure(register_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(TRIGGER_URI)
        .set_json(json!({ "to": "u1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 502);
}

#[actix_web::test]
async fn test_message_without_recipient_is_bad_request() {
    let users = Arc::new(InMemoryUsers::default());
    let mut push = MockPush::new();
    push.expect_send_to_devices().never();

    let app = test::init_service(
        App::new()
            .app_data(app_data(users, push))
            .configure(register_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(TRIGGER_URI)
        .set_json(json!({ "content": "no recipient" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_get_is_not_routed() {
    let users = Arc::new(InMemoryUsers::default());
    let push = MockPush::new();

    let app = test::init_service(
        App::new()
            .app_data(app_data(users, push))
            .configure(register_routes),
    )
    .await;

    let req = test::TestRequest::get().uri(TRIGGER_URI).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
