/// Message trigger endpoint
///
/// The trigger source posts each newly created message record here. A
/// non-2xx response fails the invocation so the source can re-deliver.
use actix_web::{web, HttpResponse};
use std::sync::Arc;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::models::{Message, MessageCreatedEvent, MessagePath};
use crate::services::NotificationDispatcher;

/// Handle a created message record
///
/// POST /triggers/messages/{chat_id}/{thread_id}/{message_id}
pub async fn message_created(
    dispatcher: web::Data<Arc<NotificationDispatcher>>,
    path: web::Path<(String, String, String)>,
    message: web::Json<Message>,
) -> Result<HttpResponse> {
    let (chat_id, thread_id, message_id) = path.into_inner();
    let event = MessageCreatedEvent {
        path: MessagePath {
            chat_id,
            thread_id,
            message_id,
        },
        message: message.into_inner(),
    };

    let outcome = dispatcher.handle_message_created(&event).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcome)))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/triggers/messages")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .route(
                "/{chat_id}/{thread_id}/{message_id}",
                web::post().to(message_created),
            ),
    );
}
