// src/web/handlers/system_handlers.rs
use crate::job_analysis::WebhookNotifier;
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn test_webhook_handler(state: &State<ServerState>) -> ApiResult<TextResponse> {
    let settings = state
        .analyzer
        .config()
        .load_settings()
        .await
        .map_err(|e| api_error(&e, None))?;

    let notifier = match WebhookNotifier::from_settings(&settings.webhook) {
        Ok(Some(notifier)) => notifier,
        Ok(None) => {
            return Err(StandardErrorResponse::new(
                "No webhook URL configured".to_string(),
                "WEBHOOK_NOT_CONFIGURED".to_string(),
                vec!["Set webhook.url in the settings file".to_string()],
                None,
            )
            .with_status(Status::BadRequest))
        }
        Err(e) => return Err(api_error(&e, None)),
    };

    match notifier.send_test().await {
        Ok(()) => {
            info!("Test webhook delivered to {}", notifier.url());
            Ok(Json(TextResponse::success(
                "Test webhook sent successfully".to_string(),
                None,
            )))
        }
        Err(e) => {
            error!("Test webhook failed: {}", e);
            Err(api_error(&anyhow::Error::from(e), None))
        }
    }
}

pub async fn health_handler() -> Json<TextResponse> {
    info!("Health check");
    Json(TextResponse::success("OK".to_string(), None))
}
