use super::WebhookState;
use crate::transport::update::Update;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{debug, warn};

const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

pub(crate) async fn process(
    request: HttpRequest,
    update: web::Json<Update>,
    state: web::Data<WebhookState>,
) -> impl Responder {
    if let Some(secret) = &state.secret {
        let presented = request
            .headers()
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if presented != Some(secret.as_str()) {
            warn!("Rejected webhook call with a missing or wrong secret");
            return HttpResponse::Unauthorized().finish();
        }
    }

    let update = update.into_inner();
    debug!("Webhook update {}", update.update_id);
    // Telegram retries anything but 2xx, so only a stopped loop is reported.
    match state.tx.send(update).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(_) => HttpResponse::ServiceUnavailable().body("Bot is shutting down"),
    }
}
