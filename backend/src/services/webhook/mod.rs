//! Telegram webhook endpoint, mounted only when `UPDATE_MODE=webhook`.
//!
//! - `POST /telegram/webhook`: accepts one Update and queues it for the event
//!   loop. When a secret is configured, requests without the matching
//!   `X-Telegram-Bot-Api-Secret-Token` header are refused.

use crate::transport::update::Update;
use actix_web::web::{post, scope};
use actix_web::Scope;
use tokio::sync::mpsc;

mod receive;

const API_PATH: &str = "/telegram";

#[derive(Clone)]
pub struct WebhookState {
    pub tx: mpsc::Sender<Update>,
    pub secret: Option<String>,
}

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/webhook", post().to(receive::process))
}
