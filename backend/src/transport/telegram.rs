use super::update::Update;
use super::{Messenger, TransportError};
use async_trait::async_trait;
use common::model::ChatId;
use log::info;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Headroom on top of the long-poll timeout before the HTTP client gives up.
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 15;

/// Envelope of every Bot API response.
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct TelegramFile {
    #[serde(default)]
    file_path: Option<String>,
}

/// Telegram Bot API client.
pub struct TelegramClient {
    http_client: Client,
    api_url: String,
    token: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        poll_timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(
                poll_timeout_secs + REQUEST_TIMEOUT_MARGIN_SECS,
            ))
            .build()?;
        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        read_result(response).await
    }

    /// Fetches the next batch of updates, blocking up to the poll timeout.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "setWebhook",
                &json!({
                    "url": url,
                    "secret_token": secret,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;
        info!("Webhook registered at {}", url);
        Ok(())
    }

    /// Polling and a registered webhook are mutually exclusive on Telegram's side.
    pub async fn delete_webhook(&self) -> Result<(), TransportError> {
        let _: bool = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }

    async fn send_message(&self, body: serde_json::Value) -> Result<(), TransportError> {
        let _: IgnoredAny = self.call("sendMessage", &body).await?;
        Ok(())
    }
}

async fn read_result<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    // Telegram answers errors with a JSON envelope too, so the status code is
    // not checked separately.
    let envelope: ApiResponse<T> = response.json().await?;
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { description, .. } => Err(TransportError::Api(
            description.unwrap_or_else(|| "unknown error".to_string()),
        )),
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.send_message(json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<(), TransportError> {
        self.send_message(json!({
            "chat_id": chat_id,
            "text": html,
            "parse_mode": "HTML",
        }))
        .await
    }

    async fn request_contact(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.send_message(json!({
            "chat_id": chat_id,
            "text": text,
            "reply_markup": {
                "keyboard": [[{ "text": "📱 Telefon raqamni yuborish", "request_contact": true }]],
                "resize_keyboard": true,
                "one_time_keyboard": true,
            },
        }))
        .await
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
    ) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(path).await?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .http_client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let _: IgnoredAny = read_result(response).await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file: TelegramFile = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| TransportError::MissingFilePath(file_id.to_string()))?;

        let url = format!("{}/file/bot{}/{}", self.api_url, self.token, file_path);
        let response = self.http_client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
