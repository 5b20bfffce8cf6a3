//! Messaging transport.
//!
//! The bot only needs a handful of outbound primitives, collected in the
//! `Messenger` trait. `TelegramClient` implements them over the Telegram Bot
//! API and also provides the inbound side (long polling, webhook lifecycle).

pub mod polling;
#[cfg(test)]
pub mod recording;
mod telegram;
pub mod update;

pub use telegram::TelegramClient;

use async_trait::async_trait;
use common::model::ChatId;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("telegram rejected the call: {0}")]
    Api(String),
    #[error("file {0} has no download path")]
    MissingFilePath(String),
    #[error("attachment I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;

    /// Sends a message with HTML parse mode. The caller escapes the content.
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<(), TransportError>;

    /// Sends `text` with a one-button keyboard asking for the user's contact.
    async fn request_contact(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;

    /// Uploads the file at `path` as a document named `file_name`.
    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
    ) -> Result<(), TransportError>;

    /// Resolves the download link of an uploaded file and fetches its bytes.
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;
}
