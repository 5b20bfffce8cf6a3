//! `Messenger` double that records every outbound call.

use super::{Messenger, TransportError};
use async_trait::async_trait;
use common::model::ChatId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: ChatId, text: String },
    Html { chat_id: ChatId, html: String },
    ContactRequest { chat_id: ChatId, text: String },
    Document {
        chat_id: ChatId,
        path: PathBuf,
        file_name: String,
        content: String,
    },
}

impl Sent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Sent::Text { chat_id, .. }
            | Sent::Html { chat_id, .. }
            | Sent::ContactRequest { chat_id, .. }
            | Sent::Document { chat_id, .. } => *chat_id,
        }
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_documents: AtomicBool,
    failing_text_prefix: Mutex<Option<String>>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id() == chat_id)
            .collect()
    }

    /// Registers the bytes returned by `download_file(file_id)`.
    pub fn add_file(&self, file_id: &str, bytes: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), bytes);
    }

    pub fn fail_documents(&self, fail: bool) {
        self.fail_documents.store(fail, Ordering::SeqCst);
    }

    /// Makes `send_text` fail for texts starting with `prefix`. The attempt
    /// is still recorded.
    pub fn fail_texts_starting_with(&self, prefix: &str) {
        *self.failing_text_prefix.lock().unwrap() = Some(prefix.to_string());
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.record(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        let failing = self.failing_text_prefix.lock().unwrap();
        if failing.as_deref().is_some_and(|prefix| text.starts_with(prefix)) {
            return Err(TransportError::Api("Too Many Requests".to_string()));
        }
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<(), TransportError> {
        self.record(Sent::Html {
            chat_id,
            html: html.to_string(),
        });
        Ok(())
    }

    async fn request_contact(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.record(Sent::ContactRequest {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
    ) -> Result<(), TransportError> {
        // Reading proves the file existed at send time.
        let content = std::fs::read_to_string(path)?;
        self.record(Sent::Document {
            chat_id,
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            content,
        });
        if self.fail_documents.load(Ordering::SeqCst) {
            return Err(TransportError::Api("Request Entity Too Large".to_string()));
        }
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| TransportError::MissingFilePath(file_id.to_string()))
    }
}
