//! Delivery of row payloads to a chat.
//!
//! Payloads are rendered as pretty-printed JSON. Short ones go out as an
//! inline `<pre>` message; anything longer than `INLINE_LIMIT` UTF-16 units
//! (Telegram measures message length in those) is written to a temporary
//! `.json` file in the work directory and sent as a document. The temporary
//! file is removed whether the upload succeeds or not.

use crate::transport::{Messenger, TransportError};
use common::model::ChatId;
use log::{debug, warn};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Largest payload sent inline; Telegram caps a message at 4096 units.
pub const INLINE_LIMIT: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Inline,
    Attachment,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not render payload: {0}")]
    Render(#[from] serde_json::Error),
    #[error("could not write attachment: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
    work_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn Messenger>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            messenger,
            work_dir: work_dir.into(),
        }
    }

    /// Renders `payload` and delivers it. `label` names the attachment
    /// (`<label>.json`) and prefixes its temporary file.
    pub async fn deliver_json<T>(
        &self,
        chat_id: ChatId,
        payload: &T,
        label: &str,
    ) -> Result<DeliveryMode, DispatchError>
    where
        T: Serialize + ?Sized,
    {
        let text = render(payload)?;
        self.deliver_text(chat_id, &text, label).await
    }

    pub async fn deliver_text(
        &self,
        chat_id: ChatId,
        text: &str,
        label: &str,
    ) -> Result<DeliveryMode, DispatchError> {
        if text_length(text) <= INLINE_LIMIT {
            let html = format!("<pre>{}</pre>", escape_html(text));
            self.messenger.send_html(chat_id, &html).await?;
            return Ok(DeliveryMode::Inline);
        }

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}_", label))
            .suffix(".json")
            .tempfile_in(&self.work_dir)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        debug!("Payload for {} staged at {}", chat_id, file.path().display());

        let sent = self
            .messenger
            .send_document(chat_id, file.path(), &format!("{}.json", label))
            .await;
        if let Err(e) = file.close() {
            warn!("Could not remove temporary payload file: {}", e);
        }
        sent?;
        Ok(DeliveryMode::Attachment)
    }
}

/// Two-space indented JSON, the layout operators are used to reading.
pub fn render<T: Serialize + ?Sized>(payload: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(payload)
}

/// Message length as Telegram counts it.
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
