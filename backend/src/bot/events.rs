//! Incoming updates reduced to the events the bot reacts to.

use super::commands::Command;
use crate::transport::update::{Document, Update};
use common::model::ChatId;

#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: ChatId,
    pub username: Option<String>,
    pub first_name: String,
}

impl Sender {
    /// `@username`, or `@<id>` for users without one.
    pub fn mention(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => format!("@{}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    Command {
        chat_id: ChatId,
        sender: Sender,
        command: Command,
    },
    Document {
        chat_id: ChatId,
        sender: Sender,
        document: Document,
    },
    Contact {
        chat_id: ChatId,
        sender: Sender,
        phone_number: String,
        first_name: String,
    },
    /// A shared contact card that is not the sender's own.
    ForeignContact { chat_id: ChatId, sender: Sender },
}

impl BotEvent {
    /// `None` for updates the bot ignores: plain text, stickers, edits,
    /// messages without a sender.
    pub fn from_update(update: Update) -> Option<BotEvent> {
        let message = update.message?;
        let from = message.from?;
        let chat_id = message.chat.id;
        let sender = Sender {
            id: from.id,
            username: from.username,
            first_name: from.first_name,
        };

        if let Some(document) = message.document {
            return Some(BotEvent::Document {
                chat_id,
                sender,
                document,
            });
        }
        if let Some(contact) = message.contact {
            if contact.user_id != Some(sender.id) {
                return Some(BotEvent::ForeignContact { chat_id, sender });
            }
            let first_name = if contact.first_name.trim().is_empty() {
                sender.first_name.clone()
            } else {
                contact.first_name
            };
            return Some(BotEvent::Contact {
                chat_id,
                sender,
                phone_number: contact.phone_number,
                first_name,
            });
        }
        let command = Command::parse(message.text.as_deref()?)?;
        Some(BotEvent::Command {
            chat_id,
            sender,
            command,
        })
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            BotEvent::Command { chat_id, .. }
            | BotEvent::Document { chat_id, .. }
            | BotEvent::Contact { chat_id, .. }
            | BotEvent::ForeignContact { chat_id, .. } => *chat_id,
        }
    }
}
