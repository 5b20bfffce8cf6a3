//! Slash commands.

use super::context::BotContext;
use super::events::Sender;
use super::messages;
use crate::config::BotVariant;
use crate::error::BotError;
use common::model::ChatId;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Users,
    Send { chat_id: ChatId, text: String },
    /// `/send` with missing or malformed arguments.
    SendUsage,
    /// Anything else starting with `/`. Ignored.
    Other(String),
}

impl Command {
    /// `None` when `text` is not a command at all.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim_start();
        if !text.starts_with('/') {
            return None;
        }
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };
        // Group chats address commands as `/users@some_bot`.
        let name = head.split('@').next().unwrap_or(head);

        Some(match name {
            "/start" => Command::Start,
            "/users" => Command::Users,
            "/send" => parse_send(rest),
            other => Command::Other(other.to_string()),
        })
    }
}

fn parse_send(args: &str) -> Command {
    let Some((id, text)) = args.split_once(char::is_whitespace) else {
        return Command::SendUsage;
    };
    let text = text.trim();
    match id.parse::<ChatId>() {
        Ok(chat_id) if !text.is_empty() => Command::Send {
            chat_id,
            text: text.to_string(),
        },
        _ => Command::SendUsage,
    }
}

impl BotContext {
    pub(super) async fn on_command(
        &mut self,
        chat_id: ChatId,
        sender: &Sender,
        command: Command,
    ) -> Result<(), BotError> {
        match command {
            Command::Start => self.on_start(chat_id, sender).await,
            Command::Users => self.on_users(chat_id, sender).await,
            Command::Send { chat_id: target, text } => {
                self.on_send(chat_id, sender, Some((target, text))).await
            }
            Command::SendUsage => self.on_send(chat_id, sender, None).await,
            Command::Other(name) => {
                info!("Ignoring unknown command {} from {}", name, sender.id);
                Ok(())
            }
        }
    }

    /// Lists registered users. Non-admins get no reply.
    async fn on_users(&self, chat_id: ChatId, sender: &Sender) -> Result<(), BotError> {
        if !self.admins.contains(sender.id) {
            info!("Ignoring /users from non-admin {}", sender.id);
            return Ok(());
        }

        match self.variant {
            BotVariant::Simple => {
                let text = if self.registered.is_empty() {
                    messages::USERS_EMPTY.to_string()
                } else {
                    let lines: Vec<String> = self
                        .registered
                        .iter()
                        .map(|id| format!("ID: {}", id))
                        .collect();
                    format!("{}\n{}", messages::USERS_HEADER, lines.join("\n"))
                };
                self.messenger.send_text(chat_id, &text).await?;
            }
            BotVariant::Directory => match self.store.list_users().await {
                Ok(users) if users.is_empty() => {
                    self.messenger
                        .send_text(chat_id, messages::USERS_EMPTY)
                        .await?;
                }
                Ok(users) => {
                    self.dispatcher.deliver_json(chat_id, &users, "users").await?;
                }
                Err(e) => {
                    warn!("Could not list users: {}", e);
                    self.messenger
                        .send_text(chat_id, messages::USERS_UNAVAILABLE)
                        .await?;
                }
            },
        }
        Ok(())
    }

    /// Relays a message from an admin to any chat.
    async fn on_send(
        &self,
        chat_id: ChatId,
        sender: &Sender,
        request: Option<(ChatId, String)>,
    ) -> Result<(), BotError> {
        if self.variant != BotVariant::Simple || !self.admins.contains(sender.id) {
            info!("Ignoring /send from {}", sender.id);
            return Ok(());
        }
        let Some((target, text)) = request else {
            self.messenger
                .send_text(chat_id, messages::SEND_USAGE)
                .await?;
            return Ok(());
        };

        let reply = match self.messenger.send_text(target, &text).await {
            Ok(()) => {
                info!("Admin {} relayed a message to {}", sender.id, target);
                messages::SEND_OK.to_string()
            }
            Err(e) => {
                warn!("Relay to {} failed: {}", target, e);
                messages::failure(e)
            }
        };
        self.messenger.send_text(chat_id, &reply).await?;
        Ok(())
    }
}
