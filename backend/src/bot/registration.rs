//! `/start` and contact-share registration.

use super::context::BotContext;
use super::events::Sender;
use super::messages;
use crate::config::BotVariant;
use crate::error::BotError;
use common::model::recipient::Recipient;
use common::model::ChatId;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
    MissingPhone,
    Failed,
    /// Contact shares mean nothing to the `simple` variant.
    Ignored,
}

impl BotContext {
    pub(super) async fn on_start(&mut self, chat_id: ChatId, sender: &Sender) -> Result<(), BotError> {
        match self.variant {
            BotVariant::Simple => {
                if !self.registered.contains(&chat_id) {
                    self.registered.push(chat_id);
                    info!("Chat {} started the bot", chat_id);
                }
                self.messenger.send_text(chat_id, messages::WELCOME).await?;
            }
            BotVariant::Directory => match self.store.find_users_by_chat_id(chat_id).await {
                Ok(users) if !users.is_empty() => {
                    self.messenger
                        .send_text(chat_id, messages::ALREADY_REGISTERED)
                        .await?;
                }
                result => {
                    if let Err(e) = result {
                        warn!("Registration lookup for {} failed: {}", sender.id, e);
                    }
                    self.messenger
                        .request_contact(chat_id, messages::SHARE_CONTACT)
                        .await?;
                }
            },
        }
        Ok(())
    }

    pub(super) async fn on_contact(
        &self,
        chat_id: ChatId,
        sender: &Sender,
        phone_number: &str,
        first_name: &str,
    ) -> Result<RegistrationOutcome, BotError> {
        if self.variant == BotVariant::Simple {
            return Ok(RegistrationOutcome::Ignored);
        }
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            self.messenger
                .send_text(chat_id, messages::PHONE_MISSING)
                .await?;
            return Ok(RegistrationOutcome::MissingPhone);
        }

        let outcome = match self.store.find_users_by_chat_id(chat_id).await {
            Ok(users) if !users.is_empty() => RegistrationOutcome::AlreadyRegistered,
            Ok(_) => {
                let recipient = Recipient {
                    chat_id,
                    first_name: first_name.to_string(),
                    phone_number: phone_number.to_string(),
                    role: self.admins.role_of(sender.id),
                };
                match self.store.insert_user(&recipient).await {
                    Ok(()) => {
                        info!("Registered chat {} as {}", chat_id, recipient.role);
                        RegistrationOutcome::Registered
                    }
                    Err(e) => {
                        warn!("Could not register chat {}: {}", chat_id, e);
                        RegistrationOutcome::Failed
                    }
                }
            }
            Err(e) => {
                warn!("Registration lookup for {} failed: {}", chat_id, e);
                RegistrationOutcome::Failed
            }
        };

        let reply = match outcome {
            RegistrationOutcome::Registered => messages::REGISTERED,
            RegistrationOutcome::AlreadyRegistered => messages::ALREADY_REGISTERED,
            _ => messages::REGISTRATION_FAILED,
        };
        self.messenger.send_text(chat_id, reply).await?;
        Ok(outcome)
    }

    /// Contact cards of other people are never registered.
    pub(super) async fn on_foreign_contact(
        &self,
        chat_id: ChatId,
        sender: &Sender,
    ) -> Result<(), BotError> {
        if self.variant == BotVariant::Simple {
            return Ok(());
        }
        warn!("Chat {} shared a contact that is not their own", sender.id);
        self.messenger
            .send_text(chat_id, messages::OWN_CONTACT_ONLY)
            .await?;
        Ok(())
    }
}
