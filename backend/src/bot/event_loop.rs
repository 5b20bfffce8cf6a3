use super::context::BotContext;
use super::events::BotEvent;
use super::messages;
use crate::error::BotError;
use crate::transport::update::Update;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;

/// Handles updates one at a time until every producer is gone.
pub async fn run_event_loop(mut ctx: BotContext, mut rx: mpsc::Receiver<Update>) {
    info!("Event loop started");
    while let Some(update) = rx.recv().await {
        let update_id = update.update_id;
        match BotEvent::from_update(update) {
            Some(event) => ctx.handle(event).await,
            None => debug!("Ignoring update {}", update_id),
        }
    }
    info!("Event loop stopped");
}

impl BotContext {
    /// Runs the handler for `event`. Errors are reported back to the chat.
    pub async fn handle(&mut self, event: BotEvent) {
        let chat_id = event.chat_id();
        if let Err(e) = self.dispatch(event).await {
            error!("Handling an event from chat {} failed: {}", chat_id, e);
            if let Err(e) = self
                .messenger
                .send_text(chat_id, &messages::failure(&e))
                .await
            {
                warn!("Could not report the failure to {}: {}", chat_id, e);
            }
        }
    }

    async fn dispatch(&mut self, event: BotEvent) -> Result<(), BotError> {
        match event {
            BotEvent::Command {
                chat_id,
                sender,
                command,
            } => self.on_command(chat_id, &sender, command).await,
            BotEvent::Document {
                chat_id,
                sender,
                document,
            } => self.on_document(chat_id, &sender, &document).await,
            BotEvent::Contact {
                chat_id,
                sender,
                phone_number,
                first_name,
            } => {
                let outcome = self
                    .on_contact(chat_id, &sender, &phone_number, &first_name)
                    .await?;
                debug!("Contact from {}: {:?}", chat_id, outcome);
                Ok(())
            }
            BotEvent::ForeignContact { chat_id, sender } => {
                self.on_foreign_contact(chat_id, &sender).await
            }
        }
    }
}
