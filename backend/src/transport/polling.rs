//! Long-polling intake.

use super::update::Update;
use super::TelegramClient;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Pause after a failed `getUpdates` before asking again.
const ERROR_PAUSE: Duration = Duration::from_secs(3);

/// Pulls updates from Telegram and forwards them, in order, to the event loop.
///
/// Returns when the event loop has gone away.
pub async fn run_long_polling(client: Arc<TelegramClient>, tx: mpsc::Sender<Update>) {
    if let Err(e) = client.delete_webhook().await {
        warn!("Could not clear webhook before polling: {}", e);
    }
    info!("Long polling started");

    let mut offset: Option<i64> = None;
    loop {
        match client.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if tx.send(update).await.is_err() {
                        info!("Event loop closed, stopping long polling");
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                tokio::time::sleep(ERROR_PAUSE).await;
            }
        }
    }
}
