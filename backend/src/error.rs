use crate::ingest::IngestError;
use crate::pipeline::dispatch::DispatchError;
use crate::transport::TransportError;
use thiserror::Error;

/// Failure of an event handler. The event loop reports it to the chat that
/// triggered the event; it never stops the bot.
///
/// Record store failures do not appear here: they are logged where they
/// happen and the affected row or lookup is skipped.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
