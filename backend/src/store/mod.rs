//! Record store access.
//!
//! The store is a json-server style REST service exposing `/users` and
//! `/data` collections with query-by-field filtering. Callers treat every
//! `StoreError` as "the operation did not happen": they log it and carry on
//! with the rest of the batch.

mod http;
#[cfg(test)]
pub mod memory;

pub use http::HttpRecordStore;

use async_trait::async_trait;
use common::model::recipient::Recipient;
use common::model::row::{NaturalKey, Row};
use common::model::ChatId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("record store answered {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_users_by_chat_id(&self, chat_id: ChatId) -> Result<Vec<Recipient>, StoreError>;

    async fn list_users(&self) -> Result<Vec<Recipient>, StoreError>;

    async fn insert_user(&self, recipient: &Recipient) -> Result<(), StoreError>;

    async fn find_data(&self, key: &NaturalKey) -> Result<Vec<Row>, StoreError>;

    /// Inserts a row; the caller has already attached its `id`.
    async fn insert_data(&self, row: &Row) -> Result<(), StoreError>;
}
