//! In-process `RecordStore` used by the pipeline and bot tests.

use super::{RecordStore, StoreError};
use async_trait::async_trait;
use common::model::recipient::Recipient;
use common::model::row::{NaturalKey, Row};
use common::model::ChatId;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<Vec<Recipient>>,
    pub data: Mutex<Vec<Row>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
    fail_next_insert: AtomicBool,
}

impl MemoryStore {
    pub fn with_users(users: Vec<Recipient>) -> Self {
        let store = Self::default();
        *store.users.lock().unwrap() = users;
        store
    }

    /// Total number of store operations attempted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every following call fail like a refused connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes the next `insert_data` fail after its lookup succeeded.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    pub fn data(&self) -> Vec<Row> {
        self.data.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                body: "store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_users_by_chat_id(&self, chat_id: ChatId) -> Result<Vec<Recipient>, StoreError> {
        self.enter()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| u.chat_id == chat_id).cloned().collect())
    }

    async fn list_users(&self) -> Result<Vec<Recipient>, StoreError> {
        self.enter()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn insert_user(&self, recipient: &Recipient) -> Result<(), StoreError> {
        self.enter()?;
        self.users.lock().unwrap().push(recipient.clone());
        Ok(())
    }

    async fn find_data(&self, key: &NaturalKey) -> Result<Vec<Row>, StoreError> {
        self.enter()?;
        let data = self.data.lock().unwrap();
        Ok(data
            .iter()
            .filter(|row| row.natural_key().as_ref() == Some(key))
            .cloned()
            .collect())
    }

    async fn insert_data(&self, row: &Row) -> Result<(), StoreError> {
        self.enter()?;
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 500,
                body: "insert failed".to_string(),
            });
        }
        self.data.lock().unwrap().push(row.clone());
        Ok(())
    }
}
