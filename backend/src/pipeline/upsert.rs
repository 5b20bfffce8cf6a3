//! Append-only upsert of uploaded rows.
//!
//! Each row is looked up by its natural key and inserted with a fresh id only
//! when the store has nothing under that key. Existing records are never
//! touched, so re-uploading a file is idempotent. The lookup and the insert
//! are separate requests: two overlapping uploads racing each other can both
//! insert the same key.

use crate::store::RecordStore;
use common::model::row::Row;
use log::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Duplicate,
    /// Name, month or organization missing; the store was not contacted.
    Malformed,
    /// The lookup or the insert failed; nothing was written.
    Failed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpsertReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub failed: usize,
}

impl UpsertReport {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Duplicate => self.duplicates += 1,
            UpsertOutcome::Malformed => self.malformed += 1,
            UpsertOutcome::Failed => self.failed += 1,
        }
    }
}

pub async fn upsert_row(store: &dyn RecordStore, row: &Row) -> UpsertOutcome {
    let Some(key) = row.natural_key() else {
        return UpsertOutcome::Malformed;
    };

    match store.find_data(&key).await {
        Ok(existing) if !existing.is_empty() => {
            debug!("Skipping existing record {:?}", key);
            UpsertOutcome::Duplicate
        }
        Ok(_) => match store.insert_data(&row.with_id(Uuid::new_v4().to_string())).await {
            Ok(()) => UpsertOutcome::Inserted,
            Err(e) => {
                warn!("Insert failed for {:?}: {}", key, e);
                UpsertOutcome::Failed
            }
        },
        Err(e) => {
            // Inserting blind could duplicate the record, so the row is dropped.
            warn!("Lookup failed for {:?}: {}", key, e);
            UpsertOutcome::Failed
        }
    }
}

/// Upserts `rows` in order. `on_progress(done, total)` runs after each row.
pub async fn upsert_rows<F>(store: &dyn RecordStore, rows: &[Row], mut on_progress: F) -> UpsertReport
where
    F: FnMut(usize, usize),
{
    let mut report = UpsertReport::default();
    for (index, row) in rows.iter().enumerate() {
        report.record(upsert_row(store, row).await);
        on_progress(index + 1, rows.len());
    }
    report
}
