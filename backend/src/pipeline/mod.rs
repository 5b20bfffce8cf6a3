//! The upload pipeline: upsert rows into the record store, match them to
//! recipients, and deliver the matched rows.

pub mod dispatch;
pub mod matching;
pub mod upsert;
