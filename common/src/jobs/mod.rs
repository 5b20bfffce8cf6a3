use serde::Serialize;

/// Lifecycle of one admin upload cycle, as reported by the status endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of rows already pushed through the upsert step.
    InProgress(u32),
    Completed(String),
    Failed(String),
}
