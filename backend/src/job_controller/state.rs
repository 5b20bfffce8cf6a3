//! Tracks the progress of admin upload cycles.
//!
//! The event loop processes one upload at a time, but operators may want to
//! follow a long upload from outside the chat. Each admin upload registers an
//! `UploadJob`; the pipeline reports through it, and `start_job_updater`
//! folds those reports into the shared map read by
//! `GET /api/uploads/status/{job_id}`.

use common::jobs::JobStatus;
use log::debug;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Shared, clonable view of every upload job.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to its latest status. Written only by `start_job_updater`
    /// and `create_job`.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Channel into the updater task.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status change for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending`.
    pub async fn create_job(&self) -> UploadJob {
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        UploadJob {
            job_id,
            tx: self.tx.clone(),
        }
    }
}

/// Reporting handle given to a running upload cycle.
pub struct UploadJob {
    pub job_id: String,
    tx: mpsc::Sender<JobUpdate>,
}

impl UploadJob {
    /// Reports `done` of `total` rows. Dropped when the updater is behind.
    pub fn progress(&self, done: usize, total: usize) {
        let percent = if total > 0 {
            (done as f32 / total as f32 * 100.0) as u32
        } else {
            0
        };
        let _ = self.tx.try_send(JobUpdate {
            job_id: self.job_id.clone(),
            status: JobStatus::InProgress(percent),
        });
    }

    pub async fn complete(&self, summary: String) {
        self.finish(JobStatus::Completed(summary)).await;
    }

    pub async fn fail(&self, reason: String) {
        self.finish(JobStatus::Failed(reason)).await;
    }

    async fn finish(&self, status: JobStatus) {
        let _ = self
            .tx
            .send(JobUpdate {
                job_id: self.job_id.clone(),
                status,
            })
            .await;
    }
}

/// Applies job updates to the shared map until every sender is gone.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        debug!("Job {} -> {:?}", update.job_id, update.status);
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}
