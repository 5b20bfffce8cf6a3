//! Read-only view of admin upload jobs.
//!
//! - `GET /api/uploads/status/{job_id}`: the current `JobStatus` of an upload
//!   (`Pending`, `InProgress`, `Completed` with the summary, or `Failed` with
//!   the reason), or `404` for unknown ids. Job ids are logged when an admin
//!   upload starts.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod get_status;

const API_PATH: &str = "/api/uploads";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/status/{job_id}", get().to(get_status::process))
}
