use super::admins::AdminSet;
use crate::config::{BotVariant, Config};
use crate::job_controller::state::JobsState;
use crate::pipeline::dispatch::Dispatcher;
use crate::pipeline::matching::PhoneMatch;
use crate::store::RecordStore;
use crate::transport::Messenger;
use common::model::ChatId;
use std::collections::HashSet;
use std::sync::Arc;

/// Everything a handler needs, owned by the event loop.
///
/// Events are handled one at a time, so the in-memory sets are not locked.
/// None of them survive a restart.
pub struct BotContext {
    pub(super) variant: BotVariant,
    pub(super) phone_match: PhoneMatch,
    pub(super) admins: AdminSet,
    pub(super) store: Arc<dyn RecordStore>,
    pub(super) messenger: Arc<dyn Messenger>,
    pub(super) dispatcher: Dispatcher,
    pub(super) jobs: JobsState,
    /// `file_unique_id`s of uploads already accepted.
    pub(super) processed_files: HashSet<String>,
    /// Chats that sent `/start`, in arrival order (`simple` variant only).
    pub(super) registered: Vec<ChatId>,
}

impl BotContext {
    pub fn new(
        config: &Config,
        store: Arc<dyn RecordStore>,
        messenger: Arc<dyn Messenger>,
        jobs: JobsState,
    ) -> Self {
        BotContext {
            variant: config.variant,
            phone_match: config.phone_match,
            admins: AdminSet::new(&config.admins, &config.superadmins),
            dispatcher: Dispatcher::new(messenger.clone(), config.work_dir.clone()),
            store,
            messenger,
            jobs,
            processed_files: HashSet::new(),
            registered: Vec::new(),
        }
    }
}
