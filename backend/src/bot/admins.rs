use common::model::recipient::Role;
use common::model::ChatId;
use std::collections::HashSet;

/// Statically configured administrators, fixed for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct AdminSet {
    admins: HashSet<ChatId>,
    superadmins: HashSet<ChatId>,
    /// Union of both lists in configuration order, without repeats.
    members: Vec<ChatId>,
}

impl AdminSet {
    pub fn new(admins: &[ChatId], superadmins: &[ChatId]) -> Self {
        let mut members = Vec::new();
        for id in admins.iter().chain(superadmins) {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        AdminSet {
            admins: admins.iter().copied().collect(),
            superadmins: superadmins.iter().copied().collect(),
            members,
        }
    }

    pub fn contains(&self, id: ChatId) -> bool {
        self.admins.contains(&id) || self.superadmins.contains(&id)
    }

    /// Superadmin wins over admin, admin over the default user role.
    pub fn role_of(&self, id: ChatId) -> Role {
        if self.superadmins.contains(&id) {
            Role::Superadmin
        } else if self.admins.contains(&id) {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn members(&self) -> &[ChatId] {
        &self.members
    }
}
