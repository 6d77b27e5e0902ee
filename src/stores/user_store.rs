use crate::core::error::StoreError;
use crate::models::user::{User, UserId};
use crate::wal::wal::{Wal, WalOperation};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Account records keyed by id, with a case-sensitive unique email index
pub struct UserStore {
    users: DashMap<UserId, Arc<User>>,
    emails: DashMap<String, UserId>,
    wal: Arc<Wal>,
}

impl UserStore {
    pub fn new(wal: Arc<Wal>) -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            wal,
        }
    }

    /// Insert a new account. The email slot is claimed atomically, so two
    /// concurrent registrations for one address cannot both succeed.
    pub fn insert(&self, user: User) -> Result<Arc<User>, StoreError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::EmailTaken),
            Entry::Vacant(slot) => {
                self.wal.log_operation(&WalOperation::PutUser { user: user.clone() })?;
                slot.insert(user.id);
                let user = Arc::new(user);
                self.users.insert(user.id, Arc::clone(&user));
                Ok(user)
            }
        }
    }

    /// Apply a record read back from the log without logging it again
    pub fn restore(&self, user: User) {
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, Arc::new(user));
    }

    pub fn find_by_email(&self, email: &str) -> Option<Arc<User>> {
        let id = *self.emails.get(email)?.value();
        self.find_by_id(id)
    }

    pub fn find_by_id(&self, id: UserId) -> Option<Arc<User>> {
        self.users.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn snapshot(&self) -> Vec<User> {
        self.users.iter().map(|entry| entry.value().as_ref().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
