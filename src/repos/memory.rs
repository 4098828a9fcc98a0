//! In-memory `UserStore` for unit tests.
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{UserRecord, UserStore};
use crate::services::auth::Role;

#[derive(Default)]
pub(crate) struct MemoryUserStore {
    users: Mutex<HashMap<String, UserRecord>>,
    failing: AtomicBool,
}

impl MemoryUserStore {
    pub(crate) fn insert(&self, id: &str, role: &str) -> UserRecord {
        let record = UserRecord {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            role: Role::from(role),
            is_active: true,
            deleted_at: None,
        };
        self.users
            .lock()
            .unwrap()
            .insert(id.to_string(), record.clone());
        record
    }

    pub(crate) fn deactivate(&self, id: &str) {
        if let Some(u) = self.users.lock().unwrap().get_mut(id) {
            u.is_active = false;
        }
    }

    pub(crate) fn soft_delete(&self, id: &str) {
        if let Some(u) = self.users.lock().unwrap().get_mut(id) {
            u.deleted_at = Some(chrono::Utc::now());
        }
    }

    pub(crate) fn remove(&self, id: &str) {
        self.users.lock().unwrap().remove(id);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserRecord>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn ping(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}
