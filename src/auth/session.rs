//! In-memory login sessions with an idle timeout

use std::collections::HashMap;
use std::sync::Mutex;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;
use crate::entity::User;

/// Default idle timeout in minutes
pub const DEFAULT_IDLE_MINUTES: i64 = 30;

/// What a session remembers about its user
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub last_seen: DateTime<Utc>,
}

/// Session table shared by all requests
pub struct SessionStore {
    idle_timeout: TimeDelta,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(TimeDelta::minutes(DEFAULT_IDLE_MINUTES))
    }
}

impl SessionStore {
    pub fn new(idle_timeout: TimeDelta) -> Self {
        Self {
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a session for a user. Idle sessions are swept first.
    pub fn create(&self, user: &User) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.full_name(),
            last_seen: now,
        };
        let mut sessions = self.lock();
        sessions.retain(|_, s| now - s.last_seen <= self.idle_timeout);
        sessions.insert(session.id, session.clone());
        session
    }

    /// Look up a live session and mark it as used
    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.get_at(id, Utc::now())
    }

    /// Same as [`SessionStore::get`] with an explicit clock
    pub fn get_at(&self, id: &Uuid, now: DateTime<Utc>) -> Option<Session> {
        let mut sessions = self.lock();
        let expired = match sessions.get(id) {
            Some(session) => now - session.last_seen > self.idle_timeout,
            None => return None,
        };

        if expired {
            sessions.remove(id);
            return None;
        }

        let session = sessions.get_mut(id)?;
        session.last_seen = now;
        Some(session.clone())
    }

    /// End a session. Returns false if it did not exist.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drop every session idle for longer than the timeout
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen <= self.idle_timeout);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
