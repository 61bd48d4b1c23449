// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session store keyed by user.
//
// The map itself sits behind a short-lived std mutex. Each session has its
// own async mutex, held for the whole handling of one event, so events for
// the same user are serialised while different users run concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hujjat_core::UserId;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use crate::session::Session;

pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<UserId, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's session, created on first contact.
    pub fn session(&self, user_id: UserId) -> SharedSession {
        self.map()
            .entry(user_id)
            .or_insert_with(|| {
                debug!(user = %user_id, "Session created");
                Arc::new(tokio::sync::Mutex::new(Session::new(user_id)))
            })
            .clone()
    }

    /// Lock the user's live session for the handling of one event.
    ///
    /// A sweep can drop the session between fetching it and acquiring its
    /// lock. The lock is only returned once the locked session is still the
    /// one in the map; otherwise the lookup is retried.
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<Session> {
        loop {
            let shared = self.session(user_id);
            let guard = Arc::clone(&shared).lock_owned().await;
            if Arc::ptr_eq(&shared, &self.session(user_id)) {
                return guard;
            }
            debug!(user = %user_id, "Session swept while waiting, retrying");
        }
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than `max_age`, releasing their uploads.
    /// Returns how many were dropped.
    pub fn sweep_idle(&self, max_age: Duration) -> usize {
        self.sweep_idle_at(max_age, Utc::now())
    }

    /// [`SessionStore::sweep_idle`] against an explicit clock.
    ///
    /// Sessions busy with an event are skipped; they are not idle.
    pub fn sweep_idle_at(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut sessions = self.map();
        let before = sessions.len();
        sessions.retain(|user_id, session| match session.try_lock() {
            Ok(mut session) if session.idle_for(now) > max_age => {
                debug!(user = %user_id, "Sweeping idle session");
                session.reset();
                false
            }
            _ => true,
        });
        let swept = before - sessions.len();
        if swept > 0 {
            info!(swept, remaining = sessions.len(), "Idle sessions swept");
        }
        swept
    }

    fn map(&self) -> MutexGuard<'_, HashMap<UserId, SharedSession>> {
        match self.sessions.lock() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
