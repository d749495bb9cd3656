//! In-memory session store
//!
//! Holds per-user form values, the uploaded document and the latest
//! generated questions and records between requests

use crate::models::{CategorySet, ProviderId, QARecord};
use crate::services::extractor::DocumentKind;
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Form values collected from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub categories: CategorySet,
    /// Ground prompts in the uploaded document and attach it to exports
    pub reference_mode: bool,
    pub num_questions: u8,
}

/// Uploaded document with its extracted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub filename: String,
    pub kind: DocumentKind,
    pub text: String,
}

/// One user's working state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every read or update
    pub last_access: DateTime<Utc>,
    pub form: FormState,
    pub document: Option<UploadedDocument>,
    pub questions: Vec<String>,
    pub question_provider: Option<ProviderId>,
    pub records: Vec<QARecord>,
}

impl Session {
    pub fn new(default_questions: u8) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_access: now,
            form: FormState {
                categories: CategorySet::default(),
                reference_mode: true,
                num_questions: default_questions,
            },
            document: None,
            questions: Vec::new(),
            question_provider: None,
            records: Vec::new(),
        }
    }

    /// Document text to ground prompts in; `None` outside reference mode or
    /// before an upload
    pub fn reference_text(&self) -> Option<&str> {
        if self.form.reference_mode {
            self.document.as_ref().map(|d| d.text.as_str())
        } else {
            None
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_access > ttl
    }
}

/// Default inactivity limit
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Session store shared by the HTTP handlers
///
/// Sessions idle for longer than the TTL are dropped. Expired entries are
/// purged whenever a session is created, and an expired session looked up by
/// id is reported as not found.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Store built from the configured TTL in seconds
    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        // Duration::seconds panics above i64::MAX / 1000
        let secs = ttl_secs.min(i64::MAX as u64 / 1000) as i64;
        Self::new(Duration::seconds(secs))
    }

    /// Create and store a fresh session, dropping expired ones
    pub async fn create(&self, default_questions: u8) -> Session {
        let session = Session::new(default_questions);
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(session.created_at, self.ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} expired sessions", evicted);
        }

        sessions.insert(session.id, session.clone());
        session
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> AppResult<Session> {
        self.update(id, |session| session.clone()).await
    }

    /// Apply `f` to a stored session
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;

        if sessions.get(&id).is_some_and(|s| s.is_expired(now, self.ttl)) {
            sessions.remove(&id);
            debug!("Session {} expired", id);
        }

        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
        session.last_access = now;
        Ok(f(session))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
