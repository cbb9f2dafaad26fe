use crate::config::BrowserConfig;
use crate::session::{SessionInfo, SessionSnapshot, Step};
use crate::token::{RandomTokens, TokenSource};
use insights_protocol::Corpus;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct StoreInner {
    sessions: HashMap<String, SessionInfo>,
    tokens: Box<dyn TokenSource>,
}

/// Outcome of one action, captured while the store lock was held.
#[derive(Debug, Clone)]
pub struct TakeActionOutcome {
    pub step: Step,
    /// Every known session, when requested.
    pub sessions: Option<BTreeMap<String, SessionSnapshot>>,
}

/// All browsing sessions of the process behind a single lock.
///
/// Every action runs to completion under the lock, so requests for the same
/// session are totally ordered. Nothing under the lock blocks on I/O.
pub struct SessionStore {
    inner: Mutex<StoreInner>,
    retention: usize,
}

impl SessionStore {
    pub fn new(retention: usize) -> Self {
        Self::with_token_source(retention, Box::new(RandomTokens::new()))
    }

    /// Store whose sessions keep `config.action_token_retention` insights' tokens.
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(config.action_token_retention)
    }

    pub fn with_token_source(retention: usize, tokens: Box<dyn TokenSource>) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                sessions: HashMap::new(),
                tokens,
            }),
            retention,
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    // Sessions stay consistent across a panicking action; keep serving.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Draws a session id not held by any known session.
    ///
    /// Nothing is stored until the first action arrives for the id.
    pub fn create_session(&self) -> String {
        let mut inner = self.lock();
        let mut id = inner.tokens.next_token();
        while id.is_empty() || inner.sessions.contains_key(&id) {
            id = inner.tokens.next_token();
        }
        log::debug!("Issued browsing session id {id}");
        id
    }

    /// Runs one action for `session_id`, creating the session on first contact.
    pub fn take_action(
        &self,
        corpus: &Corpus,
        session_id: &str,
        token: &str,
        with_sessions: bool,
    ) -> TakeActionOutcome {
        let mut guard = self.lock();
        let StoreInner { sessions, tokens } = &mut *guard;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionInfo::new(self.retention));
        let step = session.take_action(corpus, token, tokens.as_mut());
        let sessions = with_sessions.then(|| snapshot(sessions));
        TakeActionOutcome { step, sessions }
    }

    pub fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.lock().sessions.get(session_id).map(SessionInfo::snapshot)
    }

    pub fn snapshot_all(&self) -> BTreeMap<String, SessionSnapshot> {
        snapshot(&self.lock().sessions)
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(16)
    }
}

fn snapshot(sessions: &HashMap<String, SessionInfo>) -> BTreeMap<String, SessionSnapshot> {
    sessions
        .iter()
        .map(|(id, info)| (id.clone(), info.snapshot()))
        .collect()
}
