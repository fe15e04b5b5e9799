//! Session state: the current record, history, in-flight flag and last error.
//!
//! [`SessionState`] is a plain owned value with synchronous mutations. Only
//! the orchestrator mutates it; hosts read it and may seed a history.
//! [`Session`] is the shared handle the orchestrator is given; its lock is
//! only ever held for the duration of one mutation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::history::AnalysisHistory;
use crate::models::AnalysisRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub(crate) current: Option<AnalysisRecord>,
    pub(crate) history: AnalysisHistory,
    pub(crate) in_flight: bool,
    pub(crate) error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle state seeded with a previously exported history.
    pub fn with_history(history: AnalysisHistory) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&AnalysisRecord> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &AnalysisHistory {
        &self.history
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Unset the current record and the error. History and in-flight stay.
    pub(crate) fn clear_current(&mut self) {
        self.current = None;
        self.error = None;
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// Make a history record current. Returns false if the ID is unknown.
    pub(crate) fn load_from_history(&mut self, id: &str) -> bool {
        match self.history.get(id) {
            Some(record) => {
                self.current = Some(record.clone());
                true
            }
            None => false,
        }
    }

    /// Remove a record from history, unsetting current if it pointed there.
    pub(crate) fn delete_from_history(&mut self, id: &str) -> Option<AnalysisRecord> {
        let removed = self.history.remove(id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
        removed
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current: self.current.clone(),
            history: self.history.to_vec(),
            is_loading: self.in_flight,
            error: self.error.clone(),
        }
    }
}

/// Point-in-time projection of a session for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub current: Option<AnalysisRecord>,
    /// Most recent first
    pub history: Vec<AnalysisRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Shared handle to one session's state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Run `f` with exclusive access to the state.
    ///
    /// A poisoned lock is recovered: every mutation leaves the state
    /// consistent before it can panic.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Export the history as a JSON array, newest first.
    pub fn export_history_json(&self) -> Result<String, serde_json::Error> {
        self.lock().history.to_json()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
