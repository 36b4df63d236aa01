use std::fmt;

use crate::catalog::AutocompleteEngine;
use crate::progress::ProgressSnapshot;
use crate::view_model::AppViewModel;

pub type SessionId = u64;

/// Message shown when a search is submitted with a blank product name.
pub const EMPTY_QUERY_ALERT: &str = "Please enter a product name.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed(FailureReason),
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchState::Completed | SearchState::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The analyze request was refused or never reached the backend.
    Rejected,
    /// Results were still processing when the results poll budget ran out.
    ResultsTimeout,
    /// Every results poll failed.
    ResultsUnavailable,
    /// The backend never reported completion within the progress poll budget.
    ProgressTimeout,
    /// Every progress poll failed.
    ProgressUnavailable,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Rejected => write!(f, "analysis request rejected"),
            FailureReason::ResultsTimeout => write!(f, "timed out waiting for results"),
            FailureReason::ResultsUnavailable => write!(f, "results endpoint unavailable"),
            FailureReason::ProgressTimeout => write!(f, "timed out waiting for progress"),
            FailureReason::ProgressUnavailable => write!(f, "progress endpoint unavailable"),
        }
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The loop observed its success condition.
    Ready,
    /// The tick budget ran out while the backend was still working.
    Timeout,
    /// The tick budget ran out without a single usable response.
    Error,
    /// The owning session was cancelled.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub id: SessionId,
    pub query: String,
    pub state: SearchState,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    autocomplete: AutocompleteEngine,
    input: String,
    suggestions: Vec<String>,
    session: Option<SearchSession>,
    next_session_id: SessionId,
    loading: bool,
    last_rerun: Option<String>,
    last_alert: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_autocomplete(autocomplete: AutocompleteEngine) -> Self {
        Self {
            autocomplete,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let search = self.search_state();
        AppViewModel {
            input: self.input.clone(),
            suggestions: self.suggestions.clone(),
            search,
            query: self.session.as_ref().map(|session| session.query.clone()),
            session_id: self.session.as_ref().map(|session| session.id),
            progress_percent: self
                .session
                .as_ref()
                .map_or(0, |session| session.progress_percent),
            loading: self.loading,
            navigation_locked: self.loading,
            results_available: search == SearchState::Completed,
            last_alert: self.last_alert.clone(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    pub fn search_state(&self) -> SearchState {
        self.session
            .as_ref()
            .map_or(SearchState::Idle, |session| session.state)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.suggestions = self.autocomplete.suggest(&input);
        self.input = input;
        self.mark_dirty();
    }

    pub(crate) fn choose_suggestion(&mut self, suggestion: String) {
        self.input = suggestion;
        self.suggestions.clear();
        self.mark_dirty();
    }

    pub(crate) fn raise_alert(&mut self, message: &str) {
        self.last_alert = Some(message.to_string());
        self.mark_dirty();
    }

    /// Records a rerun request; returns false when the same product was
    /// already requested.
    pub(crate) fn accept_rerun(&mut self, product: &str) -> bool {
        if self.last_rerun.as_deref() == Some(product) {
            return false;
        }
        self.last_rerun = Some(product.to_string());
        true
    }

    /// Session still owning pollers, if any.
    pub(crate) fn active_session_id(&self) -> Option<SessionId> {
        self.session
            .as_ref()
            .filter(|session| !session.state.is_terminal())
            .map(|session| session.id)
    }

    pub(crate) fn previous_query(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.query.as_str())
    }

    pub(crate) fn begin_session(&mut self, query: String) -> SessionId {
        self.next_session_id += 1;
        let id = self.next_session_id;
        self.session = Some(SearchSession {
            id,
            query,
            state: SearchState::Submitting,
            progress_percent: 0,
        });
        self.input.clear();
        self.suggestions.clear();
        self.last_alert = None;
        self.loading = true;
        self.mark_dirty();
        id
    }

    /// The session with `id` if it is current and not yet terminal.
    pub(crate) fn live_session_mut(&mut self, id: SessionId) -> Option<&mut SearchSession> {
        self.session
            .as_mut()
            .filter(|session| session.id == id && !session.state.is_terminal())
    }

    pub(crate) fn apply_progress(&mut self, id: SessionId, snapshot: &ProgressSnapshot) {
        let percent = snapshot.aggregate_percent();
        let Some(session) = self.live_session_mut(id) else {
            return;
        };
        if percent > session.progress_percent {
            session.progress_percent = percent;
            self.mark_dirty();
        }
    }

    pub(crate) fn mark_polling(&mut self, id: SessionId) -> bool {
        match self.live_session_mut(id) {
            Some(session) if session.state == SearchState::Submitting => {
                session.state = SearchState::Polling;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn complete_session(&mut self, id: SessionId) -> bool {
        let Some(session) = self.live_session_mut(id) else {
            return false;
        };
        session.state = SearchState::Completed;
        session.progress_percent = 100;
        self.loading = false;
        self.mark_dirty();
        true
    }

    pub(crate) fn fail_session(&mut self, id: SessionId, reason: FailureReason) -> bool {
        let Some(session) = self.live_session_mut(id) else {
            return false;
        };
        session.state = SearchState::Failed(reason);
        self.loading = false;
        self.mark_dirty();
        true
    }
}
