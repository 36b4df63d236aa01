use crate::state::{SearchState, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub suggestions: Vec<String>,
    pub search: SearchState,
    pub query: Option<String>,
    pub session_id: Option<SessionId>,
    /// Progress bar value, 0..=100.
    pub progress_percent: u8,
    pub loading: bool,
    /// Navigation stays disabled while a search is loading.
    pub navigation_locked: bool,
    /// Result pages become reachable once a search completed.
    pub results_available: bool,
    pub last_alert: Option<String>,
    pub dirty: bool,
}
