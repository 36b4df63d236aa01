use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use senti_core::{
    rerun_product_from_query, update, AppState, AppViewModel, Effect, Msg, PollOutcome,
    ProgressSnapshot, ResultsEnvelope, SearchState, SessionId,
};
use senti_logging::{senti_debug, senti_info, senti_warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::poll::{PollSettings, ProgressPoller, ProgressSink, ResultsPoller};
use crate::{AnalysisApi, SearchOutcome, SharedCache, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub progress: PollSettings,
    pub results: PollSettings,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            progress: PollSettings::progress(),
            results: PollSettings::results(),
        }
    }
}

/// Tasks owned by one search session.
struct SessionTasks {
    cancel: CancellationToken,
    progress: Option<JoinHandle<()>>,
}

struct Inner {
    api: Arc<dyn AnalysisApi>,
    cache: SharedCache,
    settings: OrchestratorSettings,
    state: Mutex<AppState>,
    sessions: Mutex<BTreeMap<SessionId, SessionTasks>>,
    latest_results: Mutex<Option<(SessionId, ResultsEnvelope)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = lock(&self.state);
        let state = std::mem::take(&mut *guard);
        let (state, effects) = update(state, msg);
        *guard = state;
        effects
    }

    /// Register a new session and return its token. Entries of cancelled
    /// sessions whose progress task has ended are dropped here.
    fn open_session(&self, session: SessionId) -> CancellationToken {
        let mut sessions = lock(&self.sessions);
        sessions.retain(|_, tasks| {
            !tasks.cancel.is_cancelled()
                || tasks.progress.as_ref().is_some_and(|h| !h.is_finished())
        });
        let cancel = CancellationToken::new();
        sessions.insert(
            session,
            SessionTasks {
                cancel: cancel.clone(),
                progress: None,
            },
        );
        cancel
    }

    /// Token of an open session. A session with no entry has already been
    /// cancelled and pruned, so it gets a cancelled token.
    fn session_token(&self, session: SessionId) -> CancellationToken {
        match lock(&self.sessions).get(&session) {
            Some(tasks) => tasks.cancel.clone(),
            None => {
                let cancel = CancellationToken::new();
                cancel.cancel();
                cancel
            }
        }
    }

    fn cancel_session(&self, session: SessionId) {
        if let Some(tasks) = lock(&self.sessions).get(&session) {
            if !tasks.cancel.is_cancelled() {
                senti_debug!("Cancelling tasks of session {}", session);
                tasks.cancel.cancel();
            }
        }
    }

    fn invalidate(&self, product: &str) {
        lock(&self.cache).invalidate(product);
    }

    /// Effects raised from background tasks. Only bookkeeping effects can
    /// come out of poller messages.
    fn apply_background(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CancelSession { session } => self.cancel_session(session),
                Effect::InvalidateArtifacts { product } => self.invalidate(&product),
                other => senti_warn!("Ignoring effect raised by a poller: {:?}", other),
            }
        }
    }

    fn is_current(&self, session: SessionId) -> bool {
        lock(&self.state)
            .session()
            .is_some_and(|current| current.id == session)
    }

    fn outcome_for(&self, session: SessionId) -> SearchOutcome {
        let state = lock(&self.state);
        match state.session() {
            Some(current) if current.id == session => match current.state {
                SearchState::Completed => SearchOutcome::Completed,
                SearchState::Failed(reason) => SearchOutcome::Failed(reason),
                SearchState::Idle | SearchState::Submitting | SearchState::Polling => {
                    SearchOutcome::Superseded
                }
            },
            _ => SearchOutcome::Superseded,
        }
    }
}

/// Publishes progress samples into the session that spawned the poller.
struct SessionProgressSink {
    inner: Arc<Inner>,
    session: SessionId,
}

impl ProgressSink for SessionProgressSink {
    fn publish(&self, snapshot: ProgressSnapshot) {
        let effects = self.inner.dispatch(Msg::ProgressUpdated {
            session: self.session,
            snapshot,
        });
        self.inner.apply_background(effects);
    }
}

/// Drives searches against the analysis backend and owns the session state
/// the display layer renders.
///
/// At most one session is live: starting a search cancels the tasks of the
/// previous one, and messages tagged with an old session id are dropped.
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn AnalysisApi>, cache: SharedCache, settings: OrchestratorSettings) -> Self {
        Self::with_state(api, cache, settings, AppState::new())
    }

    /// Start from a prepared state, e.g. one carrying the autocomplete catalog.
    pub fn with_state(
        api: Arc<dyn AnalysisApi>,
        cache: SharedCache,
        settings: OrchestratorSettings,
        state: AppState,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                cache,
                settings,
                state: Mutex::new(state),
                sessions: Mutex::new(BTreeMap::new()),
                latest_results: Mutex::new(None),
            }),
        }
    }

    pub fn view(&self) -> AppViewModel {
        lock(&self.inner.state).view()
    }

    /// Returns whether the view changed since the last call.
    pub fn consume_dirty(&self) -> bool {
        lock(&self.inner.state).consume_dirty()
    }

    pub fn cache(&self) -> &SharedCache {
        &self.inner.cache
    }

    /// Ready results body of the current session, if it completed.
    pub fn latest_results(&self) -> Option<ResultsEnvelope> {
        let current = lock(&self.inner.state).session().map(|session| session.id)?;
        match &*lock(&self.inner.latest_results) {
            Some((session, envelope)) if *session == current => Some(envelope.clone()),
            _ => None,
        }
    }

    /// Feed a keystroke; suggestions update synchronously.
    pub fn input_changed(&self, text: impl Into<String>) {
        self.inner.dispatch(Msg::InputChanged(text.into()));
    }

    pub fn suggestion_chosen(&self, suggestion: impl Into<String>) {
        self.inner.dispatch(Msg::SuggestionChosen(suggestion.into()));
    }

    /// Search for whatever is in the input box.
    pub async fn submit(&self) -> Result<SearchOutcome, ValidationError> {
        let effects = self.inner.dispatch(Msg::SearchSubmitted);
        self.run_effects(effects).await
    }

    /// Search for `product`. Blank names are rejected without any request.
    pub async fn start_search(&self, product: &str) -> Result<SearchOutcome, ValidationError> {
        let effects = self.inner.dispatch(Msg::SearchRequested(product.to_string()));
        self.run_effects(effects).await
    }

    /// Handle a location query such as `?product=Apple%20IPhone%2015`.
    ///
    /// Returns `None` when the query names no product or repeats the product
    /// of the previous rerun.
    pub async fn handle_rerun_link(&self, query: &str) -> Option<SearchOutcome> {
        let product = rerun_product_from_query(query)?;
        let effects = self.inner.dispatch(Msg::RerunRequested(product));
        if effects.is_empty() {
            return None;
        }
        self.run_effects(effects).await.ok()
    }

    /// Cancel every session and wait for background pollers to stop.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut sessions = lock(&self.inner.sessions);
            sessions
                .values_mut()
                .filter_map(|tasks| {
                    tasks.cancel.cancel();
                    tasks.progress.take()
                })
                .collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    async fn run_effects(&self, effects: Vec<Effect>) -> Result<SearchOutcome, ValidationError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut session = None;
        let mut product = String::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Alert { message } => {
                    senti_warn!("Search rejected: {}", message);
                    return Err(ValidationError::EmptyQuery);
                }
                Effect::CancelSession { session } => self.inner.cancel_session(session),
                Effect::InvalidateArtifacts { product } => self.inner.invalidate(&product),
                Effect::StartProgressPolling { session: id } => {
                    session = Some(id);
                    lock(&self.inner.latest_results).take();
                    self.spawn_progress(id);
                }
                Effect::SubmitAnalysis { session: id, product: name } => {
                    session = Some(id);
                    senti_info!("Search started: session={} product={:?}", id, name);
                    let cancel = self.inner.session_token(id);
                    let result = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        result = self.inner.api.submit_analysis(&name) => Some(result),
                    };
                    product = name;
                    let msg = match result {
                        None => continue,
                        Some(Ok(())) => {
                            senti_info!("Analysis accepted: session={}", id);
                            Msg::AnalysisAccepted { session: id }
                        }
                        Some(Err(err)) => {
                            senti_warn!("Analysis request failed: session={} {}", id, err);
                            Msg::AnalysisRejected {
                                session: id,
                                reason: err.to_string(),
                            }
                        }
                    };
                    queue.extend(self.inner.dispatch(msg));
                }
                Effect::StartResultsPolling { session: id } => {
                    let cancel = self.inner.session_token(id);
                    let poll = ResultsPoller::new(self.inner.api.clone(), self.inner.settings.results)
                        .run(&cancel)
                        .await;
                    if poll.outcome == PollOutcome::Ready && self.inner.is_current(id) {
                        if let Some(envelope) = poll.envelope {
                            lock(&self.inner.cache).store_from_results(&product, &envelope);
                            *lock(&self.inner.latest_results) = Some((id, envelope));
                        }
                    }
                    queue.extend(self.inner.dispatch(Msg::ResultsFinished {
                        session: id,
                        outcome: poll.outcome,
                    }));
                }
            }
        }

        let outcome = match session {
            Some(id) => self.inner.outcome_for(id),
            None => SearchOutcome::Superseded,
        };
        senti_info!("Search finished: session={:?} outcome={:?}", session, outcome);
        Ok(outcome)
    }

    fn spawn_progress(&self, session: SessionId) {
        let cancel = self.inner.open_session(session);
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let poller = ProgressPoller::new(inner.api.clone(), inner.settings.progress);
            let sink = SessionProgressSink {
                inner: Arc::clone(&inner),
                session,
            };
            let outcome = poller.run(&cancel, &sink).await;
            senti_debug!("Progress poller stopped: session={} outcome={:?}", session, outcome);
            let effects = inner.dispatch(Msg::ProgressFinished { session, outcome });
            inner.apply_background(effects);
        });
        if let Some(tasks) = lock(&self.inner.sessions).get_mut(&session) {
            tasks.progress = Some(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    struct Unreachable;

    #[async_trait::async_trait]
    impl AnalysisApi for Unreachable {
        async fn submit_analysis(&self, _product: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn fetch_progress(&self) -> Result<ProgressSnapshot, ApiError> {
            Ok(ProgressSnapshot::default())
        }

        async fn fetch_results(&self) -> Result<ResultsEnvelope, ApiError> {
            Ok(ResultsEnvelope::processing())
        }
    }

    fn orchestrator() -> SearchOrchestrator {
        SearchOrchestrator::new(
            Arc::new(Unreachable),
            crate::ArtifactCache::in_memory().shared(),
            OrchestratorSettings::default(),
        )
    }

    #[test]
    fn unknown_session_gets_a_cancelled_token() {
        let orchestrator = orchestrator();
        assert!(orchestrator.inner.session_token(7).is_cancelled());
        assert!(lock(&orchestrator.inner.sessions).is_empty());
    }

    #[test]
    fn pruned_session_stays_cancelled() {
        let orchestrator = orchestrator();
        let inner = &orchestrator.inner;

        let first = inner.open_session(1);
        assert!(!inner.session_token(1).is_cancelled());
        inner.cancel_session(1);
        assert!(first.is_cancelled());

        let second = inner.open_session(2);
        assert!(!second.is_cancelled());
        assert!(!lock(&inner.sessions).contains_key(&1));
        assert!(inner.session_token(1).is_cancelled());
        assert!(!lock(&inner.sessions).contains_key(&1));
    }
}
