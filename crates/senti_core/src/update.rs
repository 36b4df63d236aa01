use crate::{AppState, Effect, FailureReason, Msg, PollOutcome, SessionId, EMPTY_QUERY_ALERT};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SuggestionChosen(suggestion) => {
            state.choose_suggestion(suggestion);
            Vec::new()
        }
        Msg::SearchSubmitted => {
            let query = state.input().to_string();
            start_search(&mut state, &query)
        }
        Msg::SearchRequested(query) => start_search(&mut state, &query),
        Msg::RerunRequested(product) => {
            let product = product.trim();
            if product.is_empty() || !state.accept_rerun(product) {
                return (state, Vec::new());
            }
            start_search(&mut state, product)
        }
        Msg::AnalysisAccepted { session } => {
            if state.mark_polling(session) {
                vec![Effect::StartResultsPolling { session }]
            } else {
                Vec::new()
            }
        }
        Msg::AnalysisRejected { session, .. } => {
            fail(&mut state, session, FailureReason::Rejected)
        }
        Msg::ProgressUpdated { session, snapshot } => {
            state.apply_progress(session, &snapshot);
            Vec::new()
        }
        Msg::ProgressFinished { session, outcome } => match outcome {
            // The results poller, not the progress poller, confirms completion.
            PollOutcome::Ready | PollOutcome::Cancelled => Vec::new(),
            PollOutcome::Timeout => fail(&mut state, session, FailureReason::ProgressTimeout),
            PollOutcome::Error => fail(&mut state, session, FailureReason::ProgressUnavailable),
        },
        Msg::ResultsFinished { session, outcome } => match outcome {
            PollOutcome::Ready => {
                if state.complete_session(session) {
                    vec![Effect::CancelSession { session }]
                } else {
                    Vec::new()
                }
            }
            PollOutcome::Timeout => fail(&mut state, session, FailureReason::ResultsTimeout),
            PollOutcome::Error => fail(&mut state, session, FailureReason::ResultsUnavailable),
            PollOutcome::Cancelled => Vec::new(),
        },
    };

    (state, effects)
}

fn start_search(state: &mut AppState, raw: &str) -> Vec<Effect> {
    let query = raw.trim();
    if query.is_empty() {
        state.raise_alert(EMPTY_QUERY_ALERT);
        return vec![Effect::Alert {
            message: EMPTY_QUERY_ALERT.to_string(),
        }];
    }

    let mut effects = Vec::with_capacity(5);
    if let Some(previous) = state.active_session_id() {
        effects.push(Effect::CancelSession { session: previous });
    }
    // Artifacts from the previous product and any stale copy for the new one
    // must be gone before the analyze request leaves.
    if let Some(previous) = state.previous_query() {
        if previous != query {
            effects.push(Effect::InvalidateArtifacts {
                product: previous.to_string(),
            });
        }
    }
    effects.push(Effect::InvalidateArtifacts {
        product: query.to_string(),
    });

    let session = state.begin_session(query.to_string());
    effects.push(Effect::StartProgressPolling { session });
    effects.push(Effect::SubmitAnalysis {
        session,
        product: query.to_string(),
    });
    effects
}

fn fail(state: &mut AppState, session: SessionId, reason: FailureReason) -> Vec<Effect> {
    if state.fail_session(session, reason) {
        vec![Effect::CancelSession { session }]
    } else {
        Vec::new()
    }
}
