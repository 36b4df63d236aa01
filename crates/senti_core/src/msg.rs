use crate::progress::ProgressSnapshot;
use crate::state::{PollOutcome, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the product input box.
    InputChanged(String),
    /// User picked one of the autocomplete suggestions.
    SuggestionChosen(String),
    /// User pressed search with the current input.
    SearchSubmitted,
    /// Caller asked for a search of a specific product name.
    SearchRequested(String),
    /// A product arrived through a rerun link.
    RerunRequested(String),
    /// Backend accepted the analyze request.
    AnalysisAccepted { session: SessionId },
    /// Analyze request failed or was refused.
    AnalysisRejected { session: SessionId, reason: String },
    /// One successful progress sample.
    ProgressUpdated {
        session: SessionId,
        snapshot: ProgressSnapshot,
    },
    /// Progress poller stopped.
    ProgressFinished {
        session: SessionId,
        outcome: PollOutcome,
    },
    /// Results poller stopped.
    ResultsFinished {
        session: SessionId,
        outcome: PollOutcome,
    },
}
