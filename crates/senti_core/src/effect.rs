use crate::state::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tell the user something went wrong with their input.
    Alert { message: String },
    /// Stop every task still working for `session`.
    CancelSession { session: SessionId },
    /// Drop cached artifacts stored for `product`.
    InvalidateArtifacts { product: String },
    /// Spawn the progress poller for `session` without waiting for it.
    StartProgressPolling { session: SessionId },
    /// Send `POST /api/analyze` for `product`.
    SubmitAnalysis { session: SessionId, product: String },
    /// Poll `GET /api/results` until the job is no longer processing.
    StartResultsPolling { session: SessionId },
}
