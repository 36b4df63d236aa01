//! SentiTech engine: backend client, polling loops, artifact cache and the
//! search orchestrator that executes the core state machine's effects.
mod api;
mod cache;
mod orchestrator;
mod persist;
mod poll;
mod types;

pub use api::{AnalysisApi, ApiSettings, ReqwestApi, DEFAULT_BASE_URL};
pub use cache::{product_key, ArtifactCache, ArtifactKind, SharedCache};
pub use orchestrator::{OrchestratorSettings, SearchOrchestrator};
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use poll::{PollSettings, ProgressPoller, ProgressSink, ResultsPoll, ResultsPoller};
pub use types::{ApiError, FailureKind, SearchOutcome, ValidationError};
