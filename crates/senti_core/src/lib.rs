//! SentiTech core: product catalog, autocomplete, progress aggregation and the
//! pure search state machine.
mod catalog;
mod effect;
mod msg;
mod progress;
mod rerun;
mod results;
mod state;
mod update;
mod view_model;

pub use catalog::{
    build_catalog, suggest, AutocompleteEngine, Catalog, DatasetError, ProductDataset,
    ProductEntry, SUGGESTION_LIMIT,
};
pub use effect::Effect;
pub use msg::Msg;
pub use progress::{aggregate_percent, ModuleName, ProgressSnapshot, PROGRESS_CEILING};
pub use rerun::{rerun_product_from_query, RERUN_PARAM};
pub use results::{ResultsEnvelope, PROCESSING_STATUS};
pub use state::{
    AppState, FailureReason, PollOutcome, SearchSession, SearchState, SessionId,
    EMPTY_QUERY_ALERT,
};
pub use update::update;
pub use view_model::AppViewModel;
