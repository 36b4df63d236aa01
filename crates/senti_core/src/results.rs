use serde::Deserialize;

/// `status` value the backend reports while a job is still running.
pub const PROCESSING_STATUS: &str = "processing";

/// Body of `GET /api/results`.
///
/// Only `status` drives the search flow. The summaries are picked up for the
/// artifact cache and everything else is kept untouched in `rest` for the
/// display layer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResultsEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub google_summary: Option<String>,
    #[serde(default)]
    pub comment_summary: Option<String>,
    #[serde(default)]
    pub tldr_lines: Option<Vec<String>>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl ResultsEnvelope {
    pub fn processing() -> Self {
        Self {
            status: Some(PROCESSING_STATUS.to_string()),
            ..Self::default()
        }
    }

    /// A body without a `status` field counts as ready.
    pub fn is_processing(&self) -> bool {
        self.status.as_deref() == Some(PROCESSING_STATUS)
    }
}
