use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use senti_core::{ProgressSnapshot, ResultsEnvelope};

use crate::{ApiError, FailureKind};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to the progress and results requests.
    pub request_timeout: Duration,
    /// The analyze call returns only once the backend job ends, so it has no
    /// timeout unless one is set here.
    pub analyze_timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            analyze_timeout: None,
        }
    }
}

impl ApiSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// The three backend endpoints the search flow depends on.
#[async_trait::async_trait]
pub trait AnalysisApi: Send + Sync {
    /// `POST /api/analyze`; any 2xx counts as accepted.
    async fn submit_analysis(&self, product: &str) -> Result<(), ApiError>;

    /// `GET /api/progress`.
    async fn fetch_progress(&self) -> Result<ProgressSnapshot, ApiError>;

    /// `GET /api/results`.
    async fn fetch_results(&self) -> Result<ResultsEnvelope, ApiError>;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    product: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    client: reqwest::Client,
    analyze_url: Url,
    progress_url: Url,
    results_url: Url,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            analyze_url: endpoint(&settings.base_url, "api/analyze")?,
            progress_url: endpoint(&settings.base_url, "api/progress")?,
            results_url: endpoint(&settings.base_url, "api/results")?,
            settings,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl AnalysisApi for ReqwestApi {
    async fn submit_analysis(&self, product: &str) -> Result<(), ApiError> {
        let mut request = self
            .client
            .post(self.analyze_url.clone())
            .json(&AnalyzeRequest { product });
        if let Some(timeout) = self.settings.analyze_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_progress(&self) -> Result<ProgressSnapshot, ApiError> {
        self.get_json(&self.progress_url).await
    }

    async fn fetch_results(&self) -> Result<ResultsEnvelope, ApiError> {
        self.get_json(&self.results_url).await
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url, ApiError> {
    let mut base = Url::parse(base_url)
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(ApiError::new(
            FailureKind::InvalidUrl,
            format!("{base_url} cannot be a base url"),
        ));
    }
    // Keep any path prefix of the base url, e.g. `http://host/senti/`.
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path)
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
