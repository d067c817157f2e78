use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::AdjudicationResponse;
use tracing::{debug, info};
use url::Url;

use crate::{error::TransportError, submission::ClaimSubmission};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait AdjudicationService: Send + Sync {
    async fn process_claim(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<AdjudicationResponse, TransportError>;
}

pub struct MissingAdjudicationService;

#[async_trait]
impl AdjudicationService for MissingAdjudicationService {
    async fn process_claim(
        &self,
        _submission: &ClaimSubmission,
    ) -> Result<AdjudicationResponse, TransportError> {
        Err(TransportError::Unavailable)
    }
}

/// Posts claims as `multipart/form-data` to a single endpoint.
pub struct HttpAdjudicationService {
    http: Client,
    endpoint: Url,
}

impl HttpAdjudicationService {
    pub fn new(endpoint: Url) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AdjudicationService for HttpAdjudicationService {
    async fn process_claim(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<AdjudicationResponse, TransportError> {
        let form = submission.to_multipart()?;
        info!(
            endpoint = %self.endpoint,
            documents = submission.documents().len(),
            "posting claim for adjudication"
        );

        // The service answers rejected claims with a JSON envelope on non-2xx
        // statuses too, so the body is decoded whatever the status.
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "adjudication response received");

        serde_json::from_slice(&body).map_err(|source| TransportError::MalformedBody {
            status: status.as_u16(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
