//! HTTP implementation of the search service.
//!
//! Search is a GET with a URL-encoded `q` parameter; nearest is a POST with a
//! JSON `{"vector": [...]}` body. Both respond with `{"results": [...]}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use analogy_types::{Item, ServiceEndpoints, ServiceSettings};

use crate::error::ClientError;
use crate::service::SearchService;

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    results: Vec<Item>,
}

#[derive(Debug, Serialize)]
struct NearestRequest<'a> {
    vector: &'a [f32],
}

/// Search service backed by the deployed HTTP endpoints.
pub struct HttpSearchService {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl HttpSearchService {
    /// Create a client for the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be built.
    pub fn new(endpoints: ServiceEndpoints, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        info!(
            search = %endpoints.search,
            nearest = %endpoints.nearest,
            "Created search service client"
        );

        Ok(Self { client, endpoints })
    }

    /// Create a client from service settings.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, ClientError> {
        Self::new(
            settings.endpoints(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// The endpoints this client talks to.
    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    async fn read_results(response: Response) -> Result<Vec<Item>, ClientError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let body = response.bytes().await?;
        let envelope: ResultsEnvelope =
            serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(envelope.results)
    }
}

#[async_trait]
impl SearchService for HttpSearchService {
    async fn search(&self, text: &str) -> Result<Vec<Item>, ClientError> {
        debug!(query = text, "Search request");

        let response = self
            .client
            .get(&self.endpoints.search)
            .query(&[("q", text)])
            .send()
            .await?;

        let results = Self::read_results(response).await?;
        debug!(query = text, count = results.len(), "Search response");
        Ok(results)
    }

    async fn nearest(&self, vector: &[f32]) -> Result<Item, ClientError> {
        debug!(dimension = vector.len(), "Nearest request");

        let response = self
            .client
            .post(&self.endpoints.nearest)
            .json(&NearestRequest { vector })
            .send()
            .await?;

        Self::read_results(response)
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::NoResults)
    }
}
