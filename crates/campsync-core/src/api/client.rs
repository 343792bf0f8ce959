//! Client for the camp document endpoint.

use std::time::Duration;

use reqwest::{header, Client};
use tracing::debug;

use crate::models::CampDocument;

use super::ApiError;

/// Path of the single document on the endpoint
const DOCUMENT_PATH: &str = "/camp";

/// Client for the remote document store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct DocumentClient {
    client: Client,
    base_url: String,
}

impl DocumentClient {
    /// Create a client for the endpoint at `base_url`.
    ///
    /// No timeout is set unless one is given; a hung request stays pending.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn document_url(&self) -> String {
        format!("{}{}", self.base_url, DOCUMENT_PATH)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch the whole document. Any 2xx status is success.
    pub async fn fetch_document(&self) -> Result<CampDocument, ApiError> {
        let url = self.document_url();
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        debug!(url = %url, bytes = text.len(), "Document response received");

        CampDocument::from_json(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse document: {}", e)))
    }

    /// Replace the remote document. The response body is ignored.
    pub async fn put_document(&self, document: &CampDocument) -> Result<(), ApiError> {
        let url = self.document_url();
        let response = self.client.post(&url).json(document).send().await?;
        Self::check_response(response).await?;
        debug!(url = %url, "Document saved");
        Ok(())
    }
}
