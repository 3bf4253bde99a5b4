//! HTTP seam between the form controller and the prediction service.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::protocol::{
    HealthResponse, OptionsResponse, PredictionRequest, PredictionResponse, HEALTH_PATH,
    OPTIONS_PATH, PREDICT_PATH,
};
use tracing::debug;

use crate::{
    config::{normalize_api_base_url, ClientSettings},
    error::ApiClientError,
};

#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ApiClientError>;
    async fn options(&self) -> Result<OptionsResponse, ApiClientError>;
    async fn health(&self) -> Result<HealthResponse, ApiClientError>;
}

pub struct HttpPredictionApi {
    http: Client,
    base_url: String,
}

impl HttpPredictionApi {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        Ok(Self {
            http: Client::new(),
            base_url: normalize_api_base_url(base_url)?,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build().map_err(ApiClientError::ClientBuild)?,
            base_url: normalize_api_base_url(&settings.api_base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// The service reports logical failures in the JSON body with a 4xx/5xx
    /// status, so the body is decoded whatever the status code.
    async fn decode<T: DeserializeOwned>(
        endpoint: String,
        response: Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        debug!(%endpoint, %status, bytes = body.len(), "received api response");
        serde_json::from_slice(&body).map_err(|source| ApiClientError::Decode { endpoint, source })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| ApiClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(endpoint, response).await
    }
}

#[async_trait]
impl PredictionApi for HttpPredictionApi {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ApiClientError> {
        let endpoint = self.endpoint(PREDICT_PATH);
        // `json` also sets `Content-Type: application/json`.
        let response = self
            .http
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .map_err(|source| ApiClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(endpoint, response).await
    }

    async fn options(&self) -> Result<OptionsResponse, ApiClientError> {
        self.get(OPTIONS_PATH).await
    }

    async fn health(&self) -> Result<HealthResponse, ApiClientError> {
        self.get(HEALTH_PATH).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
