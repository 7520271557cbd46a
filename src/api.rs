use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{LatestPrediction, PredictionRequest, PredictionResponse, ProductData, SearchResultItem};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")] Http(String),
    #[error("unexpected status {status}: {body}")] Status { status: u16, body: String },
    #[error("parse error: {0}")] Parse(String),
}

/// Backend surface the controller talks to. Split out as a trait so the
/// interaction flow can be driven against an in-memory double.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError>;
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, ApiError>;
    async fn product_data(&self, query: &str) -> Result<ProductData, ApiError>;
    async fn latest_predictions(&self) -> Result<Vec<LatestPrediction>, ApiError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::Parse(format!(
                "{} from {}: {}",
                e,
                url,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl ProductApi for HttpApi {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        let url = format!("{}/predict_api", self.base_url);
        info!(product = %request.product_name, "Requesting price prediction");

        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        debug!(%body, "Prediction response body");
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("{}: {}", e, body.chars().take(200).collect::<String>())))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, ApiError> {
        self.get_json("/search", Some(query)).await
    }

    async fn product_data(&self, query: &str) -> Result<ProductData, ApiError> {
        self.get_json("/get_product_data", Some(query)).await
    }

    async fn latest_predictions(&self) -> Result<Vec<LatestPrediction>, ApiError> {
        self.get_json("/latest_predictions", None).await
    }
}
