use log::debug;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::AnalyticsRequest;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid analytics base url {0}")]
    InvalidBaseUrl(String),
    #[error("analytics request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analytics backend answered {status} for {url}")]
    Status { url: Url, status: StatusCode },
}

/// Thin HTTP client for the external analytics backend.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    base_url: Url,
    http: reqwest::Client,
}

impl AnalyticsClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(AnalyticsClient {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        request: &AnalyticsRequest,
    ) -> Result<T, ClientError> {
        let url = request.url(&self.base_url)?;
        debug!("GET {url}");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }

        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_base_urls() {
        let client = AnalyticsClient::new(DEFAULT_API_URL).unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn rejects_unparseable_and_opaque_urls() {
        assert!(matches!(
            AnalyticsClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            AnalyticsClient::new("data:text/plain,hello"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
