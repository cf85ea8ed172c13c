use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::types::{ErrorBody, QuoteRequest, QuoteResponse, StatusResponse};
use super::{ProviderError, QuoteProvider};

pub const DEFAULT_BASE_URL: &str = "https://1click.chaindefuser.com";

#[derive(Debug, Clone)]
pub struct OneClickConfig {
    pub base_url: String,
    pub jwt: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct OneClickClient {
    http: Client,
    base_url: String,
}

impl OneClickClient {
    pub fn new(cfg: OneClickConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(jwt) = cfg.jwt.as_deref().filter(|t| !t.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", jwt.trim()))
                .context("build authorization header")?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(cfg.request_timeout)
            .build()
            .context("build 1Click http client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ProviderError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::new(Some(status.as_u16()), format!("read body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(ProviderError::new(Some(status.as_u16()), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::new(Some(status.as_u16()), format!("decode response: {e}"))
        })
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    };
    ProviderError::new(e.status().map(|s| s.as_u16()), message)
}

#[async_trait]
impl QuoteProvider for OneClickClient {
    async fn request_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ProviderError> {
        let resp = self
            .http
            .post(format!("{}/v0/quote", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(resp).await
    }

    async fn poll_status(&self, deposit_address: &str) -> Result<StatusResponse, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/v0/status", self.base_url))
            .query(&[("depositAddress", deposit_address)])
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(resp).await
    }
}
