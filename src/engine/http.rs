//! Reqwest-based client for an engine exposing the playground endpoints over HTTP/JSON.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{
    EngineError, ExecutionRequest, ExecutionResult, RemoteEngine, ResetResponse, RunResponse,
    VariableSnapshot,
};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct HttpEngine {
    http: Client,
    base_url: String,
}

impl HttpEngine {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.engine_url(), cfg.request_timeout())
    }

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, EngineError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, "engine call");

        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "engine call failed");
            return Err(EngineError::Status { status: status.as_u16(), body: text });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl RemoteEngine for HttpEngine {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, EngineError> {
        let body = serde_json::to_value(&request)?;
        let resp: RunResponse = self.call("run_cfpl_code", body).await?;
        Ok(resp.into())
    }

    async fn fetch_variables(&self) -> Result<VariableSnapshot, EngineError> {
        self.call("get_variables", serde_json::json!({})).await
    }

    async fn reset(&self) -> Result<(), EngineError> {
        let resp: ResetResponse = self.call("reset_interpreter", serde_json::json!({})).await?;
        if resp.success {
            Ok(())
        } else {
            Err(EngineError::Reset(resp.message.unwrap_or_default()))
        }
    }
}
