//! Remote engine contract: request/result types and the async seam the orchestrator calls.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;

pub use http::HttpEngine;

/// Everything the engine returns for `get_variables`, in response order.
pub type VariableSnapshot = serde_json::Map<String, serde_json::Value>;

/// One submission of the editor buffer plus the free-text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    #[serde(rename = "code")]
    pub program: String,
    #[serde(rename = "input_data")]
    pub input: String,
}

impl ExecutionRequest {
    pub fn new(program: impl Into<String>, input: impl Into<String>) -> Self {
        Self { program: program.into(), input: input.into() }
    }
}

/// Outcome reported by the interpreter once the call itself went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success { output: Option<String> },
    Failure { error: String },
}

/// Wire shape of `run_cfpl_code`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RunResponse {
    pub success: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<RunResponse> for ExecutionResult {
    fn from(resp: RunResponse) -> Self {
        if resp.success {
            ExecutionResult::Success { output: resp.output }
        } else {
            ExecutionResult::Failure {
                error: resp
                    .error
                    .unwrap_or_else(|| "Execution failed without a diagnostic".to_string()),
            }
        }
    }
}

/// Wire shape of `reset_interpreter`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResetResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Failures of the call itself, as opposed to failures of the CFPL program.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("engine response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("engine rejected reset: {0}")]
    Reset(String),
}

#[async_trait]
pub trait RemoteEngine: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, EngineError>;

    async fn fetch_variables(&self) -> Result<VariableSnapshot, EngineError>;

    async fn reset(&self) -> Result<(), EngineError>;
}

#[async_trait]
impl<E: RemoteEngine + ?Sized> RemoteEngine for Arc<E> {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, EngineError> {
        (**self).execute(request).await
    }

    async fn fetch_variables(&self) -> Result<VariableSnapshot, EngineError> {
        (**self).fetch_variables().await
    }

    async fn reset(&self) -> Result<(), EngineError> {
        (**self).reset().await
    }
}
