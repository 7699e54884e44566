use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidParameters(String),

    #[error("Tool failed: {0}")]
    ExecutionError(String),

    #[error("Approval decision not permitted here: {0}")]
    UnsupportedDecision(String),

    #[error("Internal agent error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
