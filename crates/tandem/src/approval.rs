//! Human in the loop review for tool calls.
//!
//! Wrapping a [`System`] in [`Supervised`] pauses every gated tool call until
//! an [`ApprovalHandler`] returns a decision. The call then proceeds
//! unchanged, proceeds with edited arguments, or is answered with the
//! reviewer's feedback instead of running at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::systems::System;

/// A tool call waiting on review, along with the system it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalRequest {
    pub system: String,
    pub tool_call: ToolCall,
}

/// The reviewer's verdict on a pending tool call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Run the call exactly as requested
    Approve,
    /// Run the call with these arguments instead
    Edit { arguments: Value },
    /// Skip the call and return the feedback as the tool result
    Deny { feedback: String },
}

impl ApprovalDecision {
    fn kind(&self) -> &'static str {
        match self {
            ApprovalDecision::Approve => "approve",
            ApprovalDecision::Edit { .. } => "edit",
            ApprovalDecision::Deny { .. } => "deny",
        }
    }
}

/// Which decisions the reviewer is allowed to make.
///
/// Defaults to approve only. A decision outside the allowed set fails the
/// tool call rather than silently running it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ApprovalOptions {
    pub allow_approve: bool,
    pub allow_edit: bool,
    pub allow_deny: bool,
}

impl Default for ApprovalOptions {
    fn default() -> Self {
        Self {
            allow_approve: true,
            allow_edit: false,
            allow_deny: false,
        }
    }
}

impl ApprovalOptions {
    /// Allow every decision
    pub fn permissive() -> Self {
        Self {
            allow_approve: true,
            allow_edit: true,
            allow_deny: true,
        }
    }

    fn allows(&self, decision: &ApprovalDecision) -> bool {
        match decision {
            ApprovalDecision::Approve => self.allow_approve,
            ApprovalDecision::Edit { .. } => self.allow_edit,
            ApprovalDecision::Deny { .. } => self.allow_deny,
        }
    }
}

/// Reviews tool calls before they run.
///
/// Implementations block until a decision is available, whether that means
/// prompting a person at a terminal or reading a queued response in tests.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn review(&self, request: ApprovalRequest) -> AgentResult<ApprovalDecision>;
}

/// A system whose tool calls require approval before they execute
pub struct Supervised<S> {
    inner: S,
    handler: Box<dyn ApprovalHandler>,
    options: ApprovalOptions,
    gated: Option<HashSet<String>>,
}

impl<S: System> Supervised<S> {
    /// Gate every tool of the inner system behind the handler
    pub fn new(inner: S, handler: Box<dyn ApprovalHandler>) -> Self {
        Self {
            inner,
            handler,
            options: ApprovalOptions::default(),
            gated: None,
        }
    }

    pub fn with_options(mut self, options: ApprovalOptions) -> Self {
        self.options = options;
        self
    }

    /// Only gate the named tools, letting the rest run unreviewed
    pub fn gate_only<I, T>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.gated = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    fn requires_review(&self, tool_name: &str) -> bool {
        match &self.gated {
            Some(gated) => gated.contains(tool_name),
            None => true,
        }
    }
}

#[async_trait]
impl<S: System> System for Supervised<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn instructions(&self) -> &str {
        self.inner.instructions()
    }

    fn tools(&self) -> &[Tool] {
        self.inner.tools()
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        if !self.requires_review(&tool_call.name) {
            return self.inner.call(tool_call).await;
        }

        let request = ApprovalRequest {
            system: self.inner.name().to_string(),
            tool_call: tool_call.clone(),
        };
        let decision = self.handler.review(request).await?;

        if !self.options.allows(&decision) {
            return Err(AgentError::UnsupportedDecision(decision.kind().to_string()));
        }

        tracing::debug!(
            tool = %tool_call.name,
            decision = decision.kind(),
            "tool call reviewed"
        );

        match decision {
            ApprovalDecision::Approve => self.inner.call(tool_call).await,
            ApprovalDecision::Edit { arguments } => {
                self.inner.call(ToolCall::new(tool_call.name, arguments)).await
            }
            ApprovalDecision::Deny { feedback } => Ok(vec![Content::text(feedback)]),
        }
    }
}
