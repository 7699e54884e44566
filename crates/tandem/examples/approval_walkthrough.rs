//! Walk the approval gate through each decision without a model in the loop.
//!
//! Run with: `cargo run --example approval_walkthrough`

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use tandem::approval::{
    ApprovalDecision, ApprovalHandler, ApprovalOptions, ApprovalRequest, Supervised,
};
use tandem::errors::{AgentError, AgentResult};
use tandem::models::tool::ToolCall;
use tandem::systems::System;
use tandem::utility::UtilitySystem;

/// Plays back a fixed list of decisions, announcing each request as it arrives
struct ScriptedReviewer {
    decisions: Mutex<Vec<ApprovalDecision>>,
}

impl ScriptedReviewer {
    fn new(decisions: Vec<ApprovalDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions),
        }
    }
}

#[async_trait]
impl ApprovalHandler for ScriptedReviewer {
    async fn review(&self, request: ApprovalRequest) -> AgentResult<ApprovalDecision> {
        println!(
            "review requested: {}.{} {}",
            request.system, request.tool_call.name, request.tool_call.arguments
        );
        let mut decisions = self.decisions.lock().unwrap();
        if decisions.is_empty() {
            return Err(AgentError::Internal("out of scripted decisions".to_string()));
        }
        Ok(decisions.remove(0))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Permissive options let the reviewer approve, edit, or deny
    let reviewer = ScriptedReviewer::new(vec![
        ApprovalDecision::Approve,
        ApprovalDecision::Edit {
            arguments: json!({"text": "a much longer sentence to count instead"}),
        },
        ApprovalDecision::Deny {
            feedback: "Counting that text is not allowed.".to_string(),
        },
    ]);
    let supervised = Supervised::new(UtilitySystem::new(), Box::new(reviewer))
        .with_options(ApprovalOptions::permissive());

    let calls = vec![
        ToolCall::new("word_count", json!({"text": "approve me"})),
        ToolCall::new("word_count", json!({"text": "edit me"})),
        ToolCall::new("word_count", json!({"text": "deny me"})),
    ];

    for call in calls {
        match supervised.call(call).await {
            Ok(contents) => {
                for content in contents {
                    if let Some(text) = content.as_text() {
                        println!("result: {}", text);
                    }
                }
            }
            Err(e) => println!("error: {}", e),
        }
        println!();
    }

    // Default options only allow approve, so the same deny fails the call
    let strict = Supervised::new(
        UtilitySystem::new(),
        Box::new(ScriptedReviewer::new(vec![ApprovalDecision::Deny {
            feedback: "no".to_string(),
        }])),
    );
    match strict
        .call(ToolCall::new("word_count", json!({"text": "one two"})))
        .await
    {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("strict gate: {}", e),
    }
    Ok(())
}
