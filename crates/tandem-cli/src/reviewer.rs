use async_trait::async_trait;
use console::style;
use serde_json::Value;

use tandem::approval::{ApprovalDecision, ApprovalHandler, ApprovalOptions, ApprovalRequest};
use tandem::errors::{AgentError, AgentResult};

/// Asks the person at the terminal to rule on each gated tool call.
///
/// Built from the same options as the supervised system, so the menu only
/// ever offers decisions the gate will accept.
pub struct TerminalApprover {
    options: ApprovalOptions,
}

impl TerminalApprover {
    pub fn new(options: ApprovalOptions) -> Self {
        Self { options }
    }

    fn choices(&self) -> Vec<(&'static str, &'static str, &'static str)> {
        let mut items = Vec::new();
        if self.options.allow_approve {
            items.push(("approve", "Approve", "Run the call as requested"));
        }
        if self.options.allow_edit {
            items.push(("edit", "Edit", "Change the arguments first"));
        }
        if self.options.allow_deny {
            items.push(("deny", "Deny", "Skip the call and tell the model why"));
        }
        items
    }
}

fn prompt_error(e: std::io::Error) -> AgentError {
    AgentError::ExecutionError(format!("approval prompt failed: {}", e))
}

#[async_trait]
impl ApprovalHandler for TerminalApprover {
    async fn review(&self, request: ApprovalRequest) -> AgentResult<ApprovalDecision> {
        println!();
        println!(
            "{} {} wants to run {}",
            style("review:").yellow().bold(),
            style(&request.system).magenta(),
            style(&request.tool_call.name).green(),
        );
        println!("{}", request.tool_call.arguments);

        let selected = cliclack::select("What should happen with this tool call?")
            .items(&self.choices())
            .interact()
            .map_err(prompt_error)?;

        match selected {
            "approve" => Ok(ApprovalDecision::Approve),
            "edit" => loop {
                let raw: String = cliclack::input("New arguments (JSON):")
                    .default_input(&request.tool_call.arguments.to_string())
                    .interact()
                    .map_err(prompt_error)?;
                match serde_json::from_str::<Value>(&raw) {
                    Ok(arguments) => return Ok(ApprovalDecision::Edit { arguments }),
                    Err(e) => println!("That isn't valid JSON ({}), try again", e),
                }
            },
            "deny" => {
                let feedback: String = cliclack::input("Feedback for the model:")
                    .interact()
                    .map_err(prompt_error)?;
                Ok(ApprovalDecision::Deny { feedback })
            }
            other => Err(AgentError::UnsupportedDecision(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_follows_the_allowed_options() {
        let permissive = TerminalApprover::new(ApprovalOptions::permissive());
        let names: Vec<_> = permissive
            .choices()
            .iter()
            .map(|(name, _, _)| *name)
            .collect();
        assert_eq!(names, vec!["approve", "edit", "deny"]);

        let default_only = TerminalApprover::new(ApprovalOptions::default());
        let names: Vec<_> = default_only
            .choices()
            .iter()
            .map(|(name, _, _)| *name)
            .collect();
        assert_eq!(names, vec!["approve"]);
    }
}
