//! Dispatcher: tool name + JSON arguments -> one subprocess -> text reply.
//!
//! Every failure (unknown tool, bad arguments, subprocess error) is folded
//! into a `CallOutcome` whose text starts with `Error:`. Nothing here returns
//! an error to the protocol layer.

use chrono::Local;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::process::{CommandOutput, CommandRunner, ProcessRunner};
use crate::tools::{self, Invocation, Reply, ToolInput};

/// Uniform reply for a tool call: a single text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub text: String,
    pub is_error: bool,
}

impl CallOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(err: &ToolError) -> Self {
        Self {
            text: format!("Error: {err}"),
            is_error: true,
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<ServerConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl Dispatcher {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: Arc<ServerConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub async fn handle(&self, tool: &str, arguments: Map<String, Value>) -> CallOutcome {
        match self.try_handle(tool, arguments).await {
            Ok(text) => {
                tracing::info!(tool, "tool call succeeded");
                CallOutcome::success(text)
            }
            Err(err) => {
                tracing::warn!(tool, error = %err, "tool call failed");
                CallOutcome::error(&err)
            }
        }
    }

    async fn try_handle(&self, tool: &str, arguments: Map<String, Value>) -> Result<String, ToolError> {
        let input = ToolInput::parse(tool, arguments)?;
        let invocation = tools::build(&input, &self.config, Local::now())?;
        tracing::debug!(tool = input.tool_name(), command = %invocation.command, "built command");

        let output = self.runner.run(&invocation.command).await?;
        Ok(render(&invocation, &output))
    }
}

/// Format a successful run according to the builder's reply style.
pub fn render(invocation: &Invocation, output: &CommandOutput) -> String {
    let mut text = match &invocation.reply {
        Reply::Listing(header) => format!("{header}\n{}", output.stdout),
        Reply::Action(message) => {
            let stdout = output.stdout.trim_end();
            if stdout.is_empty() {
                message.clone()
            } else {
                format!("{message}\n{stdout}")
            }
        }
    };
    let stderr = output.stderr.trim_end();
    if !stderr.is_empty() {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str("stderr: ");
        text.push_str(stderr);
    }
    text
}
