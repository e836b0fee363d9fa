//! Error taxonomy for tool dispatch.
//!
//! ToolError  : everything that can go wrong between receiving a call and replying
//! ExecError  : subprocess failures (wrapped by ToolError::Exec)
//!
//! None of these cross the MCP boundary as protocol faults; the dispatcher
//! renders them into an `Error: ...` reply.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("{tool}: missing required field '{field}'")]
    MissingField { tool: String, field: String },

    #[error("{tool}: unknown field '{field}'")]
    UnknownField { tool: String, field: String },

    #[error("{tool}: invalid value for '{field}': {reason}")]
    InvalidField {
        tool: String,
        field: String,
        reason: String,
    },

    #[error("{tool}: transport '{transport}' requires field '{field}'")]
    TransportRequires {
        tool: String,
        transport: String,
        field: String,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl ToolError {
    pub fn missing(tool: &str, field: &str) -> Self {
        ToolError::MissingField {
            tool: tool.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid(tool: &str, field: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidField {
            tool: tool.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command not found: {program}")]
    NotFound { program: String },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with status {code}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("'{command}' was terminated by a signal{}", stderr_suffix(.stderr))]
    Killed { command: String, stderr: String },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_includes_trimmed_stderr() {
        let err = ExecError::Failed {
            command: "tmux list-sessions".into(),
            code: 1,
            stderr: "no server running on /tmp/tmux-1000/default\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "'tmux list-sessions' exited with status 1: no server running on /tmp/tmux-1000/default"
        );
    }

    #[test]
    fn failed_without_stderr_has_no_suffix() {
        let err = ExecError::Failed {
            command: "false".into(),
            code: 1,
            stderr: "  ".into(),
        };
        assert_eq!(err.to_string(), "'false' exited with status 1");
    }

    #[test]
    fn exec_error_is_transparent_inside_tool_error() {
        let err: ToolError = ExecError::NotFound {
            program: "tmux".into(),
        }
        .into();
        assert_eq!(err.to_string(), "command not found: tmux");
    }
}
