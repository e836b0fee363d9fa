//! Subprocess execution.
//!
//! CommandLine    : program + argument vector (each argument passed verbatim)
//! CommandRunner  : async seam used by the dispatcher (swap in a fake for tests)
//! ProcessRunner  : real runner on top of tokio::process
//!
//! No shell is involved: an argument containing spaces or quotes reaches the
//! child as exactly one argv entry.

use async_trait::async_trait;
use std::fmt;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::ExecError;

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value` when `value` is present.
    pub fn opt(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    #[cfg(test)]
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }
}

impl fmt::Display for CommandLine {
    /// Shell-quoted rendering, for logs and error messages only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}

/// Captured output of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecError>;
}

/// Spawns the program, waits for it, and captures both streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecError> {
        tracing::debug!(command = %command, "spawning");

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExecError::NotFound {
                    program: command.program.clone(),
                },
                _ => ExecError::Spawn {
                    program: command.program.clone(),
                    source: e,
                },
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return Ok(CommandOutput { stdout, stderr });
        }
        match output.status.code() {
            Some(code) => Err(ExecError::Failed {
                command: command.to_string(),
                code,
                stderr,
            }),
            None => Err(ExecError::Killed {
                command: command.to_string(),
                stderr,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let cmd = CommandLine::new("tmux")
            .arg("split-window")
            .opt("-c", Some("/tmp/my dir"));
        assert_eq!(cmd.to_string(), "tmux split-window -c '/tmp/my dir'");
    }

    #[test]
    fn opt_skips_absent_values() {
        let cmd = CommandLine::new("tmux").arg("new-window").opt("-n", None);
        assert_eq!(cmd.args, vec!["new-window"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let cmd = CommandLine::new("sh")
            .arg("-c")
            .arg("printf out; printf err >&2");
        let out = ProcessRunner.run(&cmd).await.unwrap();
        assert_eq!(out.stdout, "out");
        assert_eq!(out.stderr, "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn argument_with_spaces_is_not_split() {
        let cmd = CommandLine::new("printf")
            .arg("[%s]")
            .arg("a b  c");
        let out = ProcessRunner.run(&cmd).await.unwrap();
        assert_eq!(out.stdout, "[a b  c]");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let cmd = CommandLine::new("sh").arg("-c").arg("echo boom >&2; exit 3");
        let err = ProcessRunner.run(&cmd).await.unwrap_err();
        match err {
            ExecError::Failed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let cmd = CommandLine::new("definitely-not-a-real-binary-4242");
        let err = ProcessRunner.run(&cmd).await.unwrap_err();
        assert!(matches!(err, ExecError::NotFound { .. }), "{err:?}");
    }
}
