//! Command builders: typed tool input -> one `CommandLine`.
//!
//! Builders are pure. The current time is passed in so note names are
//! deterministic under test. Each builder also decides how the reply is
//! worded (`Reply`), since only it knows e.g. the computed note path.

use chrono::{DateTime, Local};
use std::path::{Component, Path};
use url::Url;

use super::input::{
    Direction, ListWindowsArgs, NewWindowArgs, OpenEditorArgs, OpenNoteArgs,
    RegisterRemoteToolArgs, SendKeysArgs, SplitPaneArgs, ToolInput, Transport,
};
use super::registry;
use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::process::CommandLine;

pub const SESSION_FORMAT: &str = "#{session_name}: #{session_windows} windows (created #{t:session_created})#{?session_attached, (attached),}";
pub const WINDOW_FORMAT: &str =
    "#{window_index}: #{window_name} (#{window_panes} panes)#{?window_active, (active),}";
pub const NOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// How the dispatcher words a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Header line followed by the raw command output.
    Listing(&'static str),
    /// Confirmation message; command output appended only when non-empty.
    Action(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: CommandLine,
    pub reply: Reply,
}

pub fn build(
    input: &ToolInput,
    config: &ServerConfig,
    now: DateTime<Local>,
) -> Result<Invocation, ToolError> {
    match input {
        ToolInput::SplitPane(args) => Ok(split_pane(config, args)),
        ToolInput::NewWindow(args) => Ok(new_window(config, args)),
        ToolInput::ListSessions => Ok(list_sessions(config)),
        ToolInput::ListWindows(args) => Ok(list_windows(config, args)),
        ToolInput::SendKeys(args) => send_keys(config, args),
        ToolInput::OpenEditor(args) => Ok(open_editor(config, args)),
        ToolInput::OpenNote(args) => open_note(config, args, now),
        ToolInput::RegisterRemoteTool(args) => register_remote_tool(config, args),
        ToolInput::ListRemoteTools => Ok(list_remote_tools(config)),
    }
}

fn split_window(config: &ServerConfig, direction: Direction, directory: Option<&str>) -> CommandLine {
    CommandLine::new(&config.tmux)
        .arg("split-window")
        .arg(direction.flag())
        .opt("-c", directory)
}

pub fn split_pane(config: &ServerConfig, args: &SplitPaneArgs) -> Invocation {
    let mut command = split_window(config, args.direction, args.directory.as_deref());
    if let Some(cmd) = &args.command {
        command = command.arg(cmd);
    }
    Invocation {
        command,
        reply: Reply::Action(format!("Split pane {}", args.direction.as_str())),
    }
}

pub fn new_window(config: &ServerConfig, args: &NewWindowArgs) -> Invocation {
    let mut command = CommandLine::new(&config.tmux)
        .arg("new-window")
        .opt("-n", args.name.as_deref())
        .opt("-c", args.directory.as_deref());
    if let Some(cmd) = &args.command {
        command = command.arg(cmd);
    }
    let message = match &args.name {
        Some(name) => format!("Created window '{name}'"),
        None => "Created new window".to_string(),
    };
    Invocation {
        command,
        reply: Reply::Action(message),
    }
}

pub fn list_sessions(config: &ServerConfig) -> Invocation {
    Invocation {
        command: CommandLine::new(&config.tmux)
            .arg("list-sessions")
            .arg("-F")
            .arg(SESSION_FORMAT),
        reply: Reply::Listing("Tmux sessions:"),
    }
}

pub fn list_windows(config: &ServerConfig, args: &ListWindowsArgs) -> Invocation {
    Invocation {
        command: CommandLine::new(&config.tmux)
            .arg("list-windows")
            .opt("-t", args.session.as_deref())
            .arg("-F")
            .arg(WINDOW_FORMAT),
        reply: Reply::Listing("Tmux windows:"),
    }
}

pub fn send_keys(config: &ServerConfig, args: &SendKeysArgs) -> Result<Invocation, ToolError> {
    if args.keys.is_empty() {
        return Err(ToolError::missing(registry::SEND_KEYS, "keys"));
    }
    let mut command = CommandLine::new(&config.tmux)
        .arg("send-keys")
        .opt("-t", args.target.as_deref())
        .arg(&args.keys);
    if args.enter {
        command = command.arg("Enter");
    }
    let target = args.target.as_deref().unwrap_or("current pane");
    Ok(Invocation {
        command,
        reply: Reply::Action(format!("Sent keys to {target}")),
    })
}

/// Shell-quoted editor invocation; tmux runs its command argument through a shell.
fn editor_command(config: &ServerConfig, file: Option<&str>) -> String {
    let mut words = vec![config.editor.as_str()];
    words.extend(file);
    shell_words::join(words)
}

pub fn open_editor(config: &ServerConfig, args: &OpenEditorArgs) -> Invocation {
    let command = split_window(config, args.direction, args.directory.as_deref())
        .arg(editor_command(config, args.file.as_deref()));
    let message = match &args.file {
        Some(file) => format!("Opened {} with {}", file, config.editor),
        None => format!("Opened {}", config.editor),
    };
    Invocation {
        command,
        reply: Reply::Action(message),
    }
}

/// `<note>.md`, or a timestamp-derived name when no note is given.
pub fn note_file_name(note: Option<&str>, now: DateTime<Local>) -> String {
    let base = match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.to_string(),
        None => now.format(NOTE_TIMESTAMP_FORMAT).to_string(),
    };
    if base.ends_with(".md") {
        base
    } else {
        format!("{base}.md")
    }
}

pub fn open_note(
    config: &ServerConfig,
    args: &OpenNoteArgs,
    now: DateTime<Local>,
) -> Result<Invocation, ToolError> {
    let vault = args.vault.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let Some(vault) = vault else {
        return Ok(list_vaults(&config.vault_root));
    };

    let note_name = note_file_name(args.note.as_deref(), now);
    let vault_dir = config.vault_root.join(inside_vault("vault", vault)?);
    let note_path = vault_dir.join(inside_vault("note", &note_name)?);
    let note_path = note_path.to_string_lossy();
    let vault_dir = vault_dir.to_string_lossy();

    let command = split_window(config, Direction::Horizontal, Some(vault_dir.as_ref()))
        .arg(editor_command(config, Some(note_path.as_ref())));
    Ok(Invocation {
        command,
        reply: Reply::Action(format!("Opened note {note_path} in vault '{vault}'")),
    })
}

/// Relative path that cannot climb out of the directory it is joined onto.
fn inside_vault<'a>(field: &str, value: &'a str) -> Result<&'a Path, ToolError> {
    let path = Path::new(value);
    let contained = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if contained {
        Ok(path)
    } else {
        Err(ToolError::invalid(
            registry::OPEN_NOTE_IN_VAULT,
            field,
            format!("'{value}' must be a relative path inside the vault root"),
        ))
    }
}

fn list_vaults(vault_root: &Path) -> Invocation {
    Invocation {
        command: CommandLine::new("ls")
            .arg("-1")
            .arg(vault_root.to_string_lossy()),
        reply: Reply::Listing("Available vaults:"),
    }
}

pub fn register_remote_tool(
    config: &ServerConfig,
    args: &RegisterRemoteToolArgs,
) -> Result<Invocation, ToolError> {
    let tool = registry::REGISTER_REMOTE_TOOL;
    if args.name.trim().is_empty() {
        return Err(ToolError::missing(tool, "name"));
    }

    let mut command = CommandLine::new(&config.registry_cli)
        .arg("mcp")
        .arg("add")
        .arg("--transport")
        .arg(args.transport.as_str())
        .opt("--scope", args.scope.as_deref());
    for (key, value) in &args.env {
        command = command.arg("-e").arg(format!("{key}={value}"));
    }

    if args.transport.is_network() {
        let url = require(args.url.as_deref(), args.transport, "url")?;
        let parsed = Url::parse(url).map_err(|e| ToolError::invalid(tool, "url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ToolError::invalid(
                tool,
                "url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        for (key, value) in &args.headers {
            command = command.arg("-H").arg(format!("{key}: {value}"));
        }
        command = command.arg(&args.name).arg(url);
    } else {
        if !args.headers.is_empty() {
            return Err(ToolError::invalid(
                tool,
                "headers",
                "only valid for sse/http transports",
            ));
        }
        let line = require(args.command.as_deref(), args.transport, "command")?;
        let tokens = shell_words::split(line)
            .map_err(|e| ToolError::invalid(tool, "command", e.to_string()))?;
        if tokens.is_empty() {
            return Err(ToolError::missing(tool, "command"));
        }
        command = command.arg(&args.name).arg("--").args(tokens);
    }
    command = command.args(args.args.iter().map(String::as_str));

    Ok(Invocation {
        command,
        reply: Reply::Action(format!(
            "Registered '{}' ({} transport)",
            args.name,
            args.transport.as_str()
        )),
    })
}

fn require<'a>(value: Option<&'a str>, transport: Transport, field: &str) -> Result<&'a str, ToolError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolError::TransportRequires {
            tool: registry::REGISTER_REMOTE_TOOL.to_string(),
            transport: transport.as_str().to_string(),
            field: field.to_string(),
        })
}

pub fn list_remote_tools(config: &ServerConfig) -> Invocation {
    Invocation {
        command: CommandLine::new(&config.registry_cli).arg("mcp").arg("list"),
        reply: Reply::Listing("Registered MCP servers:"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config() -> ServerConfig {
        ServerConfig {
            tmux: "tmux".into(),
            editor: "nvim".into(),
            vault_root: PathBuf::from("/home/me/vaults"),
            registry_cli: "claude".into(),
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
    }

    fn build_json(tool: &str, args: Value) -> Result<Invocation, ToolError> {
        let map: Map<String, Value> = args.as_object().cloned().unwrap();
        let input = ToolInput::parse(tool, map)?;
        build(&input, &config(), now())
    }

    fn argv(inv: &Invocation) -> Vec<&str> {
        inv.command.args.iter().map(String::as_str).collect()
    }

    #[test]
    fn split_pane_directions() {
        let h = build_json("split-pane", json!({"direction": "horizontal"})).unwrap();
        let v = build_json("split-pane", json!({"direction": "vertical"})).unwrap();
        assert_eq!(argv(&h), vec!["split-window", "-h"]);
        assert_eq!(argv(&v), vec!["split-window", "-v"]);
    }

    #[test]
    fn split_pane_with_directory_and_command() {
        let inv = build_json(
            "split-pane",
            json!({"direction": "vertical", "directory": "/srv/app", "command": "cargo watch -x test"}),
        )
        .unwrap();
        assert_eq!(
            argv(&inv),
            vec!["split-window", "-v", "-c", "/srv/app", "cargo watch -x test"]
        );
        assert_eq!(inv.reply, Reply::Action("Split pane vertical".into()));
    }

    #[test]
    fn new_window_flags_in_order() {
        let inv = build_json(
            "new-window",
            json!({"name": "logs", "directory": "/var/log", "command": "tail -f syslog"}),
        )
        .unwrap();
        assert_eq!(
            argv(&inv),
            vec!["new-window", "-n", "logs", "-c", "/var/log", "tail -f syslog"]
        );
    }

    #[test]
    fn list_sessions_uses_format_template() {
        let inv = build_json("list-sessions", json!({})).unwrap();
        assert_eq!(argv(&inv), vec!["list-sessions", "-F", SESSION_FORMAT]);
        assert_eq!(inv.reply, Reply::Listing("Tmux sessions:"));
    }

    #[test]
    fn list_windows_optional_session() {
        let inv = build_json("list-windows", json!({"session": "work"})).unwrap();
        assert_eq!(argv(&inv), vec!["list-windows", "-t", "work", "-F", WINDOW_FORMAT]);
    }

    #[test]
    fn send_keys_appends_enter_by_default() {
        let inv = build_json("send-keys", json!({"keys": "ls -la", "target": "main:1.0"})).unwrap();
        assert_eq!(argv(&inv), vec!["send-keys", "-t", "main:1.0", "ls -la", "Enter"]);
    }

    #[test]
    fn send_keys_without_enter() {
        let inv = build_json("send-keys", json!({"keys": "q", "enter": false})).unwrap();
        assert_eq!(argv(&inv), vec!["send-keys", "q"]);
    }

    #[test]
    fn open_editor_quotes_file_for_tmux_shell() {
        let inv = build_json("open-editor", json!({"file": "my notes.md"})).unwrap();
        assert_eq!(argv(&inv), vec!["split-window", "-h", "nvim 'my notes.md'"]);
    }

    #[test]
    fn open_editor_vertical_with_directory() {
        let inv = build_json(
            "open-editor",
            json!({"direction": "vertical", "directory": "/src"}),
        )
        .unwrap();
        assert_eq!(argv(&inv), vec!["split-window", "-v", "-c", "/src", "nvim"]);
    }

    #[test]
    fn open_note_without_vault_lists_vaults() {
        let inv = build_json("open-note-in-vault", json!({})).unwrap();
        assert_eq!(inv.command.program, "ls");
        assert_eq!(argv(&inv), vec!["-1", "/home/me/vaults"]);
        assert!(!inv.command.args.iter().any(|a| a.contains("nvim")));
        assert_eq!(inv.reply, Reply::Listing("Available vaults:"));
    }

    #[test]
    fn open_note_default_name_is_timestamp() {
        let inv = build_json("open-note-in-vault", json!({"vault": "work"})).unwrap();
        assert_eq!(
            argv(&inv),
            vec![
                "split-window",
                "-h",
                "-c",
                "/home/me/vaults/work",
                "nvim /home/me/vaults/work/2024-03-09_07-05-01.md",
            ]
        );
    }

    #[test]
    fn open_note_stays_inside_vault_root() {
        for args in [
            json!({"vault": "/etc", "note": "passwd"}),
            json!({"vault": "work", "note": "/etc/shadow"}),
            json!({"vault": "../../etc"}),
            json!({"vault": "work", "note": "../../../.ssh/config"}),
        ] {
            let err = build_json("open-note-in-vault", args.clone()).unwrap_err();
            assert!(matches!(err, ToolError::InvalidField { .. }), "{args}: {err}");
        }

        let inv = build_json("open-note-in-vault", json!({"vault": "work", "note": "daily/today"})).unwrap();
        assert_eq!(
            argv(&inv)[4],
            "nvim /home/me/vaults/work/daily/today.md"
        );
    }

    #[test]
    fn blank_optional_fields_emit_no_flags() {
        let inv = build_json(
            "split-pane",
            json!({"direction": "horizontal", "directory": "", "command": ""}),
        )
        .unwrap();
        assert_eq!(argv(&inv), vec!["split-window", "-h"]);

        let inv = build_json("send-keys", json!({"keys": "ls", "target": ""})).unwrap();
        assert_eq!(argv(&inv), vec!["send-keys", "ls", "Enter"]);
        assert_eq!(inv.reply, Reply::Action("Sent keys to current pane".into()));

        let inv = build_json("new-window", json!({"name": " "})).unwrap();
        assert_eq!(argv(&inv), vec!["new-window"]);
    }

    #[test]
    fn note_file_name_keeps_existing_extension() {
        assert_eq!(note_file_name(Some("todo.md"), now()), "todo.md");
        assert_eq!(note_file_name(Some("todo"), now()), "todo.md");
        assert_eq!(note_file_name(Some("  "), now()), "2024-03-09_07-05-01.md");
    }

    #[test]
    fn register_stdio_splits_command_and_appends_args() {
        let inv = build_json(
            "register-remote-tool",
            json!({
                "name": "fs",
                "command": "npx -y @modelcontextprotocol/server-filesystem",
                "args": ["/tmp/shared dir"],
                "env": {"B": "2", "A": "1"}
            }),
        )
        .unwrap();
        assert_eq!(inv.command.program, "claude");
        assert_eq!(
            argv(&inv),
            vec![
                "mcp", "add", "--transport", "stdio", "-e", "A=1", "-e", "B=2", "fs", "--",
                "npx", "-y", "@modelcontextprotocol/server-filesystem", "/tmp/shared dir",
            ]
        );
    }

    #[test]
    fn register_sse_requires_url() {
        let err = build_json(
            "register-remote-tool",
            json!({"name": "remote", "transport": "sse"}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "register-remote-tool: transport 'sse' requires field 'url'"
        );
    }

    #[test]
    fn register_stdio_requires_command() {
        let err = build_json("register-remote-tool", json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, ToolError::TransportRequires { ref field, .. } if field == "command"));
    }

    #[test]
    fn register_http_with_headers_and_scope() {
        let inv = build_json(
            "register-remote-tool",
            json!({
                "name": "api",
                "transport": "http",
                "url": "https://mcp.example.com/mcp",
                "scope": "user",
                "headers": {"Authorization": "Bearer t"}
            }),
        )
        .unwrap();
        assert_eq!(
            argv(&inv),
            vec![
                "mcp", "add", "--transport", "http", "--scope", "user", "-H",
                "Authorization: Bearer t", "api", "https://mcp.example.com/mcp",
            ]
        );
    }

    #[test]
    fn register_stdio_rejects_headers() {
        let err = build_json(
            "register-remote-tool",
            json!({"name": "s", "command": "node s.js", "headers": {"A": "b"}}),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidField { ref field, .. } if field == "headers"));
        assert!(err.to_string().contains("only valid for sse/http transports"), "{err}");
    }

    #[test]
    fn register_rejects_non_http_url() {
        let err = build_json(
            "register-remote-tool",
            json!({"name": "x", "transport": "sse", "url": "ftp://example.com"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"), "{err}");
    }

    #[test]
    fn register_rejects_unbalanced_quotes() {
        let args = RegisterRemoteToolArgs {
            name: "x".into(),
            command: Some("node \"server.js".into()),
            args: vec![],
            transport: Transport::Stdio,
            url: None,
            env: BTreeMap::new(),
            headers: BTreeMap::new(),
            scope: None,
        };
        let err = register_remote_tool(&config(), &args).unwrap_err();
        assert!(matches!(err, ToolError::InvalidField { ref field, .. } if field == "command"));
    }

    #[test]
    fn list_remote_tools_command() {
        let inv = build_json("list-remote-tools", json!({})).unwrap();
        assert_eq!(inv.command.to_string(), "claude mcp list");
    }

    proptest! {
        #[test]
        fn whitespace_never_splits_arguments(
            dir in "[a-z]{1,8}( [a-z ]{0,8})?",
            name in "[A-Za-z]{1,6} [A-Za-z ]{0,6}",
            keys in "[a-z\"' ]{1,12}",
            command in "[a-z]{1,6} [a-z\"' ]{0,8}",
            extra in prop::collection::vec("[a-z]{1,4} [a-z ]{0,4}", 0..3),
        ) {
            let inv = build_json(
                "new-window",
                json!({"name": name.clone(), "directory": dir.clone()}),
            ).unwrap();
            prop_assert!(inv.command.has_arg(&name));
            prop_assert!(inv.command.has_arg(&dir));

            prop_assume!(!keys.trim().is_empty());
            let inv = build_json("send-keys", json!({"keys": keys.clone()})).unwrap();
            prop_assert_eq!(inv.command.args.len(), 3);
            prop_assert_eq!(&inv.command.args[1], &keys);

            let inv = build_json(
                "split-pane",
                json!({"direction": "vertical", "directory": dir.clone(), "command": command.clone()}),
            ).unwrap();
            prop_assert_eq!(
                inv.command.args.clone(),
                vec!["split-window".to_string(), "-v".into(), "-c".into(), dir.clone(), command.clone()]
            );

            let inv = build_json(
                "register-remote-tool",
                json!({"name": "fs", "command": "npx server-fs", "args": extra.clone()}),
            ).unwrap();
            let tail = &inv.command.args[inv.command.args.len() - extra.len()..];
            prop_assert_eq!(tail, extra.as_slice());
        }
    }
}
