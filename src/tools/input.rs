//! Argument validation and typed tool input.
//!
//! Incoming arguments are an untyped JSON object. `ToolInput::parse` checks
//! them against the tool's declared shape (unknown fields, missing required
//! fields, JSON types, enum choices), fills in declared defaults, and only
//! then deserializes into the per-tool argument struct.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::registry::{self, FieldKind, ToolDescriptor};
use crate::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn flag(self) -> &'static str {
        match self {
            Direction::Horizontal => "-h",
            Direction::Vertical => "-v",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    Sse,
    Http,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Sse => "sse",
            Transport::Http => "http",
        }
    }

    pub fn is_network(self) -> bool {
        !matches!(self, Transport::Stdio)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitPaneArgs {
    pub direction: Direction,
    pub directory: Option<String>,
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewWindowArgs {
    pub name: Option<String>,
    pub directory: Option<String>,
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListWindowsArgs {
    pub session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendKeysArgs {
    pub keys: String,
    pub target: Option<String>,
    #[serde(default = "default_true")]
    pub enter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenEditorArgs {
    pub file: Option<String>,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenNoteArgs {
    pub vault: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRemoteToolArgs {
    pub name: String,
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_transport")]
    pub transport: Transport,
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub scope: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_direction() -> Direction {
    Direction::Horizontal
}

fn default_transport() -> Transport {
    Transport::Stdio
}

/// One variant per declared tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInput {
    SplitPane(SplitPaneArgs),
    NewWindow(NewWindowArgs),
    ListSessions,
    ListWindows(ListWindowsArgs),
    SendKeys(SendKeysArgs),
    OpenEditor(OpenEditorArgs),
    OpenNote(OpenNoteArgs),
    RegisterRemoteTool(RegisterRemoteToolArgs),
    ListRemoteTools,
}

impl ToolInput {
    /// Validate `arguments` against the named tool's shape and build the typed input.
    pub fn parse(tool: &str, arguments: Map<String, Value>) -> Result<Self, ToolError> {
        let descriptor =
            registry::find(tool).ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;
        let args = validate(descriptor, arguments)?;

        let input = match descriptor.name {
            registry::SPLIT_PANE => ToolInput::SplitPane(decode(tool, args)?),
            registry::NEW_WINDOW => ToolInput::NewWindow(decode(tool, args)?),
            registry::LIST_SESSIONS => ToolInput::ListSessions,
            registry::LIST_WINDOWS => ToolInput::ListWindows(decode(tool, args)?),
            registry::SEND_KEYS => ToolInput::SendKeys(decode(tool, args)?),
            registry::OPEN_EDITOR => ToolInput::OpenEditor(decode(tool, args)?),
            registry::OPEN_NOTE_IN_VAULT => ToolInput::OpenNote(decode(tool, args)?),
            registry::REGISTER_REMOTE_TOOL => ToolInput::RegisterRemoteTool(decode(tool, args)?),
            registry::LIST_REMOTE_TOOLS => ToolInput::ListRemoteTools,
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(input)
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolInput::SplitPane(_) => registry::SPLIT_PANE,
            ToolInput::NewWindow(_) => registry::NEW_WINDOW,
            ToolInput::ListSessions => registry::LIST_SESSIONS,
            ToolInput::ListWindows(_) => registry::LIST_WINDOWS,
            ToolInput::SendKeys(_) => registry::SEND_KEYS,
            ToolInput::OpenEditor(_) => registry::OPEN_EDITOR,
            ToolInput::OpenNote(_) => registry::OPEN_NOTE_IN_VAULT,
            ToolInput::RegisterRemoteTool(_) => registry::REGISTER_REMOTE_TOOL,
            ToolInput::ListRemoteTools => registry::LIST_REMOTE_TOOLS,
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, args: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| ToolError::invalid(tool, "arguments", e.to_string()))
}

/// Check `provided` against the descriptor and return the normalized map.
///
/// - `null` and blank strings are treated as absent
/// - absent fields with a declared default receive it
pub fn validate(
    descriptor: &ToolDescriptor,
    provided: Map<String, Value>,
) -> Result<Map<String, Value>, ToolError> {
    let tool = descriptor.name;

    if let Some(unknown) = provided.keys().find(|k| descriptor.field(k).is_none()) {
        return Err(ToolError::UnknownField {
            tool: tool.to_string(),
            field: unknown.clone(),
        });
    }

    let mut remaining = provided;
    let mut out = Map::new();

    for field in descriptor.fields {
        let value = remaining.remove(field.name).filter(|v| !is_blank(v));
        let Some(value) = value else {
            if field.required {
                return Err(ToolError::missing(tool, field.name));
            }
            if let Some(default) = field.default {
                out.insert(field.name.to_string(), default.to_value());
            }
            continue;
        };

        check_kind(tool, field.name, field.kind, &value)?;

        if let Value::String(s) = &value {
            if !field.choices.is_empty() && !field.choices.contains(&s.as_str()) {
                return Err(ToolError::invalid(
                    tool,
                    field.name,
                    format!("'{s}' is not one of {}", field.choices.join(", ")),
                ));
            }
        }

        out.insert(field.name.to_string(), value);
    }

    Ok(out)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_kind(tool: &str, field: &str, kind: FieldKind, value: &Value) -> Result<(), ToolError> {
    let ok = match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::StringArray => value
            .as_array()
            .is_some_and(|arr| arr.iter().all(Value::is_string)),
        FieldKind::StringMap => value
            .as_object()
            .is_some_and(|obj| obj.values().all(Value::is_string)),
    };
    if ok {
        Ok(())
    } else {
        Err(ToolError::invalid(
            tool,
            field,
            format!("expected {}, got {}", describe_kind(kind), json_type(value)),
        ))
    }
}

fn describe_kind(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "a string",
        FieldKind::Boolean => "a boolean",
        FieldKind::StringArray => "an array of strings",
        FieldKind::StringMap => "an object of string values",
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
