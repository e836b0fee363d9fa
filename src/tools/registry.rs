//! Static tool registry.
//!
//! Every operation the server exposes is declared here once: name, description
//! and input shape. The same table drives MCP discovery (`input_schema`),
//! argument validation (`tools::input`) and the `tools` CLI subcommand.

use serde_json::{Map, Value, json};

pub const SPLIT_PANE: &str = "split-pane";
pub const NEW_WINDOW: &str = "new-window";
pub const LIST_SESSIONS: &str = "list-sessions";
pub const LIST_WINDOWS: &str = "list-windows";
pub const SEND_KEYS: &str = "send-keys";
pub const OPEN_EDITOR: &str = "open-editor";
pub const OPEN_NOTE_IN_VAULT: &str = "open-note-in-vault";
pub const REGISTER_REMOTE_TOOL: &str = "register-remote-tool";
pub const LIST_REMOTE_TOOLS: &str = "list-remote-tools";

/// JSON type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    StringArray,
    StringMap,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::StringArray => "array",
            FieldKind::StringMap => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Str(&'static str),
    Bool(bool),
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Str(s) => Value::String(s.to_string()),
            FieldDefault::Bool(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub choices: &'static [&'static str],
    pub default: Option<FieldDefault>,
    pub description: &'static str,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            choices: &[],
            default: None,
            description,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    const fn default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    fn schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.kind.as_str()));
        prop.insert("description".into(), json!(self.description));
        match self.kind {
            FieldKind::StringArray => {
                prop.insert("items".into(), json!({ "type": "string" }));
            }
            FieldKind::StringMap => {
                prop.insert("additionalProperties".into(), json!({ "type": "string" }));
            }
            _ => {}
        }
        if !self.choices.is_empty() {
            prop.insert("enum".into(), json!(self.choices));
        }
        if let Some(d) = self.default {
            prop.insert("default".into(), d.to_value());
        }
        Value::Object(prop)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ToolDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// JSON Schema object describing the accepted arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.schema()))
            .collect();
        let required: Vec<&str> = self.required_fields().map(|f| f.name).collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema.insert("additionalProperties".into(), json!(false));
        schema
    }
}

const DIRECTIONS: &[&str] = &["horizontal", "vertical"];
const TRANSPORTS: &[&str] = &["stdio", "sse", "http"];
const SCOPES: &[&str] = &["local", "user", "project"];

use FieldKind::{Boolean, String as Str, StringArray, StringMap};

static TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: SPLIT_PANE,
        description: "Split the current tmux pane horizontally or vertically",
        fields: &[
            FieldSpec::new("direction", Str, "Split direction").required().choices(DIRECTIONS),
            FieldSpec::new("directory", Str, "Working directory for the new pane"),
            FieldSpec::new("command", Str, "Command to run in the new pane"),
        ],
    },
    ToolDescriptor {
        name: NEW_WINDOW,
        description: "Create a new tmux window",
        fields: &[
            FieldSpec::new("name", Str, "Window name"),
            FieldSpec::new("directory", Str, "Working directory for the window"),
            FieldSpec::new("command", Str, "Command to run in the window"),
        ],
    },
    ToolDescriptor {
        name: LIST_SESSIONS,
        description: "List tmux sessions",
        fields: &[],
    },
    ToolDescriptor {
        name: LIST_WINDOWS,
        description: "List windows of the current (or given) tmux session",
        fields: &[FieldSpec::new("session", Str, "Session to list windows for")],
    },
    ToolDescriptor {
        name: SEND_KEYS,
        description: "Send keys to a tmux pane, followed by Enter unless disabled",
        fields: &[
            FieldSpec::new("keys", Str, "Keys to send").required(),
            FieldSpec::new("target", Str, "Target pane (e.g. session:window.pane)"),
            FieldSpec::new("enter", Boolean, "Press Enter after the keys")
                .default(FieldDefault::Bool(true)),
        ],
    },
    ToolDescriptor {
        name: OPEN_EDITOR,
        description: "Open the editor in a new tmux pane",
        fields: &[
            FieldSpec::new("file", Str, "File to open"),
            FieldSpec::new("direction", Str, "Split direction")
                .choices(DIRECTIONS)
                .default(FieldDefault::Str("horizontal")),
            FieldSpec::new("directory", Str, "Working directory for the pane"),
        ],
    },
    ToolDescriptor {
        name: OPEN_NOTE_IN_VAULT,
        description: "Open a note from a vault in the editor; lists vaults when none is given",
        fields: &[
            FieldSpec::new("vault", Str, "Vault name (omit to list available vaults)"),
            FieldSpec::new("note", Str, "Note file name (defaults to a timestamp)"),
        ],
    },
    ToolDescriptor {
        name: REGISTER_REMOTE_TOOL,
        description: "Register an MCP server with the tool-registration CLI",
        fields: &[
            FieldSpec::new("name", Str, "Server name").required(),
            FieldSpec::new("command", Str, "Command line to launch (stdio transport)"),
            FieldSpec::new("args", StringArray, "Extra arguments appended after the command"),
            FieldSpec::new("transport", Str, "Transport mode")
                .choices(TRANSPORTS)
                .default(FieldDefault::Str("stdio")),
            FieldSpec::new("url", Str, "Server URL (sse/http transports)"),
            FieldSpec::new("env", StringMap, "Environment variables for the server"),
            FieldSpec::new("headers", StringMap, "HTTP headers (sse/http transports)"),
            FieldSpec::new("scope", Str, "Configuration scope").choices(SCOPES),
        ],
    },
    ToolDescriptor {
        name: LIST_REMOTE_TOOLS,
        description: "List MCP servers registered with the tool-registration CLI",
        fields: &[],
    },
];

/// All declared tools, in discovery order.
pub fn descriptors() -> &'static [ToolDescriptor] {
    TOOLS
}

pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|t| t.name == name)
}
