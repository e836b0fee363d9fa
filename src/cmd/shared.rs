/*!
shared.rs - helpers shared by the `tools` and `call` subcommands.

Focus:
  - parse_params: KEY=VALUE pairs from repeated --param flags
  - coerce_value: raw CLI string -> JSON value, guided by the declared field kind
  - build_arguments: merge an --args JSON object with coerced --param values

Validation proper (required / enum / unknown fields) stays in the dispatcher;
this module only turns CLI text into the JSON a protocol client would send.
*/

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::tools::registry::{FieldKind, ToolDescriptor};

/// Split repeated `KEY=VALUE` flags. Keys are trimmed; values are kept verbatim.
pub fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    let mut out = Vec::with_capacity(raw.len());
    for kv in raw {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            bail!("invalid --param (empty key): {kv}");
        }
        out.push((key.to_string(), v.to_string()));
    }
    Ok(out)
}

/// Coerce a raw string into a JSON value using the declared field kind.
/// Unrecognized boolean words stay strings so validation can report them.
pub fn coerce_value(raw: &str, kind: Option<FieldKind>) -> Value {
    match kind {
        Some(FieldKind::Boolean) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        Some(FieldKind::StringArray) => Value::Array(
            raw.split(',')
                .map(|s| Value::String(s.trim().to_string()))
                .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
                .collect(),
        ),
        Some(FieldKind::StringMap) => {
            let mut map = Map::new();
            for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                map.insert(k.trim().to_string(), Value::String(v.trim().to_string()));
            }
            Value::Object(map)
        }
        _ => Value::String(raw.to_string()),
    }
}

/// Build the argument object for `descriptor`: `--args` JSON first, then
/// `--param` values on top (coerced by field kind; undeclared keys pass through
/// as strings and are rejected later by validation).
pub fn build_arguments(
    descriptor: &ToolDescriptor,
    json_args: Option<&str>,
    params: &[(String, String)],
) -> Result<Map<String, Value>> {
    let mut result = match json_args {
        Some(raw) => {
            let value: Value =
                serde_json::from_str(raw).context("--args is not valid JSON")?;
            match value {
                Value::Object(map) => map,
                _ => bail!("--args must be a JSON object"),
            }
        }
        None => Map::new(),
    };

    for (key, raw) in params {
        let kind = descriptor.field(key).map(|f| f.kind);
        result.insert(key.clone(), coerce_value(raw, kind));
    }
    Ok(result)
}
