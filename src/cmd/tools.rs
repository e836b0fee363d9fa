/*!
`tools.rs`

Implements `tmux-mcp tools`: print the tool registry without starting a server.

Human output: one row per tool (name, fields, description). Required fields
are marked with `*`, enumerated fields show their choices.

JSON output (`--json`): the exact `tools` array a client receives from
`tools/list`.
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{StyleOptions, table};
use crate::mcp::mcp_tools;
use crate::tools::registry::{FieldSpec, ToolDescriptor, descriptors};

#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Output the MCP tool definitions as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_tools(args: ToolsArgs) -> Result<()> {
    if args.json {
        let tools = serde_json::to_string_pretty(&mcp_tools())
            .context("Failed to serialize tool list")?;
        println!("{tools}");
        return Ok(());
    }

    let style = StyleOptions::detect();
    let rows: Vec<Vec<String>> = descriptors().iter().map(tool_row).collect();
    println!("Tools ({})", rows.len());
    println!("{}", table(&["NAME", "FIELDS", "DESCRIPTION"], &rows, &style));
    Ok(())
}

fn tool_row(d: &ToolDescriptor) -> Vec<String> {
    let fields: Vec<String> = d.fields.iter().map(field_label).collect();
    vec![d.name.to_string(), fields.join(" "), d.description.to_string()]
}

fn field_label(f: &FieldSpec) -> String {
    let mut label = f.name.to_string();
    if !f.choices.is_empty() {
        label.push('=');
        label.push_str(&f.choices.join("|"));
    }
    if f.required {
        label.push('*');
    }
    label
}
