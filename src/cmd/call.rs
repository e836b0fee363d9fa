/*!
`call.rs`

Implements `tmux-mcp call <TOOL>`: dispatch a single tool call locally, exactly
as the server would for a `tools/call` request, and print the reply.

Arguments:
  --args '<json object>'   base argument object
  --param KEY=VALUE        repeatable; coerced by declared field kind and
                           applied on top of --args

Output: the reply text (or a JSON object with --json). Exit status 1 when the
reply is an error.
*/

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::cmd::format::{Role, StyleOptions, color};
use crate::cmd::shared::{build_arguments, parse_params};
use crate::config::ServerConfig;
use crate::dispatch::{CallOutcome, Dispatcher};
use crate::error::ToolError;
use crate::tools::registry;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke (see `tmux-mcp tools`)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide an argument (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Base arguments as a JSON object; --param entries override its keys
    #[arg(long = "args", value_name = "JSON")]
    pub json_args: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_call(args: CallArgs, config: ServerConfig) -> Result<()> {
    let tool = args.tool.trim();
    let outcome = match registry::find(tool) {
        None => CallOutcome::error(&ToolError::UnknownTool(tool.to_string())),
        Some(descriptor) => {
            let params = parse_params(&args.params)?;
            let arguments = build_arguments(descriptor, args.json_args.as_deref(), &params)?;

            let dispatcher = Dispatcher::new(Arc::new(config));
            let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
            rt.block_on(dispatcher.handle(tool, arguments))
        }
    };

    print_outcome(&outcome, args.json);
    if outcome.is_error {
        std::process::exit(1);
    }
    Ok(())
}

fn print_outcome(outcome: &CallOutcome, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": if outcome.is_error { "error" } else { "ok" },
                "text": outcome.text,
            })
        );
        return;
    }
    let style = StyleOptions::detect();
    if outcome.is_error {
        eprintln!("{}", color(Role::Error, &outcome.text, &style));
    } else {
        print!("{}", outcome.text);
        if !outcome.text.ends_with('\n') {
            println!();
        }
    }
}
