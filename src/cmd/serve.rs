/*!
`serve.rs`

Implements `tmux-mcp serve` (also the default when no subcommand is given):
run the MCP server over stdio. stdout carries protocol frames only; all
logging goes to stderr.
*/

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::mcp::{self, TmuxServer};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

pub fn execute_serve(_args: ServeArgs, config: ServerConfig) -> Result<()> {
    tracing::info!(
        tmux = %config.tmux,
        editor = %config.editor,
        vault_root = %config.vault_root.display(),
        registry_cli = %config.registry_cli,
        "starting tmux-mcp"
    );

    let server = TmuxServer::new(Dispatcher::new(Arc::new(config)));
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(mcp::serve_stdio(server))
}
