//! MCP server surface.
//!
//! TmuxServer implements `rmcp::ServerHandler` by hand: `tools/list` is served
//! from the static registry, `tools/call` goes through the `Dispatcher`.
//! `serve_stdio` runs the server over stdin/stdout until the client hangs up.

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt, transport::stdio};
use std::sync::Arc;

use crate::dispatch::{CallOutcome, Dispatcher};
use crate::tools::{ToolDescriptor, descriptors};

const INSTRUCTIONS: &str = "Drives the local tmux server: split panes, open windows, \
send keys, list sessions/windows, open the editor or a vault note in a new pane, \
and register MCP servers with the tool-registration CLI.";

#[derive(Clone)]
pub struct TmuxServer {
    dispatcher: Arc<Dispatcher>,
}

impl TmuxServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Registry entry -> MCP tool definition.
pub fn to_mcp_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name,
        descriptor.description,
        Arc::new(descriptor.input_schema()),
    )
}

pub fn mcp_tools() -> Vec<Tool> {
    descriptors().iter().map(to_mcp_tool).collect()
}

pub fn to_call_result(outcome: CallOutcome) -> CallToolResult {
    let content = vec![Content::text(outcome.text)];
    if outcome.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for TmuxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(mcp_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        tracing::info!(tool = %request.name, "tools/call");
        let outcome = self.dispatcher.handle(&request.name, arguments).await;
        Ok(to_call_result(outcome))
    }
}

/// Serve over stdio until the peer disconnects.
pub async fn serve_stdio(server: TmuxServer) -> Result<()> {
    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {:?}", e))
        .context("Failed to start MCP server on stdio")?;

    tracing::info!("MCP server ready on stdio");
    service
        .waiting()
        .await
        .context("MCP server terminated abnormally")?;
    Ok(())
}
