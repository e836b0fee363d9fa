use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod config;
mod dispatch;
mod error;
mod mcp;
mod process;
mod tools;
mod utils;

use cmd::{CallArgs, ServeArgs, ToolsArgs};
use config::{ConfigOverrides, ServerConfig};

/// tmux-mcp - MCP server exposing tmux, editor and MCP-registration operations
///
/// Command layout:
///   tmux-mcp [serve]                                  run the MCP server on stdio
///   tmux-mcp tools [--json]                           list the exposed tools
///   tmux-mcp call <TOOL> [--param k=v ...] [--args JSON] [--json]
///
/// Global flags:
///   -v / -vv            Increase verbosity (logs go to stderr)
///   -q / --quiet        Errors only
///   --config PATH       JSON or YAML file with tmux / editor / vault_root / registry_cli
///   --tmux, --editor, --vault-root, --registry-cli   override single settings
///
/// Examples:
///   tmux-mcp serve --editor hx --vault-root ~/notes
///   tmux-mcp call split-pane --param direction=vertical --param directory=/srv/app
///   tmux-mcp call send-keys --param keys="make test" --param enter=false
///   tmux-mcp call register-remote-tool --args '{"name":"fs","command":"npx -y server-fs"}'
#[derive(Parser, Debug)]
#[command(
    name = "tmux-mcp",
    version,
    author,
    about = "tmux-mcp - MCP server for tmux panes, editors and MCP registrations",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (JSON or YAML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// tmux binary
    #[arg(long, global = true, value_name = "BIN")]
    tmux: Option<String>,

    /// Editor opened by open-editor / open-note-in-vault
    #[arg(long, global = true, value_name = "BIN")]
    editor: Option<String>,

    /// Directory containing note vaults
    #[arg(long = "vault-root", global = true, value_name = "DIR")]
    vault_root: Option<String>,

    /// CLI used to register / list MCP servers
    #[arg(long = "registry-cli", global = true, value_name = "BIN")]
    registry_cli: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server over stdio (default)
    Serve(ServeArgs),

    /// List the tools this server exposes
    Tools(ToolsArgs),

    /// Invoke a single tool locally and print its reply
    Call(CallArgs),
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            tmux: self.tmux.clone(),
            editor: self.editor.clone(),
            vault_root: self.vault_root.clone(),
            registry_cli: self.registry_cli.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet));

    let config = match ServerConfig::load(cli.config.as_deref(), cli.overrides()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => cmd::execute_serve(args, config),
        Commands::Tools(args) => cmd::execute_tools(args),
        Commands::Call(args) => cmd::execute_call(args, config),
    }
}
