/*!
Subcommand modules.

  serve   run the MCP server over stdio (default)
  tools   print the tool registry (table or JSON)
  call    dispatch one tool call locally and print the reply

Each module exposes one `execute_*` entry point returning `anyhow::Result<()>`
and a `clap::Args` struct. `shared` and `format` hold the helpers they reuse.
*/

pub mod call;
pub mod format;
pub mod serve;
pub mod shared;
pub mod tools;

pub use call::{CallArgs, execute_call};
pub use serve::{ServeArgs, execute_serve};
pub use tools::{ToolsArgs, execute_tools};
