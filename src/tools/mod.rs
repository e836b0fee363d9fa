//! Tool surface: declared shapes, typed inputs, and command builders.
//!
//!   registry  - static descriptors (name, description, fields) + JSON Schema
//!   input     - validation against a descriptor, `ToolInput` tagged union
//!   builders  - `ToolInput` -> `Invocation` (command line + reply wording)

pub mod builders;
pub mod input;
pub mod registry;

pub use builders::{Invocation, Reply, build};
pub use input::ToolInput;
pub use registry::{ToolDescriptor, descriptors};
