pub mod binding;
pub mod registry;
pub mod schema;
pub mod traits;

pub use binding::{blocking, FnTool};
pub use registry::ToolRegistry;
pub use schema::derive_schema;
pub use traits::{Tool, ToolDefinition};
