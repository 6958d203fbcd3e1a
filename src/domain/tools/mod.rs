//! Tools module - what the model can call and what it gets back.

mod search_documents;
mod tool_call;
mod tool_definition;
mod tool_result;

pub use search_documents::{SearchDocumentsArgs, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT, SEARCH_DOCUMENTS_TOOL};
pub use tool_call::ToolCall;
pub use tool_definition::ToolDefinition;
pub use tool_result::{DocumentLink, ToolResult};
