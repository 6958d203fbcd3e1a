//! Tool Executor Port - Interface for executing tools invoked by the model.
//!
//! The chat orchestrator hands every tool call the model makes to an
//! executor and feeds the returned [`ToolResult`] back as the tool message.
//!
//! # Design
//!
//! - Tools are invoked with raw JSON arguments and parse them themselves
//! - Tool-level failures (bad arguments, backend outages) are reported inside
//!   the result as `success: false`, so the model can react to them
//! - `Err` is reserved for calls the executor cannot route at all
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use doc_finder::ports::{ToolExecutor, ToolExecutionContext, ToolExecutionError};
//!
//! struct FileFinder { /* ... */ }
//!
//! #[async_trait]
//! impl ToolExecutor for FileFinder {
//!     async fn execute(
//!         &self,
//!         call: &ToolCall,
//!         context: &ToolExecutionContext,
//!     ) -> Result<ToolResult, ToolExecutionError> {
//!         // 1. Parse arguments
//!         // 2. Run the tool
//!         // 3. Fold failures into ToolResult::failed
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ToolCall, ToolDefinition, ToolResult};

/// Port for executing model-invoked tools.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool call.
    ///
    /// # Returns
    ///
    /// * `Ok(ToolResult)` - Tool ran (check `is_success()` for outcome)
    /// * `Err(ToolExecutionError)` - The call could not be dispatched
    async fn execute(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolResult, ToolExecutionError>;

    /// Tool definitions to register with the model.
    fn available_tools(&self) -> Vec<ToolDefinition>;

    /// Check if a tool exists.
    fn has_tool(&self, name: &str) -> bool {
        self.available_tools().iter().any(|t| t.name() == name)
    }
}

/// Context for tool execution, used for log correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    /// Id of the chat request the call belongs to.
    pub request_id: String,
    /// Model step that produced the call.
    pub step: u32,
}

impl ToolExecutionContext {
    /// Creates a new execution context.
    pub fn new(request_id: impl Into<String>, step: u32) -> Self {
        Self {
            request_id: request_id.into(),
            step,
        }
    }
}

/// Errors that can occur during tool dispatch.
#[derive(Debug, Clone, Error)]
pub enum ToolExecutionError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Parameter validation failed
    #[error("Validation error: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Infrastructure/system error
    #[error("System error: {0}")]
    SystemError(String),
}

impl ToolExecutionError {
    /// Creates a system error.
    pub fn system(message: impl Into<String>) -> Self {
        Self::SystemError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_context_new_sets_fields() {
        let ctx = ToolExecutionContext::new("req-1", 2);
        assert_eq!(ctx.request_id, "req-1");
        assert_eq!(ctx.step, 2);
    }

    #[test]
    fn tool_execution_error_from_validation() {
        let validation_err = ValidationError::empty_field("query");
        let exec_err: ToolExecutionError = validation_err.into();

        assert!(matches!(exec_err, ToolExecutionError::ValidationFailed(_)));
    }

    #[test]
    fn tool_not_found_displays_name() {
        let err = ToolExecutionError::ToolNotFound("deleteEverything".to_string());
        assert_eq!(err.to_string(), "Tool not found: deleteEverything");
    }
}
