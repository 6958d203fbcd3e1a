//! Foundation module - Shared domain primitives.
//!
//! Error types and the state machine trait used by the other domain modules.

mod errors;
mod state_machine;

pub use errors::{ConfigurationError, ValidationError};
pub use state_machine::StateMachine;
