//! Domain layer - pure types and rules with no I/O.
//!
//! - `foundation` - shared errors and the state machine trait
//! - `storage` - `gs://` locators
//! - `search` - hits, backend schema, extraction rules
//! - `tools` - tool calls, definitions, results
//! - `chat` - orchestration phases and stream events

pub mod chat;
pub mod foundation;
pub mod search;
pub mod storage;
pub mod tools;
