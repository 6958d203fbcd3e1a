//! Search backend adapters.
//!
//! - `VertexSearchBackend` - Discovery Engine REST API
//! - `InMemorySearchBackend` - Fixed results for tests

mod in_memory;
mod vertex_search;

pub use in_memory::InMemorySearchBackend;
pub use vertex_search::{
    endpoint_for_location, AccessTokenSource, VertexSearchBackend, VertexSearchConfig,
    METADATA_TOKEN_URL,
};
