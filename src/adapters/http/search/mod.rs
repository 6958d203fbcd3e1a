//! HTTP adapter for direct document search.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{SearchRequestBody, SearchResponseBody};
pub use routes::search_routes;
