//! Application layer - use cases built on the ports.
//!
//! - `link_issuer` - signed download links for storage locators
//! - `document_search` - validated, normalized document search
//! - `find_documents` - the `searchDocuments` tool
//! - `chat_orchestrator` - the streamed model/tool loop

pub mod chat_orchestrator;
pub mod document_search;
pub mod find_documents;
pub mod link_issuer;

pub use chat_orchestrator::{ChatError, ChatOrchestrator, ChatSettings, ChatStream, GENERIC_FAILURE_MESSAGE};
pub use document_search::{DocumentSearchService, SearchError, SearchSettings, ENGINE_ID_SETTING, PROJECT_ID_SETTING};
pub use find_documents::FindDocumentsTool;
pub use link_issuer::{LinkIssuanceError, LinkIssuer, DEFAULT_LINK_TTL_SECS, MAX_LINK_TTL_SECS};
