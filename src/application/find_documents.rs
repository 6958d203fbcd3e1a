//! The `searchDocuments` tool: search, then attach download links.
//!
//! The tool never fails outward. Bad arguments, missing configuration and
//! backend errors all come back as `ToolResult::failed`, which the model
//! reads like any other result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::search::SearchHit;
use crate::domain::tools::{
    DocumentLink, SearchDocumentsArgs, ToolCall, ToolDefinition, ToolResult, SEARCH_DOCUMENTS_TOOL,
};
use crate::ports::{CredentialRef, ToolExecutionContext, ToolExecutionError, ToolExecutor};

use super::document_search::DocumentSearchService;
use super::link_issuer::{LinkIssuer, DEFAULT_LINK_TTL_SECS};

/// Executes `searchDocuments` calls.
pub struct FindDocumentsTool {
    search: Arc<DocumentSearchService>,
    links: LinkIssuer,
    link_ttl_secs: u64,
    credential: Option<CredentialRef>,
}

impl FindDocumentsTool {
    pub fn new(search: Arc<DocumentSearchService>, links: LinkIssuer) -> Self {
        Self {
            search,
            links,
            link_ttl_secs: DEFAULT_LINK_TTL_SECS,
            credential: None,
        }
    }

    /// Sets the lifetime of issued links.
    pub fn with_link_ttl(mut self, ttl_secs: u64) -> Self {
        self.link_ttl_secs = ttl_secs;
        self
    }

    /// Signs links with an explicit credential instead of the ambient one.
    pub fn with_credential(mut self, credential: CredentialRef) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Runs the tool on raw model arguments.
    pub async fn find(&self, arguments: &serde_json::Value) -> ToolResult {
        let args = match SearchDocumentsArgs::from_value(arguments) {
            Ok(args) => args,
            Err(e) => {
                let query = arguments.get("query").and_then(|q| q.as_str()).unwrap_or_default();
                return ToolResult::failed(query, format!("Invalid tool arguments: {}", e));
            }
        };
        let max_results = match args.max_results() {
            Ok(n) => n,
            Err(e) => return ToolResult::failed(&args.query, format!("Invalid tool arguments: {}", e)),
        };

        tracing::info!(query = %args.query, max_results = ?max_results, "searching for documents");

        let hits = match self.search.search(&args.query, max_results).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!(query = %args.query, error = %e, "document search failed");
                return ToolResult::failed(&args.query, e.to_string());
            }
        };

        let documents = self.attach_links(&hits).await;
        tracing::info!(query = %args.query, found = documents.len(), "documents found");

        ToolResult::found(args.query, documents)
    }

    async fn attach_links(&self, hits: &[SearchHit]) -> Vec<DocumentLink> {
        let locators: Vec<&str> = hits.iter().filter_map(|h| h.locator.as_deref()).collect();
        let links = self
            .links
            .issue_links(locators, self.link_ttl_secs, self.credential.as_ref())
            .await;

        hits.iter()
            .map(|hit| DocumentLink {
                title: hit.title.clone(),
                file_name: hit.file_name().to_string(),
                locator: hit.locator.clone(),
                download_url: hit
                    .locator
                    .as_ref()
                    .map(|locator| links.get(locator).cloned().unwrap_or_else(|| locator.clone())),
            })
            .collect()
    }
}

#[async_trait]
impl ToolExecutor for FindDocumentsTool {
    async fn execute(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolResult, ToolExecutionError> {
        if call.name() != SEARCH_DOCUMENTS_TOOL {
            return Err(ToolExecutionError::ToolNotFound(call.name().to_string()));
        }
        tracing::debug!(
            request_id = %context.request_id,
            step = context.step,
            call_id = %call.id(),
            "executing tool"
        );
        Ok(self.find(call.arguments()).await)
    }

    fn available_tools(&self) -> Vec<ToolDefinition> {
        vec![SearchDocumentsArgs::definition()]
    }
}
