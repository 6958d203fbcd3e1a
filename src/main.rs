//! Doc Finder server.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use doc_finder::adapters::ai::{OpenAIConfig, OpenAIProvider};
use doc_finder::adapters::http::{router, AppState};
use doc_finder::adapters::search::{AccessTokenSource, VertexSearchBackend, VertexSearchConfig};
use doc_finder::adapters::storage::{GcsUrlSigner, HmacCredential};
use doc_finder::application::{ChatOrchestrator, DocumentSearchService, FindDocumentsTool, LinkIssuer, SearchSettings};
use doc_finder::config::{AppConfig, ServerConfig};
use doc_finder::ports::{AIProvider, CredentialRef};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    let provider = build_provider(&config)?;
    let search = Arc::new(DocumentSearchService::new(
        Arc::new(build_search_backend(&config)?),
        search_settings(&config),
    ));
    let tool = build_tool(&config, Arc::clone(&search));
    let chat = Arc::new(ChatOrchestrator::new(provider, Arc::new(tool)));

    let app = router(AppState::new(chat, search), &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "doc-finder listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("doc-finder stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_provider(config: &AppConfig) -> Result<Option<Arc<dyn AIProvider>>, Box<dyn std::error::Error>> {
    let Some(key) = config.ai.api_key.as_ref().filter(|_| config.ai.has_api_key()) else {
        tracing::warn!("GEMINI_API_KEY is not configured; chat requests will fail");
        return Ok(None);
    };

    let provider = OpenAIProvider::new(
        OpenAIConfig::new(key.expose_secret().clone())
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;
    tracing::info!(model = %config.ai.model, "model provider configured");
    let provider: Arc<dyn AIProvider> = Arc::new(provider);
    Ok(Some(provider))
}

fn build_search_backend(config: &AppConfig) -> Result<VertexSearchBackend, Box<dyn std::error::Error>> {
    let search = &config.search;
    let mut backend_config = VertexSearchConfig::new(&search.location).with_timeout(search.timeout());
    if let Some(ref endpoint) = search.endpoint {
        backend_config = backend_config.with_endpoint(endpoint.clone());
    }
    if let Some(ref token) = search.access_token {
        backend_config = backend_config.with_token_source(AccessTokenSource::Static(token.clone()));
    }

    if search.project_id.is_none() || search.engine_id.is_none() {
        tracing::warn!("search project or engine id is not configured; searches will fail");
    }
    Ok(VertexSearchBackend::new(backend_config)?)
}

fn search_settings(config: &AppConfig) -> SearchSettings {
    let search = &config.search;
    SearchSettings {
        project_id: search.project_id.clone(),
        location: search.location.clone(),
        engine_id: search.engine_id.clone(),
        rich_content: search.rich_content,
        default_max_results: search.default_max_results,
        timeout: search.timeout(),
    }
}

fn build_tool(config: &AppConfig, search: Arc<DocumentSearchService>) -> FindDocumentsTool {
    let storage = &config.storage;
    let ambient = storage.hmac_key().map(|(id, secret)| HmacCredential::new(id, secret));
    if ambient.is_none() && storage.credential_file.is_none() {
        tracing::warn!("no signing key configured; documents will be linked by locator");
    }

    let mut signer = GcsUrlSigner::new(ambient);
    if let Some(ref host) = storage.host {
        signer = signer.with_host(host.clone());
    }
    let links = LinkIssuer::new(Arc::new(signer)).with_sign_timeout(storage.sign_timeout());

    let mut tool = FindDocumentsTool::new(search, links).with_link_ttl(storage.link_ttl_secs);
    if let Some(ref path) = storage.credential_file {
        tool = tool.with_credential(CredentialRef::KeyFile(path.clone()));
    }
    tool
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
