//! Web search
//!
//! The search path does not touch the extraction pipeline: a
//! [`SearchProvider`] returns result tuples in its own order and the caller
//! only truncates them.

mod duckduckgo;

pub use duckduckgo::{DuckDuckGoProvider, DEFAULT_DUCKDUCKGO_URL};

use crate::error::SearchError;
use crate::types::{SearchRequest, SearchResponse, SearchResult};
use async_trait::async_trait;
use tracing::debug;

/// Trait for search backends
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Run `query` and return up to `limit` results in provider order
    ///
    /// Providers may return more than `limit`; callers truncate.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError>;
}

/// Search the web with the default provider
pub async fn search(req: SearchRequest) -> Result<SearchResponse, SearchError> {
    search_with_provider(req, &DuckDuckGoProvider::new()).await
}

/// Search the web with a caller-supplied provider
///
/// A count of zero returns an empty list without contacting the provider.
pub async fn search_with_provider(
    req: SearchRequest,
    provider: &dyn SearchProvider,
) -> Result<SearchResponse, SearchError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(SearchError::MissingQuery);
    }

    let limit = req.effective_num_results();
    if limit == 0 {
        return Ok(SearchResponse {
            query: query.to_string(),
            results: Vec::new(),
        });
    }

    debug!(provider = provider.name(), query, limit, "Searching");
    let mut results = provider.search(query, limit).await?;
    results.truncate(limit);

    Ok(SearchResponse {
        query: query.to_string(),
        results,
    })
}
