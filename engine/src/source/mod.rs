//! Result document sources
//!
//! The results page reads one document keyed by an opaque id. Where it comes
//! from is behind [`ResultSource`]: a remote static file server, or the local
//! result store. Sources never retry and never time out on their own.

use async_trait::async_trait;
use sdk::errors::AppError;
use sdk::types::ResultDocument;
use tracing::{debug, warn};

use crate::recommender::ResultStore;

/// Source of result documents
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// Fetch the document with the given id
    ///
    /// # Errors
    ///
    /// - `ResultNotFound` when the id is unknown or the document is unreadable
    /// - `Network` when the source could not be reached
    async fn fetch(&self, id: &str) -> Result<ResultDocument, AppError>;
}

/// Reads `{base_url}/result_{id}.json` over HTTP
#[derive(Debug, Clone)]
pub struct HttpResultSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResultSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of one document
    pub fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, ResultStore::file_name(id))
    }
}

#[async_trait]
impl ResultSource for HttpResultSource {
    async fn fetch(&self, id: &str) -> Result<ResultDocument, AppError> {
        if !ResultStore::is_valid_id(id) {
            return Err(AppError::ResultNotFound(id.to_string()));
        }

        let url = self.document_url(id);
        debug!("Fetching result document from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Result fetch failed for {}: {}", url, e);
            AppError::Network(e.to_string())
        })?;

        if !response.status().is_success() {
            warn!("Result fetch for {} returned {}", url, response.status());
            return Err(AppError::ResultNotFound(id.to_string()));
        }

        response.json::<ResultDocument>().await.map_err(|e| {
            warn!("Result document {} is not valid JSON: {}", id, e);
            AppError::ResultNotFound(id.to_string())
        })
    }
}

/// Reads documents straight from the local result store
#[derive(Debug, Clone)]
pub struct FileResultSource {
    store: ResultStore,
}

impl FileResultSource {
    pub fn new(store: ResultStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResultSource for FileResultSource {
    async fn fetch(&self, id: &str) -> Result<ResultDocument, AppError> {
        self.store
            .get(id)
            .ok_or_else(|| AppError::ResultNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_url_trims_slash() {
        let source = HttpResultSource::new("https://example.org/data/");
        assert_eq!(
            source.document_url("abc"),
            "https://example.org/data/result_abc.json"
        );
    }

    #[tokio::test]
    async fn test_file_source_not_found() {
        let dir = TempDir::new().unwrap();
        let source = FileResultSource::new(ResultStore::new(dir.path()));
        assert!(matches!(
            source.fetch("missing").await,
            Err(AppError::ResultNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_id_never_hits_the_network() {
        let source = HttpResultSource::new("http://127.0.0.1:9");
        assert!(matches!(
            source.fetch("../etc").await,
            Err(AppError::ResultNotFound(_))
        ));
    }
}
