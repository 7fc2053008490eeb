//! Result document store
//!
//! Result documents are written as `result_{id}.json` into one directory,
//! which the HTTP server also exposes, so the results page can fetch them
//! by id.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sdk::errors::AppError;
use sdk::types::{Recommendation, ResultDocument, UserProfile};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const GENERATED_ID_LEN: usize = 11;

/// Directory of stored result documents
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of a result document
    pub fn file_name(id: &str) -> String {
        format!("result_{}.json", id)
    }

    /// Only URL-safe ids map to files; anything else could escape the directory
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// New random URL-safe id
    pub fn generate_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Build a result document, stamped with the current time
    pub fn document(
        id: Option<String>,
        profile: UserProfile,
        recommendations: Vec<Recommendation>,
    ) -> ResultDocument {
        ResultDocument {
            user_profile: Some(profile.into()),
            recommendations,
            result_id: Some(id.unwrap_or_else(Self::generate_id)),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    /// Write a document and return its id
    pub fn save(&self, document: &ResultDocument) -> Result<String, AppError> {
        let id = document
            .result_id
            .clone()
            .ok_or(AppError::MissingResultId)?;
        if !Self::is_valid_id(&id) {
            return Err(AppError::ResultNotFound(id));
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(&id));
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&path, json).map_err(|e| {
            error!("Failed to save results to {}: {}", path.display(), e);
            AppError::Io(e)
        })?;

        info!("Results saved to {}", path.display());
        Ok(id)
    }

    /// Read a stored document; missing and malformed files both yield `None`
    pub fn get(&self, id: &str) -> Option<ResultDocument> {
        if !Self::is_valid_id(id) {
            warn!("Rejected result id {:?}", id);
            return None;
        }

        let path = self.dir.join(Self::file_name(id));
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => {
                warn!("Result file not found: {}", path.display());
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(document) => Some(document),
            Err(e) => {
                error!("Error decoding JSON from {}: {}", path.display(), e);
                None
            }
        }
    }
}
