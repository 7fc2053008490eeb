//! EduGuide Engine Library
//!
//! This library provides the page controllers of the EduGuide mini app and
//! the tooling around them. It is used by both the main binary and
//! integration tests.

/// Configuration management module
pub mod config;

/// Telemetry and Observability
pub mod telemetry;

/// Markup helpers and bilingual labels
pub mod markup;

/// Institution dataset loading and page injection
pub mod dataset;

/// Host channel implementations
pub mod host;

/// Page controllers (directory, estimator, intake wizard, results)
pub mod pages;

/// Result document sources for the results page
pub mod source;

/// Recommendation scoring and result persistence
pub mod recommender;

/// Telegram bot receiving page payloads
pub mod bot;

/// HTTP server for built pages and result documents
pub mod server;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
