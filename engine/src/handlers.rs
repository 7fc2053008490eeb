//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - build-pages: Inject the dataset into the page templates
//! - browse: Filter the institution directory
//! - estimate: Project study costs
//! - recommend: Score institutions for a profile and store the result
//! - results: Render a stored result
//! - serve: Serve pages and result documents
//! - bot: Run the Telegram bot
//! - doctor: Validate configuration and local files

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use sdk::types::{InstitutionId, UserProfile};

use crate::bot::{Inbox, TelegramBot};
use crate::config::Config;
use crate::dataset::{build_pages, BuildOutcome, Dataset, PageKind};
use crate::host::{MemoryHost, WriterHost};
use crate::pages::{DirectoryPage, EstimatorCommand, EstimatorPage, PageController, PageQuery};
use crate::pages::{ResultsPage, ResultsView};
use crate::recommender::{Recommender, ResultStore};
use crate::source::{FileResultSource, HttpResultSource, ResultSource};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

fn load_dataset(config: &Config) -> Arc<Dataset> {
    Arc::new(Dataset::load(&config.dataset.path))
}

/// Build every page from its template
pub async fn handle_build_pages(config: &Config, format: OutputFormat) -> Result<()> {
    let dataset = load_dataset(config);
    let outcomes = build_pages(
        &dataset,
        &config.pages.template_dir,
        &config.pages.output_dir,
        &config.pages.marker,
    )
    .context("Failed to build pages")?;

    match format {
        OutputFormat::Text => {
            println!("Injected {} institutions", dataset.len());
            for (page, outcome) in &outcomes {
                match outcome {
                    BuildOutcome::Built(path) => {
                        println!("  ✓ {:<18} {}", page.title(), path.display())
                    }
                    BuildOutcome::SkippedMissingTemplate(path) => {
                        println!("  - {:<18} skipped, no template at {}", page.title(), path.display())
                    }
                }
            }
        }
        OutputFormat::Json => {
            let pages = outcomes
                .iter()
                .map(|(page, outcome)| match outcome {
                    BuildOutcome::Built(path) => json!({
                        "page": page.dir_name(),
                        "status": "built",
                        "path": path,
                    }),
                    BuildOutcome::SkippedMissingTemplate(path) => json!({
                        "page": page.dir_name(),
                        "status": "skipped",
                        "template": path,
                    }),
                })
                .collect::<Vec<_>>();
            let output = json!({
                "institutions": dataset.len(),
                "pages": pages,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Filter the directory and optionally open one record
pub async fn handle_browse(
    search: &str,
    location: &str,
    details: Option<InstitutionId>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let host = MemoryHost::new();
    let mut page = DirectoryPage::new(load_dataset(config), host.handle());
    page.apply_filter(search, location);

    if let Some(id) = details {
        page.select_institution(id)
            .with_context(|| format!("Cannot open institution {}", id))?;
    }

    match format {
        OutputFormat::Text => {
            if let Some(record) = page.detail() {
                println!("{}", crate::bot::inbox::format_institution(record));
                return Ok(());
            }
            if page.filtered_len() == 0 {
                println!("{}", crate::markup::labels::NO_RESULTS);
                return Ok(());
            }
            println!("{} institution(s):", page.filtered_len());
            println!();
            for record in page.filtered() {
                println!(
                    "  {:>4}  {:<45} {}",
                    record.id,
                    record.display_name(),
                    record.location.as_deref().unwrap_or("N/A")
                );
            }
        }
        OutputFormat::Json => {
            let output = match page.detail() {
                Some(record) => json!({ "institution": record }),
                None => json!({
                    "count": page.filtered_len(),
                    "institutions": page.filtered().collect::<Vec<_>>(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Inputs of the estimate command
#[derive(Debug, Clone, Default)]
pub struct EstimateArgs {
    pub institution: InstitutionId,
    pub scholarship: Option<u8>,
    pub living: Option<u32>,
    pub years: Option<u8>,
    pub category: Option<String>,
    pub share: bool,
}

/// Project costs for one institution
///
/// With `share`, the share payload is written to stdout as one JSON line
/// and nothing else is printed.
pub async fn handle_estimate(args: EstimateArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let host = if args.share {
        WriterHost::<std::io::Stdout>::stdout()
    } else {
        MemoryHost::new().handle()
    };
    let mut page = EstimatorPage::new(load_dataset(config), host, &config.estimator);

    page.apply(EstimatorCommand::SelectInstitution(Some(args.institution)))?;
    if page.selected_institution().is_none() {
        anyhow::bail!("Unknown institution id {}", args.institution);
    }

    if let Some(name) = &args.category {
        let choice = page.categories().iter().enumerate().find_map(|(g, group)| {
            group
                .options
                .iter()
                .position(|option| option == name)
                .map(|o| (g, o))
        });
        if choice.is_none() {
            anyhow::bail!("Institution {} has no major named '{}'", args.institution, name);
        }
        page.apply(EstimatorCommand::SelectCategory(choice))?;
    }
    if let Some(percent) = args.scholarship {
        page.apply(EstimatorCommand::SetScholarship(percent))?;
    }
    if let Some(amount) = args.living {
        page.apply(EstimatorCommand::SetMonthlyLiving(amount))?;
    }
    if let Some(years) = args.years {
        page.apply(EstimatorCommand::SetYears(years))?;
    }

    if args.share {
        page.share_result().context("Failed to share estimate")?;
        return Ok(());
    }

    let figures = page.compute_projection()?.rounded();
    match format {
        OutputFormat::Text => {
            use crate::markup::{format_money, labels};
            if let Some(record) = page.selected_institution() {
                println!("{} ({})", record.display_name(), page.category_label());
            }
            println!("  {:<30} {}", labels::YEARLY_TUITION, format_money(figures.yearly_tuition));
            println!("  {:<30} {}", labels::YEARLY_LIVING, format_money(figures.yearly_living));
            println!("  {:<30} {}", labels::YEARLY_TOTAL, format_money(figures.yearly_total));
            println!(
                "  {:<30} {} ({} years)",
                labels::PROGRAM_TOTAL,
                format_money(figures.total_program_cost),
                page.years()
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "institution_id": args.institution,
                "category_label": page.category_label(),
                "years": page.years(),
                "yearly_tuition": figures.yearly_tuition,
                "yearly_living": figures.yearly_living,
                "yearly_total": figures.yearly_total,
                "total_program_cost": figures.total_program_cost,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Read a profile from a file path or inline JSON
fn read_profile(profile: &str) -> Result<UserProfile> {
    let path = Path::new(profile);
    let contents = if path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?
    } else {
        profile.to_string()
    };
    serde_json::from_str(&contents).context("Profile is not a valid JSON user profile")
}

/// Score institutions and store the result document
pub async fn handle_recommend(
    profile: &str,
    id: Option<String>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let profile = read_profile(profile)?;
    let recommender = Recommender::new(load_dataset(config), config.results.top_n);
    let recommendations = recommender.recommend(&profile);

    let store = ResultStore::new(&config.results.dir);
    let document = ResultStore::document(id, profile, recommendations);
    let id = store.save(&document).context("Failed to store result")?;

    let link = format!(
        "{}/{}/index.html?id={}&bot={}",
        config.host.pages_base_url.trim_end_matches('/'),
        crate::pages::RESULTS_DIR,
        id,
        config.host.bot_username
    );

    match format {
        OutputFormat::Text => {
            println!(
                "{}",
                crate::bot::inbox::format_recommendations(&document.recommendations)
            );
            println!();
            println!("Result {} stored: {}", id, link);
        }
        OutputFormat::Json => {
            let output = json!({
                "result_id": id,
                "link": link,
                "document": document,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Render a stored result the way the results page shows it
pub async fn handle_results(
    id: Option<String>,
    remote: Option<String>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let source: Box<dyn ResultSource> = match remote.or_else(|| config.results.base_url.clone()) {
        Some(base_url) => Box::new(HttpResultSource::new(base_url)),
        None => Box::new(FileResultSource::new(ResultStore::new(&config.results.dir))),
    };

    let query = PageQuery {
        id,
        bot: Some(config.host.bot_username.clone()),
    };
    let mut page = ResultsPage::new(query, &config.host.bot_username);
    if let Err(e) = page.load_from_query(source.as_ref()).await {
        tracing::debug!("Result load failed: {}", e);
    }

    match format {
        OutputFormat::Text => println!("{}", page.render()),
        OutputFormat::Json => {
            let output = match page.view() {
                ResultsView::Ready(document) => json!({ "status": "ready", "document": document }),
                ResultsView::Failed(message) => json!({ "status": "failed", "error": message }),
                ResultsView::Loading => json!({ "status": "loading" }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Serve the built pages and result documents
pub async fn handle_serve(bind: Option<String>, config: &Config) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let store = ResultStore::new(&config.results.dir);
    let app = crate::server::router(store, &config.pages.output_dir);
    crate::server::serve(&bind, app).await
}

/// Run the Telegram bot until interrupted
pub async fn handle_bot(config: &Config) -> Result<()> {
    let token = std::env::var(&config.bot.token_env).with_context(|| {
        format!(
            "Telegram bot token not set. Export {} first.",
            config.bot.token_env
        )
    })?;

    let recommender = Recommender::new(load_dataset(config), config.results.top_n);
    let results_url = format!(
        "{}/{}/index.html",
        config.host.pages_base_url.trim_end_matches('/'),
        crate::pages::RESULTS_DIR
    );
    let inbox = Inbox::new(recommender)
        .with_results(ResultStore::new(&config.results.dir), results_url);

    let bot = TelegramBot::new(token, config.bot.allowed_users.clone(), inbox)
        .with_pages(&config.host.pages_base_url)
        .with_username(config.host.bot_username.clone());

    tokio::select! {
        result = bot.start_polling() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Bot shutting down");
            Ok(())
        }
    }
}

/// Run system diagnostics
///
/// Checks the dataset, the page templates, the result directory and the
/// bot token, and reports any issues.
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks = Vec::new();

    // Config is already validated when loaded
    checks.push(("Configuration".to_string(), "Valid".to_string()));

    match std::fs::read_to_string(&config.dataset.path) {
        Ok(contents) => match Dataset::from_json_str(&contents) {
            Ok(dataset) => {
                checks.push((
                    "Dataset".to_string(),
                    format!("{} institutions", dataset.len()),
                ));
                if dataset.is_empty() {
                    issues.push("Dataset contains no usable records".to_string());
                }
            }
            Err(e) => {
                checks.push(("Dataset".to_string(), "Invalid".to_string()));
                issues.push(format!("Dataset cannot be decoded: {}", e));
            }
        },
        Err(_) => {
            checks.push(("Dataset".to_string(), "Missing".to_string()));
            issues.push(format!(
                "Dataset file does not exist: {:?}",
                config.dataset.path
            ));
        }
    }

    for page in PageKind::ALL {
        let template = config
            .pages
            .template_dir
            .join(page.dir_name())
            .join("index.template.html");
        let status = match std::fs::read_to_string(&template) {
            Ok(contents) if contents.contains(&config.pages.marker) => "OK",
            Ok(_) => {
                issues.push(format!(
                    "Template {:?} has no '{}' marker line",
                    template, config.pages.marker
                ));
                "Marker missing"
            }
            Err(_) => "Missing",
        };
        checks.push((format!("{} template", page.title()), status.to_string()));
    }

    if config.results.dir.exists() {
        checks.push(("Results directory".to_string(), "Exists".to_string()));
    } else {
        checks.push(("Results directory".to_string(), "Not created yet".to_string()));
    }

    if let Some(base_url) = &config.results.base_url {
        checks.push(("Results source".to_string(), base_url.clone()));
    }

    if std::env::var(&config.bot.token_env).is_ok() {
        checks.push(("Bot token".to_string(), "Configured".to_string()));
    } else {
        checks.push(("Bot token".to_string(), "Not configured".to_string()));
    }

    match format {
        OutputFormat::Text => {
            println!("EduGuide System Diagnostics");
            println!("===========================");
            println!();

            println!("System Checks:");
            for (check, status) in &checks {
                println!("  {:<28} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_profile_inline_and_file() {
        let raw = r#"{"location":"Any","max_budget":800,"core_field":"ច្បាប់","career_goal":"អ្នកច្បាប់","english_proficiency":4}"#;
        let inline = read_profile(raw).unwrap();
        assert_eq!(inline.max_budget, 800);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, raw).unwrap();
        assert_eq!(read_profile(path.to_str().unwrap()).unwrap(), inline);
    }

    #[test]
    fn test_read_profile_rejects_garbage() {
        assert!(read_profile("{\"location\": 3}").is_err());
    }

    #[tokio::test]
    async fn test_recommend_stores_document() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default_config();
        config.dataset.path = dir.path().join("missing.json");
        config.results.dir = dir.path().join("data");

        let raw = r#"{"location":"Any","max_budget":800,"core_field":"ច្បាប់","career_goal":"អ្នកច្បាប់","english_proficiency":4}"#;
        handle_recommend(raw, Some("fixed_id".to_string()), &config, OutputFormat::Json)
            .await
            .unwrap();

        let store = ResultStore::new(&config.results.dir);
        let document = store.get("fixed_id").unwrap();
        assert!(document.recommendations.is_empty());
        assert_eq!(document.user_profile.unwrap().location.as_deref(), Some("Any"));
    }

    #[tokio::test]
    async fn test_estimate_unknown_institution_fails() {
        let mut config = Config::default_config();
        config.dataset.path = "/definitely/not/here.json".into();
        let args = EstimateArgs {
            institution: 42,
            ..Default::default()
        };
        assert!(handle_estimate(args, &config, OutputFormat::Text).await.is_err());
    }

    #[tokio::test]
    async fn test_doctor_reports_without_failing() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default_config();
        config.dataset.path = dir.path().join("data.json");
        config.pages.template_dir = dir.path().to_path_buf();
        config.results.dir = dir.path().join("data");
        assert!(handle_doctor(&config, OutputFormat::Json).await.is_ok());
    }
}
