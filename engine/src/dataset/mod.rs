//! Institution dataset loading and page injection
//!
//! Every page works from one JSON array of institution records. The array is
//! baked into each page at build time by replacing a marker line in the page
//! template with a `const universityData = [...];` declaration.
//!
//! A missing or unreadable dataset is never fatal: it is logged and the pages
//! render their "no results" placeholder. Individual malformed records are
//! skipped so one bad entry does not blank the whole grid.

use sdk::errors::AppError;
use sdk::types::{Institution, InstitutionId};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the page-global variable holding the dataset
pub const DATASET_GLOBAL: &str = "universityData";

/// Read-only set of institution records with an id index
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Institution>,
    by_id: HashMap<InstitutionId, usize>,
}

impl Dataset {
    /// Build a dataset from records already in memory
    ///
    /// When ids repeat, lookups resolve to the first record with that id.
    pub fn from_records(records: Vec<Institution>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            by_id.entry(record.id).or_insert(index);
        }
        Self { records, by_id }
    }

    /// Load the dataset file, tolerating a missing or malformed file
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(dataset) => {
                    info!("Loaded {} institutions from {}", dataset.len(), path.display());
                    dataset
                }
                Err(e) => {
                    warn!("Error decoding dataset {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Dataset not found at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a JSON array of records, skipping entries that do not decode
    pub fn from_json_str(contents: &str) -> Result<Self, AppError> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(contents)
            .map_err(|e| AppError::Dataset(format!("expected a JSON array: {}", e)))?;

        let mut records = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<Institution>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping dataset entry {}: {}", index, e),
            }
        }

        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[Institution] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id
    pub fn get(&self, id: InstitutionId) -> Option<&Institution> {
        self.by_id.get(&id).map(|&index| &self.records[index])
    }

    /// Distinct non-empty location tags, sorted
    pub fn locations(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.location.as_deref())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Replace the marker line of a page template with the dataset declaration
///
/// Non-ASCII text is kept as-is. `</` is escaped so that record text cannot
/// close the surrounding `<script>` element.
pub fn inject_into_template(
    template: &str,
    records: &[Institution],
    marker: &str,
) -> Result<String, AppError> {
    if !template.contains(marker) {
        return Err(AppError::Template(format!(
            "marker '{}' not found in template",
            marker
        )));
    }

    let json = serde_json::to_string(records)?.replace("</", "<\\/");
    let declaration = format!("const {} = {};", DATASET_GLOBAL, json);

    Ok(template.replace(marker, &declaration))
}

/// The data-driven pages built from templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Directory grid
    Browser,
    /// Cost estimator
    Calculator,
    /// Intake wizard
    Quiz,
}

impl PageKind {
    pub const ALL: [PageKind; 3] = [Self::Browser, Self::Calculator, Self::Quiz];

    /// Directory name of the page under the template and output roots
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Calculator => "calculator",
            Self::Quiz => "quiz",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Browser => "University Catalog",
            Self::Calculator => "Cost Calculator",
            Self::Quiz => "Student DNA Quiz",
        }
    }
}

/// Outcome of building one page
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Built(PathBuf),
    SkippedMissingTemplate(PathBuf),
}

/// Inject the dataset into every page template under `template_dir`
///
/// Reads `<template_dir>/<page>/index.template.html` and writes
/// `<output_dir>/<page>/index.html`. Pages whose template is missing are
/// skipped with a warning; any other failure aborts the build.
pub fn build_pages(
    dataset: &Dataset,
    template_dir: &Path,
    output_dir: &Path,
    marker: &str,
) -> Result<Vec<(PageKind, BuildOutcome)>, AppError> {
    let mut outcomes = Vec::with_capacity(PageKind::ALL.len());

    for page in PageKind::ALL {
        let template_path = template_dir
            .join(page.dir_name())
            .join("index.template.html");

        if !template_path.exists() {
            warn!(
                "Template file not found, skipping build for {}: {}",
                page.title(),
                template_path.display()
            );
            outcomes.push((page, BuildOutcome::SkippedMissingTemplate(template_path)));
            continue;
        }

        debug!("Building {}...", page.title());
        let template = fs::read_to_string(&template_path)?;
        let html = inject_into_template(&template, dataset.records(), marker)?;

        let page_dir = output_dir.join(page.dir_name());
        fs::create_dir_all(&page_dir)?;
        let output_path = page_dir.join("index.html");
        fs::write(&output_path, html)?;

        info!("Built {}: {}", page.title(), output_path.display());
        outcomes.push((page, BuildOutcome::Built(output_path)));
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "name_km": "សាកលវិទ្យាល័យភូមិន្ទភ្នំពេញ", "name_en": "Royal University of Phnom Penh", "location": "Phnom Penh"},
        {"id": 2, "name_en": "University of Battambang", "location": "Battambang"},
        {"id": "broken"},
        {"id": 3, "name_en": "Institute of Technology", "location": "Phnom Penh"}
    ]"#;

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get(2).unwrap().display_name(), "University of Battambang");
        assert!(dataset.get(99).is_none());
    }

    #[test]
    fn test_non_array_is_an_error() {
        assert!(matches!(
            Dataset::from_json_str(r#"{"id": 1}"#),
            Err(AppError::Dataset(_))
        ));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dataset = Dataset::load(Path::new("/definitely/not/here.json"));
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_locations_are_distinct_and_sorted() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.locations(), vec!["Battambang", "Phnom Penh"]);
    }

    #[test]
    fn test_inject_keeps_khmer_and_escapes_script_close() {
        let mut records = Dataset::from_json_str(SAMPLE).unwrap().records().to_vec();
        records[1].name_en = Some("</script><b>".to_string());

        let html = inject_into_template(
            "<script>\n// %%UNIVERSITY_DATA%%\n</script>",
            &records,
            "// %%UNIVERSITY_DATA%%",
        )
        .unwrap();

        assert!(html.contains("const universityData = ["));
        assert!(html.contains("សាកលវិទ្យាល័យភូមិន្ទភ្នំពេញ"));
        assert!(html.contains(r"<\/script><b>"));
        assert!(!html.contains("%%UNIVERSITY_DATA%%"));
    }

    #[test]
    fn test_inject_without_marker_fails() {
        let result = inject_into_template("<html></html>", &[], "// %%UNIVERSITY_DATA%%");
        assert!(matches!(result, Err(AppError::Template(_))));
    }
}
