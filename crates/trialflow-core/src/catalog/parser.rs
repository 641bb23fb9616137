//! Catalog parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema;

/// Errors that can occur when loading a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Catalog validation failed: {0}")]
    ValidationError(String),

    #[error("Catalog does not match schema: {0:?}")]
    SchemaError(Vec<String>),
}

/// One fixed case scenario: clinician-facing text paired with an AI finding.
///
/// Field names follow the camelCase convention of authored catalog files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseVignette {
    /// Unique identifier (e.g., "baseline_pna")
    pub id: String,

    /// Patient and study description shown to the participant
    pub case_text: String,

    /// The AI-generated finding, withheld until revealed
    pub ai_text: String,

    /// Model-reported confidence, 0–100
    pub ai_confidence: u8,

    /// Study image location, resolved by the rendering layer
    #[serde(default)]
    pub image_url: Option<String>,

    /// Alt text for the study image
    #[serde(default)]
    pub image_alt: Option<String>,
}

/// A fixed, ordered, read-only sequence of vignettes.
///
/// Immutable for the lifetime of the process; its length defines the trial
/// count and the denominator for progress display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseCatalog {
    /// Version of this catalog (semver)
    pub catalog_version: String,

    /// Human-readable name
    pub name: String,

    /// Detailed description
    #[serde(default)]
    pub description: Option<String>,

    /// The vignettes, in presentation order
    cases: Vec<CaseVignette>,
}

impl CaseCatalog {
    /// Parse a catalog from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: CaseCatalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from JSON string.
    ///
    /// JSON catalogs are additionally checked against the embedded schema
    /// before deserialization.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        schema::validate_catalog_schema(&value).map_err(CatalogError::SchemaError)?;
        let catalog: CaseCatalog = serde_json::from_value(value)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Number of trials this catalog defines.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// A valid catalog always has at least one case; this exists for the
    /// conventional pairing with `len`.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Index-bounded read access to a vignette.
    pub fn get(&self, index: usize) -> Option<&CaseVignette> {
        self.cases.get(index)
    }

    /// Iterate over the vignettes in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &CaseVignette> {
        self.cases.iter()
    }

    /// Validate the catalog structure.
    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.is_empty() {
            return Err(CatalogError::ValidationError(
                "catalog name must not be empty".to_string(),
            ));
        }

        if self.cases.is_empty() {
            return Err(CatalogError::ValidationError(
                "catalog must contain at least one case".to_string(),
            ));
        }

        for case in &self.cases {
            if case.id.trim().is_empty() {
                return Err(CatalogError::ValidationError(
                    "case id must not be blank".to_string(),
                ));
            }
            if case.case_text.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "case '{}' has empty case text",
                    case.id
                )));
            }
            if case.ai_text.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "case '{}' has empty AI finding text",
                    case.id
                )));
            }
            if case.ai_confidence > 100 {
                return Err(CatalogError::ValidationError(format!(
                    "case '{}' has aiConfidence {} outside 0-100",
                    case.id, case.ai_confidence
                )));
            }
        }

        self.validate_unique_ids()?;

        Ok(())
    }

    /// Ensure case IDs are unique across the catalog.
    fn validate_unique_ids(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();

        for case in &self.cases {
            if !seen.insert(&case.id) {
                return Err(CatalogError::ValidationError(format!(
                    "Duplicate case ID: {}",
                    case.id
                )));
            }
        }

        Ok(())
    }
}
