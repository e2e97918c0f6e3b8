//! CSV import of dimension catalogs and scored question sheets, plus the standard catalog.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::readiness::DimensionCatalogEntry;
use crate::scoring::{DimensionDefinition, QuestionScore, ScoringInputError, DEFAULT_SEVERITY};

use parser::{parse_rows, DimensionRow, QuestionRow};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidQuestion {
        row: usize,
        source: ScoringInputError,
    },
    InvalidWeight {
        key: String,
        weight: f64,
    },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog file: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::InvalidQuestion { row, source } => {
                write!(f, "question sheet row {}: {}", row, source)
            }
            CatalogImportError::InvalidWeight { key, weight } => write!(
                f,
                "dimension {} has weight {} outside [0, 1]",
                key, weight
            ),
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidQuestion { source, .. } => Some(source),
            CatalogImportError::InvalidWeight { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn dimensions_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<DimensionCatalogEntry>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::dimensions_from_reader(file)
    }

    /// Rows without an `order_index` keep their position in the sheet.
    pub fn dimensions_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<DimensionCatalogEntry>, CatalogImportError> {
        let rows: Vec<DimensionRow> = parse_rows(reader)?;

        rows.into_iter()
            .enumerate()
            .map(|(position, row)| {
                if !row.weight.is_finite() || !(0.0..=1.0).contains(&row.weight) {
                    return Err(CatalogImportError::InvalidWeight {
                        key: row.key,
                        weight: row.weight,
                    });
                }

                Ok(DimensionCatalogEntry {
                    order_index: row.order_index.unwrap_or(position as u32),
                    is_active: row.is_active.unwrap_or(true),
                    key: row.key,
                    display_name: row.display_name,
                    weight: row.weight,
                })
            })
            .collect()
    }

    pub fn questions_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<QuestionScore>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::questions_from_reader(file)
    }

    /// Blank severity falls back to the default, blank coverage to 0, and `answered` to
    /// whether a coverage was given. Out-of-range values are rejected.
    pub fn questions_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<QuestionScore>, CatalogImportError> {
        let rows: Vec<QuestionRow> = parse_rows(reader)?;

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                let question = QuestionScore {
                    is_answered: row.answered.unwrap_or(row.coverage.is_some()),
                    coverage: row.coverage.unwrap_or(0.0),
                    severity: row.severity.unwrap_or(DEFAULT_SEVERITY),
                    id: row.id,
                    text: row.text,
                    dimension_key: row.dimension_key,
                    persona: row.persona,
                };

                question
                    .validate()
                    .map_err(|source| CatalogImportError::InvalidQuestion {
                        row: index + 1,
                        source,
                    })?;
                Ok(question)
            })
            .collect()
    }
}

/// Active entries ordered by `order_index`; ties keep catalog order.
pub fn active_definitions(entries: &[DimensionCatalogEntry]) -> Vec<DimensionDefinition> {
    let mut active: Vec<&DimensionCatalogEntry> =
        entries.iter().filter(|entry| entry.is_active).collect();
    active.sort_by_key(|entry| entry.order_index);
    active
        .into_iter()
        .map(DimensionCatalogEntry::definition)
        .collect()
}

/// The eleven readiness dimensions shipped with the product. Weights sum to 1.
pub fn standard_dimensions() -> Vec<DimensionCatalogEntry> {
    [
        ("arch_sec", "Architecture & Security", 0.15),
        ("devops_iac", "DevOps & Infrastructure as Code", 0.12),
        ("quality_test", "Quality & Testing", 0.10),
        ("finance", "Finance & Cost Management", 0.10),
        ("strategy", "Strategy & Vision", 0.08),
        ("requirements", "Requirements & Specifications", 0.08),
        ("data_ai", "Data & AI", 0.08),
        ("privacy_legal", "Privacy & Legal", 0.08),
        ("service_ops", "Service Operations", 0.08),
        ("compliance_policy", "Compliance & Policy", 0.07),
        ("people_change", "People & Change Management", 0.06),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (key, display_name, weight))| DimensionCatalogEntry {
        key: key.to_string(),
        display_name: display_name.to_string(),
        weight,
        order_index: index as u32 + 1,
        is_active: true,
    })
    .collect()
}
