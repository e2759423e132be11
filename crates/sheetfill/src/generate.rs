//! Producing filled documents from a template on disk
//!
//! The template is only ever read. Each generation fills a fresh in-memory
//! copy and, when an output directory is configured, persists it under a
//! request-scoped name so concurrent requests never share a file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use sheetfill_core::FieldBindings;
use sheetfill_xlsx::Document;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::fill::{DocumentFillExt, FillOptions, FillReport};

/// Where templates come from and where generated files go
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    /// Path of the template package
    pub template: PathBuf,
    /// Directory generated files are written to; `None` keeps output in memory
    #[cfg_attr(feature = "serde", serde(default))]
    pub output_dir: Option<PathBuf>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: FillOptions,
}

impl GeneratorConfig {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output_dir: None,
            options: FillOptions::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_options(mut self, options: FillOptions) -> Self {
        self.options = options;
        self
    }
}

/// A filled document
#[derive(Debug, Clone)]
pub struct Generated {
    /// The saved package
    pub bytes: Vec<u8>,
    /// Where the package was written, if an output directory is configured
    pub output_path: Option<PathBuf>,
    /// File name used (or that would be used) for the output
    pub file_name: String,
    pub request_id: String,
    pub report: FillReport,
}

/// Fills copies of one template
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    config: GeneratorConfig,
}

impl TemplateGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Fill the template with `bindings`
    ///
    /// `request_id` names the output; a random UUID is used when none is
    /// given. Fails with [`Error::TemplateNotFound`] when the template file
    /// is missing.
    pub fn generate(&self, bindings: &FieldBindings, request_id: Option<&str>) -> Result<Generated> {
        let request_id = match request_id {
            Some(id) => validate_request_id(id)?,
            None => Uuid::new_v4().to_string(),
        };

        let template = &self.config.template;
        if !template.is_file() {
            return Err(Error::TemplateNotFound(template.clone()));
        }

        let mut doc = Document::open(template)?;
        let report = doc.fill(bindings, &self.config.options)?;
        let bytes = doc.to_bytes()?;

        let file_name = output_file_name(&Local::now(), &request_id);
        let output_path = match &self.config.output_dir {
            Some(dir) => Some(persist(dir, &file_name, &bytes)?),
            None => None,
        };

        log::info!(
            "generated {} ({} written, {} blank, {} skipped)",
            file_name,
            report.written.len(),
            report.blank.len(),
            report.skipped.len()
        );

        Ok(Generated {
            bytes,
            output_path,
            file_name,
            request_id,
            report,
        })
    }
}

/// Output file name: `Excel_<yyyyMMdd_HHmmss>_<request-id>.xlsx`
pub fn output_file_name<Tz: TimeZone>(timestamp: &DateTime<Tz>, request_id: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Excel_{}_{}.xlsx",
        timestamp.format("%Y%m%d_%H%M%S"),
        request_id
    )
}

fn validate_request_id(id: &str) -> Result<String> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id.to_string())
    } else {
        Err(Error::InvalidRequestId(id.to_string()))
    }
}

fn persist(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
