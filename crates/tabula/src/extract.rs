//! Extraction options and top-level orchestration.

use tabula_core::config::ExtractionConfig;
use tabula_core::detect::detect_table_regions;
use tabula_core::error::{ExtractError, Result};
use tabula_core::geometry::Rect;
use tabula_core::page::Page;
use tabula_core::table::Table;
use tabula_core::{lattice, stream};
use tracing::info;

use crate::Pdf;

/// Which reconstruction algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Ruling-driven reconstruction.
    Lattice,
    /// Text-gap-driven reconstruction.
    Stream,
    /// Lattice first, stream when lattice yields no tables.
    #[default]
    Auto,
}

/// Options for a top-level extraction call.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    /// 1-based page numbers; all pages when absent.
    pub pages: Option<Vec<usize>>,
    /// Reconstruction algorithm.
    pub method: Method,
    /// Restrict extraction to this page area.
    pub area: Option<Rect>,
    /// Explicit column x-positions (stream extraction).
    pub columns: Option<Vec<f64>>,
    /// Detect table regions first and extract per region.
    pub guess: bool,
    /// Password for encrypted documents.
    pub password: Option<String>,
}

impl ExtractionOptions {
    /// Check option consistency.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_some() && self.method == Method::Lattice {
            return Err(ExtractError::InvalidOptions(
                "columns apply to stream extraction only".into(),
            ));
        }
        if self.guess && self.area.is_some() {
            return Err(ExtractError::InvalidOptions(
                "guess and area are mutually exclusive".into(),
            ));
        }
        if let Some(pages) = &self.pages {
            if pages.iter().any(|&n| n == 0) {
                return Err(ExtractError::InvalidOptions(
                    "page numbers are 1-based".into(),
                ));
            }
        }
        if let Some(columns) = &self.columns {
            if columns.iter().any(|c| !c.is_finite()) {
                return Err(ExtractError::InvalidOptions(
                    "column positions must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Extract tables from a PDF file.
pub fn extract(path: impl AsRef<std::path::Path>, options: &ExtractionOptions) -> Result<Vec<Table>> {
    options.validate()?;
    let pdf = Pdf::open(path, options.password.as_deref())?;
    extract_document(&pdf, options)
}

/// Extract tables from in-memory PDF bytes.
pub fn extract_bytes(bytes: &[u8], options: &ExtractionOptions) -> Result<Vec<Table>> {
    options.validate()?;
    let pdf = Pdf::open_bytes(bytes, options.password.as_deref())?;
    extract_document(&pdf, options)
}

/// Extract tables from an opened document.
///
/// Pages are processed independently and reported in page order; within
/// a page, tables come back in reading order.
pub fn extract_document(pdf: &Pdf, options: &ExtractionOptions) -> Result<Vec<Table>> {
    options.validate()?;
    let numbers: Vec<usize> = match &options.pages {
        Some(pages) => pages.clone(),
        None => (1..=pdf.page_count()).collect(),
    };

    let per_page = collect_pages(pdf, &numbers, options)?;
    let tables: Vec<Table> = per_page.into_iter().flatten().collect();
    info!(tables = tables.len(), pages = numbers.len(), "extraction finished");
    Ok(tables)
}

#[cfg(not(feature = "parallel"))]
fn collect_pages(
    pdf: &Pdf,
    numbers: &[usize],
    options: &ExtractionOptions,
) -> Result<Vec<Vec<Table>>> {
    numbers
        .iter()
        .map(|&n| tables_for_page(pdf, n, options))
        .collect()
}

#[cfg(feature = "parallel")]
fn collect_pages(
    pdf: &Pdf,
    numbers: &[usize],
    options: &ExtractionOptions,
) -> Result<Vec<Vec<Table>>> {
    use rayon::prelude::*;
    numbers
        .par_iter()
        .map(|&n| tables_for_page(pdf, n, options))
        .collect()
}

fn tables_for_page(pdf: &Pdf, number: usize, options: &ExtractionOptions) -> Result<Vec<Table>> {
    let page = pdf.page(number)?;
    let config = pdf.config();

    let scoped = match options.area {
        Some(area) => page.get_area(area),
        None => page,
    };

    let mut tables = if options.guess {
        let regions = detect_table_regions(&scoped, config);
        regions
            .into_iter()
            .flat_map(|region| run_method(&scoped.get_area(region), options, config))
            .collect()
    } else {
        run_method(&scoped, options, config)
    };

    tables.sort_by(|a, b| a.bbox().reading_order(&b.bbox()));
    Ok(tables)
}

fn run_method(page: &Page, options: &ExtractionOptions, config: &ExtractionConfig) -> Vec<Table> {
    match options.method {
        Method::Lattice => lattice::extract_tables(page, config),
        Method::Stream => stream_tables(page, options, config),
        Method::Auto => {
            let tables = lattice::extract_tables(page, config);
            if tables.is_empty() {
                stream_tables(page, options, config)
            } else {
                tables
            }
        }
    }
}

fn stream_tables(
    page: &Page,
    options: &ExtractionOptions,
    config: &ExtractionConfig,
) -> Vec<Table> {
    stream::extract_table(page, options.columns.as_deref(), config)
        .into_iter()
        .collect()
}
