//! Extract tables from PDF documents.
//!
//! tabula-rs reconstructs tabular data from rendered PDF pages using two
//! algorithms: **lattice** extraction follows the ruling lines drawn as
//! cell borders, **stream** extraction infers columns from the gaps
//! between text. The default mode tries lattice first and falls back to
//! stream.
//!
//! # Example
//!
//! ```no_run
//! use tabula::{ExtractionOptions, extract};
//!
//! let tables = extract("report.pdf", &ExtractionOptions::default())?;
//! for table in &tables {
//!     for row in table.text_grid() {
//!         println!("{}", row.join("\t"));
//!     }
//! }
//! # Ok::<(), tabula::ExtractError>(())
//! ```
//!
//! Enable the `parallel` feature to process independent pages on worker
//! threads, and `serde` for serializable core types.

#![warn(missing_docs)]

/// Extraction options and orchestration.
pub mod extract;
/// Document opening and page assembly.
pub mod pdf;
/// Output writers.
pub mod writers;

pub use extract::{ExtractionOptions, Method, extract, extract_bytes, extract_document};
pub use pdf::{PagesIter, Pdf};
pub use writers::{OutputFormat, write_tables};

pub use tabula_core::config::ExtractionConfig;
pub use tabula_core::error::{ExtractError, Result};
pub use tabula_core::geometry::Rect;
pub use tabula_core::page::Page;
pub use tabula_core::table::{Cell, ExtractionMethod, Table};
