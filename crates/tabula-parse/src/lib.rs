//! PDF parsing backend and content stream interpreter for tabula-rs.
//!
//! Implements the PDF collaborator side of the extraction pipeline: it
//! opens documents via [`lopdf`], enforces the password contract, and
//! interprets page content streams — forwarding path-painting events to
//! the core graphics-stream receiver and resolving text operators into
//! positioned glyph records.
//!
//! # Key types
//!
//! - [`PdfDocument`] — Parsed document with per-page metadata access
//! - [`interpret_page`] — Content-stream interpreter entry point
//! - [`PageSpace`] — Device-to-page coordinate projection
//! - [`FontInfo`] — Width metrics and text decoding for one font
//! - [`BackendError`] — Parse-layer errors, convertible to the core kinds

#![warn(missing_docs)]

/// Document access on top of lopdf.
pub mod document;
/// Parse-layer error types.
pub mod error;
/// Font metrics and text decoding.
pub mod fonts;
/// Content-stream interpreter.
pub mod interpreter;

pub use document::PdfDocument;
pub use error::BackendError;
pub use fonts::FontInfo;
pub use interpreter::{PageSpace, interpret_page};
pub use tabula_core;
