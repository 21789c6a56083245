//! Document output
//!
//! This module handles everything specific to the output document:
//! - The sequential-page `DocumentWriter` contract
//! - Content stream operators for placed images and grid lines
//! - The lopdf-backed PDF writer

mod ops;
mod pdf;
mod writer;

pub use ops::{image_placement_ops, line_ops};
pub use pdf::PdfDocumentWriter;
pub use writer::DocumentWriter;
