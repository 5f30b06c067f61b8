//! Export routines for raw-material consumption records.
//!
//! The crate takes an immutable [`Table`](model::Table) of consumption
//! records plus an optional freehand [`Signature`](signature::Signature)
//! bitmap and renders two independent artifacts: a single-sheet XLSX
//! spreadsheet and a paginated A4 PDF report with the signature embedded on
//! the final page.

pub mod document;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod renderer;
pub mod signature;
pub mod spreadsheet;

pub use error::RenderError;
pub use model::{consumption_columns, Record, Table, Value};
pub use renderer::ReportRenderer;
pub use signature::Signature;
