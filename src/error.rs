//! Error type shared by the export operations.

use thiserror::Error;

/// Errors produced while exporting a record table.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The PDF backend rejected the document (fonts, images, layout).
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// The XLSX backend rejected the workbook.
    #[error("spreadsheet serialization failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// The supplied signature bitmap could not be interpreted as an image.
    #[error("invalid signature image: {0}")]
    Signature(String),

    /// A record's value count does not match the table's column count.
    #[error("record has {actual} values but the table declares {expected} columns")]
    RowArity {
        /// Number of columns declared by the table.
        expected: usize,
        /// Number of values carried by the rejected record.
        actual: usize,
    },
}
