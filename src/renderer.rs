//! Public export surface.

use chrono::{Local, NaiveDate};
use log::debug;

use crate::document;
use crate::error::RenderError;
use crate::layout::ColumnWeights;
use crate::model::Table;
use crate::signature::Signature;
use crate::spreadsheet;

const DEFAULT_TITLE: &str = "Informe de Consumo de Materia Prima";

/// Renders a record table into the two export artifacts.
///
/// The renderer owns only configuration; each export call borrows its
/// inputs, allocates fresh output buffers and leaves no state behind, so
/// one instance can serve any number of independent calls.
#[derive(Clone, Debug)]
pub struct ReportRenderer {
    title: String,
    generation_date: NaiveDate,
    weights: ColumnWeights,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            generation_date: Local::now().date_naive(),
            weights: ColumnWeights::consumption(),
        }
    }
}

impl ReportRenderer {
    /// Creates a renderer with the consumption-report defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title and returns the updated renderer.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Overrides the generation date (defaults to today) and returns the
    /// updated renderer.  Fixing the date makes document output reproducible.
    pub fn with_generation_date(mut self, date: NaiveDate) -> Self {
        self.generation_date = date;
        self
    }

    /// Replaces the column weight table and returns the updated renderer.
    pub fn with_column_weights(mut self, weights: ColumnWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Returns the configured generation date.
    pub fn generation_date(&self) -> NaiveDate {
        self.generation_date
    }

    /// Serializes the table into a single-sheet XLSX byte stream.
    ///
    /// Header row first, one row per record below it, no index column.
    /// An empty table produces a header-only sheet.
    pub fn export_spreadsheet(&self, table: &Table) -> Result<Vec<u8>, RenderError> {
        debug!(
            "exporting spreadsheet: {} rows, {} columns",
            table.len(),
            table.columns().len()
        );
        spreadsheet::export_spreadsheet(table)
    }

    /// Renders the table and the optional signature into a paginated A4
    /// PDF byte stream.
    ///
    /// Fails when the signature image cannot be embedded; an empty table is
    /// not an error and yields a header-only document.
    pub fn export_document(
        &self,
        table: &Table,
        signature: Option<&Signature>,
    ) -> Result<Vec<u8>, RenderError> {
        debug!(
            "exporting document: {} rows, signature: {}",
            table.len(),
            signature.is_some()
        );
        document::render_document(
            &self.title,
            self.generation_date,
            table,
            signature,
            &self.weights,
        )
    }

    /// Conventional file name for the spreadsheet artifact,
    /// `registros_consumo_YYYY-MM-DD.xlsx`.
    pub fn spreadsheet_file_name(&self) -> String {
        format!(
            "registros_consumo_{}.xlsx",
            self.generation_date.format("%Y-%m-%d")
        )
    }

    /// Conventional file name for the document artifact,
    /// `informe_consumo_YYYY-MM-DD.pdf`.
    pub fn document_file_name(&self) -> String {
        format!(
            "informe_consumo_{}.pdf",
            self.generation_date.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ReportRenderer;
    use chrono::NaiveDate;

    #[test]
    fn file_names_embed_the_generation_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let renderer = ReportRenderer::new().with_generation_date(date);
        assert_eq!(
            renderer.spreadsheet_file_name(),
            "registros_consumo_2024-06-01.xlsx"
        );
        assert_eq!(
            renderer.document_file_name(),
            "informe_consumo_2024-06-01.pdf"
        );
    }
}
