//! XLSX serialization of a record table.

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::RenderError;
use crate::model::{Table, Value};

const SHEET_NAME: &str = "Registros";

/// Returns the sheet contents as strings: the header row followed by one
/// row per record, in the table's declared column order.
///
/// This is the write plan behind [`export_spreadsheet`]; keeping it separate
/// makes the row/column contract testable without parsing XLSX output.
pub fn sheet_rows(table: &Table) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(table.len() + 1);
    rows.push(table.columns().to_vec());
    for record in table.rows() {
        rows.push(record.values().iter().map(ToString::to_string).collect());
    }
    rows
}

/// Serializes the table into a single-sheet XLSX byte stream.
///
/// The header row carries the column names in declared order (bold); each
/// record becomes one row below it.  Integer values are written as numbers,
/// everything else as strings; missing values become empty cells.  A table
/// with zero rows yields a header-only sheet.
pub fn export_spreadsheet(table: &Table) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (index, record) in table.rows().iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, value) in record.values().iter().enumerate() {
            let col = col as u16;
            match value {
                Value::Integer(number) => {
                    worksheet.write_number(row, col, *number as f64)?;
                }
                Value::Missing => {}
                other => {
                    worksheet.write_string(row, col, &other.to_string())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}
