use std::error::Error;

use informe_consumo::{Record, ReportRenderer, Signature, Table, Value};

fn main() -> Result<(), Box<dyn Error>> {
    let mut table = Table::consumption();
    for index in 0..60 {
        let record = Record::default()
            .with_value(format!("E-{:04}", index))
            .with_value(format!("R-{:04}", index % 7))
            .with_value(format!("OP-{}", 2400 + index))
            .with_value(if index % 3 == 0 {
                "Parte fabricada"
            } else {
                "Materia prima"
            })
            .with_value(format!("MP-{:03}", index % 25))
            .with_value((index as i64 % 50) + 1)
            .with_value("kg")
            .with_value(Value::Missing)
            .with_value(chrono::Local::now().date_naive());
        table.push_row(record)?;
    }

    let renderer = ReportRenderer::new();

    let xlsx = renderer.export_spreadsheet(&table)?;
    let xlsx_name = renderer.spreadsheet_file_name();
    std::fs::write(&xlsx_name, &xlsx)?;
    println!("Generated {} ({} bytes)", xlsx_name, xlsx.len());

    let pdf = renderer.export_document(&table, Some(&sample_signature()?))?;
    let pdf_name = renderer.document_file_name();
    std::fs::write(&pdf_name, &pdf)?;
    println!("Generated {} ({} bytes)", pdf_name, pdf.len());

    Ok(())
}

/// Fakes a freehand signature: a sine stroke on a transparent canvas, the
/// same buffer shape the drawing widget produces.
fn sample_signature() -> Result<Signature, Box<dyn Error>> {
    let (width, height) = (300u32, 150u32);
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for x in 0..width {
        let phase = x as f64 / width as f64 * std::f64::consts::TAU;
        let y = (height as f64 / 2.0 + phase.sin() * height as f64 / 4.0) as u32;
        for dy in 0..2u32.min(height - y) {
            let offset = (((y + dy) * width + x) * 4) as usize;
            pixels[offset + 3] = 255;
        }
    }
    Ok(Signature::from_rgba(width, height, pixels)?)
}
