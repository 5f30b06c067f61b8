use chrono::NaiveDate;
use informe_consumo::layout::{truncate_to_width, ELLIPSIS};
use informe_consumo::{fonts, Record, ReportRenderer, Signature, Table, Value};
use sha2::{Digest, Sha256};

fn fonts_ready(test_name: &str) -> bool {
    if fonts::default_fonts_available() {
        true
    } else {
        eprintln!(
            "Skipping {}: no usable fonts. Set INFORME_FONTS_DIR or install DejaVu Sans.",
            test_name
        );
        false
    }
}

fn fixed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

fn renderer() -> ReportRenderer {
    ReportRenderer::new().with_generation_date(fixed_date())
}

fn sample_table(rows: usize) -> Table {
    let mut table = Table::consumption();
    for index in 0..rows {
        let record = Record::default()
            .with_value(format!("E-{:04}", index))
            .with_value(format!("R-{:04}", index))
            .with_value(format!("OP-{}", 1000 + index))
            .with_value("Materia prima")
            .with_value(format!("MP-{:03}", index % 40))
            .with_value((index as i64 % 90) + 1)
            .with_value("kg")
            .with_value(Value::Missing)
            .with_value(fixed_date());
        table.push_row(record).expect("schema-aligned record");
    }
    table
}

/// Synthetic freehand stroke: black diagonal on a transparent background,
/// matching what the capture surface hands over.
fn sample_signature() -> Signature {
    let (width, height) = (200u32, 120u32);
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for x in 0..width.min(height) {
        let y = x * height / width;
        let offset = ((y * width + x) * 4) as usize;
        pixels[offset + 3] = 255;
    }
    Signature::from_rgba(width, height, pixels).expect("well-formed RGBA buffer")
}

fn page_count(bytes: &[u8]) -> usize {
    let document = lopdf::Document::load_mem(bytes).expect("rendered PDF parses");
    document.get_pages().len()
}

fn is_image_stream(object: &lopdf::Object) -> bool {
    match object {
        lopdf::Object::Stream(stream) => matches!(
            stream.dict.get(b"Subtype"),
            Ok(lopdf::Object::Name(name)) if name == b"Image"
        ),
        _ => false,
    }
}

fn contains_image_xobject(bytes: &[u8]) -> bool {
    let document = lopdf::Document::load_mem(bytes).expect("rendered PDF parses");
    document.objects.values().any(is_image_stream)
}

/// Page numbers whose XObject resources include an image stream.
fn pages_with_image(bytes: &[u8]) -> Vec<u32> {
    let document = lopdf::Document::load_mem(bytes).expect("rendered PDF parses");
    let mut numbers = Vec::new();
    for (number, page_id) in document.get_pages() {
        let (inline, referenced) = document.get_page_resources(page_id);
        let mut resources: Vec<&lopdf::Dictionary> = inline.into_iter().collect();
        for id in referenced {
            if let Ok(dict) = document.get_object(id).and_then(lopdf::Object::as_dict) {
                resources.push(dict);
            }
        }
        let has_image = resources.iter().any(|dict| {
            let xobjects = match dict.get(b"XObject") {
                Ok(lopdf::Object::Dictionary(xobjects)) => xobjects,
                Ok(lopdf::Object::Reference(id)) => {
                    match document.get_object(*id).and_then(lopdf::Object::as_dict) {
                        Ok(xobjects) => xobjects,
                        Err(_) => return false,
                    }
                }
                _ => return false,
            };
            xobjects.iter().any(|(_, entry)| match entry {
                lopdf::Object::Reference(id) => document
                    .get_object(*id)
                    .map(is_image_stream)
                    .unwrap_or(false),
                other => is_image_stream(other),
            })
        });
        if has_image {
            numbers.push(number);
        }
    }
    numbers
}

fn operand_to_f64(operand: &lopdf::Object) -> Option<f64> {
    match operand {
        lopdf::Object::Integer(value) => Some(*value as f64),
        lopdf::Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// Blanks the timestamps and identifiers printpdf stamps freshly into every
/// render, so byte comparison only sees the drawn content. Each field is an
/// opening tag and the byte that terminates its value.
fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    const VOLATILE_FIELDS: &[(&[u8], u8)] = &[
        (b"/CreationDate(", b')'),
        (b"/ModDate(", b')'),
        (b"/ID[", b']'),
        (b"<xmp:CreateDate>", b'<'),
        (b"<xmp:ModifyDate>", b'<'),
        (b"<xmp:MetadataDate>", b'<'),
        (b"<xmpMM:DocumentID>", b'<'),
        (b"<xmpMM:InstanceID>", b'<'),
    ];

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    let mut normalized = bytes.to_vec();
    for &(tag, terminator) in VOLATILE_FIELDS {
        let mut from = 0;
        while let Some(found) = find(&normalized[from..], tag) {
            let mut cursor = from + found + tag.len();
            while cursor < normalized.len() && normalized[cursor] != terminator {
                // Keep the hex-string delimiters of the /ID array intact.
                if !matches!(normalized[cursor], b'<' | b'>') {
                    normalized[cursor] = b'0';
                }
                cursor += 1;
            }
            from = cursor;
        }
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn empty_table_renders_header_only_document() {
    if !fonts_ready("empty_table_renders_header_only_document") {
        return;
    }

    let bytes = renderer()
        .export_document(&Table::consumption(), None)
        .expect("empty table is not an error");
    assert!(!bytes.is_empty());
    assert_eq!(page_count(&bytes), 1);
    assert!(!contains_image_xobject(&bytes));
}

#[test]
fn rendering_is_deterministic() {
    if !fonts_ready("rendering_is_deterministic") {
        return;
    }

    let table = sample_table(30);
    let signature = sample_signature();
    let render = || {
        renderer()
            .export_document(&table, Some(&signature))
            .expect("render succeeds")
    };

    let bytes_a = render();
    let bytes_b = render();

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn signature_block_appears_only_when_supplied() {
    if !fonts_ready("signature_block_appears_only_when_supplied") {
        return;
    }

    let table = sample_table(5);
    let with_signature = renderer()
        .export_document(&table, Some(&sample_signature()))
        .expect("render succeeds");
    let without_signature = renderer()
        .export_document(&table, None)
        .expect("render succeeds");

    assert!(contains_image_xobject(&with_signature));
    assert!(!contains_image_xobject(&without_signature));
}

#[test]
fn signature_renders_on_empty_table() {
    if !fonts_ready("signature_renders_on_empty_table") {
        return;
    }

    let bytes = renderer()
        .export_document(&Table::consumption(), Some(&sample_signature()))
        .expect("render succeeds");
    assert_eq!(page_count(&bytes), 1);
    assert!(contains_image_xobject(&bytes));
}

#[test]
fn signature_appears_on_last_page_only_of_multipage_report() {
    if !fonts_ready("signature_appears_on_last_page_only_of_multipage_report") {
        return;
    }

    let bytes = renderer()
        .export_document(&sample_table(120), Some(&sample_signature()))
        .expect("render succeeds");
    let pages = page_count(&bytes);
    assert!(pages >= 2, "120 rows must span several pages, got {}", pages);
    assert_eq!(
        pages_with_image(&bytes),
        vec![pages as u32],
        "the signature image belongs on the final page and nowhere else"
    );
}

#[test]
fn signature_is_anchored_near_the_bottom_margin() {
    if !fonts_ready("signature_is_anchored_near_the_bottom_margin") {
        return;
    }

    let bytes = renderer()
        .export_document(&sample_table(1), Some(&sample_signature()))
        .expect("render succeeds");
    let document = lopdf::Document::load_mem(&bytes).expect("rendered PDF parses");
    let pages = document.get_pages();
    let (_, &page_id) = pages.iter().next_back().expect("at least one page");

    let content = document.get_page_content(page_id).expect("page content");
    let content = lopdf::content::Content::decode(&content).expect("content stream parses");

    // The image is placed by `cm` matrices composed inside the enclosing
    // `q`/`Q` scope (printpdf emits a translation followed by a scale); the
    // composed matrix's f entry is the y coordinate of the image's bottom
    // edge in pt at the moment of the `Do`.
    let identity = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut ctm = identity;
    let mut stack = Vec::new();
    let mut image_y = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "q" => stack.push(ctm),
            "Q" => ctm = stack.pop().unwrap_or(identity),
            "cm" => {
                let mut m = [0.0; 6];
                for (slot, operand) in m.iter_mut().zip(&operation.operands) {
                    *slot = operand_to_f64(operand).unwrap_or(0.0);
                }
                ctm = [
                    m[0] * ctm[0] + m[1] * ctm[2],
                    m[0] * ctm[1] + m[1] * ctm[3],
                    m[2] * ctm[0] + m[3] * ctm[2],
                    m[2] * ctm[1] + m[3] * ctm[3],
                    m[4] * ctm[0] + m[5] * ctm[2] + ctm[4],
                    m[4] * ctm[1] + m[5] * ctm[3] + ctm[5],
                ];
            }
            "Do" => image_y = Some(ctm[5]),
            _ => {}
        }
    }

    let y = image_y.expect("image placement found in content stream");
    // A4 bottom margin sits at 56.7pt; the block is reserved just above it
    // even though the table fills only a few lines of the page.
    assert!(
        y > 40.0 && y < 150.0,
        "signature image bottom at {:.1}pt, expected close to the bottom margin",
        y
    );
}

#[test]
fn page_break_boundary_is_exact() {
    if !fonts_ready("page_break_boundary_is_exact") {
        return;
    }

    let pages_for = |rows: usize| {
        let bytes = renderer()
            .export_document(&sample_table(rows), None)
            .expect("render succeeds");
        page_count(&bytes)
    };

    assert_eq!(pages_for(1), 1);
    let upper = 300;
    assert!(pages_for(upper) >= 2, "300 rows must overflow one page");

    // Binary search for the smallest row count needing a second page.
    let (mut low, mut high) = (1, upper);
    while low < high {
        let mid = (low + high) / 2;
        if pages_for(mid) >= 2 {
            high = mid;
        } else {
            low = mid + 1;
        }
    }

    let capacity = low - 1;
    assert!(capacity > 10, "page capacity {} suspiciously small", capacity);
    assert_eq!(pages_for(capacity), 1);
    assert_eq!(pages_for(capacity + 1), 2);
}

#[test]
fn mismatched_column_count_renders_with_equal_widths() {
    if !fonts_ready("mismatched_column_count_renders_with_equal_widths") {
        return;
    }

    let columns: Vec<String> = ["Item", "Cantidad", "Unidad"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
    let table = Table::new(columns)
        .with_row(Record::new(vec![
            Value::text("A1"),
            Value::Integer(5),
            Value::text("kg"),
        ]))
        .expect("matching arity");

    let bytes = renderer()
        .export_document(&table, None)
        .expect("non-standard schemas still render");
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn oversized_cells_render_without_error() {
    if !fonts_ready("oversized_cells_render_without_error") {
        return;
    }

    let mut table = Table::consumption();
    let record = Record::default()
        .with_value("E-1")
        .with_value("R-1")
        .with_value("OP-1000")
        .with_value("Materia prima")
        .with_value("MP-001")
        .with_value(12i64)
        .with_value("kg")
        .with_value("Observación desproporcionadamente larga que jamás cabría en su columna sin truncamiento")
        .with_value(fixed_date());
    table.push_row(record).expect("schema-aligned record");

    let bytes = renderer()
        .export_document(&table, None)
        .expect("long cells truncate instead of failing");
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn truncation_fits_real_font_metrics() {
    if !fonts_ready("truncation_fits_real_font_metrics") {
        return;
    }

    let family = fonts::default_font_family().expect("fonts resolved");
    let cache = genpdf::fonts::FontCache::new(family);
    let mut style = genpdf::style::Style::new();
    style.set_font_size(8);
    let measure = |text: &str| {
        let styled = genpdf::style::StyledString::new(text.to_owned(), style);
        let width: printpdf::Mm = styled.width(&cache).into();
        width.0
    };

    let column_width = 15.0;
    let text = "Materia prima compuesta de fibras largas";
    assert!(measure(text) > column_width, "sample must overflow");

    let truncated = truncate_to_width(text, column_width, measure);
    assert!(truncated.ends_with(ELLIPSIS));
    assert!(measure(truncated.trim_end_matches(ELLIPSIS)) <= column_width);
    assert!(measure(&truncated) <= column_width);
}

#[test]
fn concrete_scenario_single_row_no_signature() {
    let columns: Vec<String> = ["Item", "Cantidad", "Unidad"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
    let table = Table::new(columns)
        .with_row(Record::new(vec![
            Value::text("A1"),
            Value::Integer(5),
            Value::text("kg"),
        ]))
        .expect("matching arity");

    let rows = informe_consumo::spreadsheet::sheet_rows(&table);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec!["Item", "Cantidad", "Unidad"]);

    let xlsx = renderer()
        .export_spreadsheet(&table)
        .expect("spreadsheet export succeeds");
    assert_eq!(&xlsx[..4], b"PK\x03\x04");

    if !fonts_ready("concrete_scenario_single_row_no_signature") {
        return;
    }
    let pdf = renderer()
        .export_document(&table, None)
        .expect("document export succeeds");
    assert_eq!(page_count(&pdf), 1);
    assert!(!contains_image_xobject(&pdf));
}
