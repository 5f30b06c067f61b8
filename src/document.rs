//! PDF document assembly.
//!
//! The page decorator applies the fixed margins and redraws the per-page
//! header: the title block appears on page 1 only, the bold column-name line
//! on every page.  The record rows and the optional signature block flow
//! below it as regular elements.

use genpdf::elements::{Break, LinearLayout, Paragraph};
use genpdf::style::Style;
use genpdf::{self, Element, Margins, PageDecorator, Position, Size};

use chrono::NaiveDate;

use crate::elements::{mm_from_f64, ColumnHeader, SignatureBlock, TableBody};
use crate::error::RenderError;
use crate::fonts;
use crate::layout::{ColumnLayout, ColumnWeights};
use crate::model::Table;
use crate::signature::Signature;

/// A4 page width.
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 page height.
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Margin applied on all four page edges, 2 cm.
pub const PAGE_MARGIN_MM: f64 = 20.0;
/// A4 width minus both horizontal margins.
pub const USABLE_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM;

const TITLE_FONT_SIZE: u8 = 16;
const DATE_FONT_SIZE: u8 = 12;
const HEADER_FONT_SIZE: u8 = 9;
const ROW_FONT_SIZE: u8 = 8;
const HEADER_GAP_MM: f64 = 2.0;

type HeaderFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Page decorator that applies margins and redraws the table header.
struct ReportPageDecorator {
    page: usize,
    margins: Margins,
    header: Box<HeaderFactory>,
}

impl ReportPageDecorator {
    fn new<F, E>(margins: Margins, header: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            page: 0,
            margins,
            header: Box::new(move |page| Box::new(header(page)) as Box<dyn Element>),
        }
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: Style,
    ) -> Result<genpdf::render::Area<'a>, genpdf::error::Error> {
        self.page += 1;
        area.add_margins(self.margins);

        let mut element = (self.header)(self.page);
        let result = element.render(context, area.clone(), style)?;
        area.add_offset(Position::new(
            0,
            result.size.height + mm_from_f64(HEADER_GAP_MM),
        ));

        Ok(area)
    }
}

/// Renders the paginated report into an in-memory PDF byte stream.
pub fn render_document(
    title: &str,
    generation_date: NaiveDate,
    table: &Table,
    signature: Option<&Signature>,
    weights: &ColumnWeights,
) -> Result<Vec<u8>, RenderError> {
    let font_family = fonts::default_font_family()?;
    let mut document = genpdf::Document::new(font_family);
    document.set_title(title);
    document.set_paper_size(Size::new(
        mm_from_f64(PAGE_WIDTH_MM),
        mm_from_f64(PAGE_HEIGHT_MM),
    ));

    // Column offsets are planned once per render call, not per page.
    let layout = ColumnLayout::plan(table.columns(), weights, USABLE_WIDTH_MM);

    let header_title = title.to_owned();
    let date_line = format!("Fecha: {}", generation_date.format("%Y-%m-%d"));
    let header_columns: Vec<String> = table.columns().to_vec();
    let header_layout = layout.clone();
    let margin = mm_from_f64(PAGE_MARGIN_MM);
    document.set_page_decorator(ReportPageDecorator::new(
        Margins::trbl(margin, margin, margin, margin),
        move |page| {
            let mut stack = LinearLayout::vertical();
            if page == 1 {
                stack.push(
                    Paragraph::new(header_title.clone())
                        .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
                );
                stack.push(
                    Paragraph::new(date_line.clone())
                        .styled(Style::new().bold().with_font_size(DATE_FONT_SIZE)),
                );
                stack.push(Break::new(1.0));
            }
            stack.push(ColumnHeader::new(
                header_columns.clone(),
                header_layout.clone(),
                HEADER_FONT_SIZE,
            ));
            stack
        },
    ));

    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|record| record.values().iter().map(ToString::to_string).collect())
        .collect();
    let reserved_tail = if signature.is_some() {
        SignatureBlock::reserved_height()
    } else {
        0.0
    };
    document.push(TableBody::new(rows, layout, ROW_FONT_SIZE, reserved_tail));

    if let Some(signature) = signature {
        document.push(SignatureBlock::new(signature)?);
    }

    let mut bytes = Vec::new();
    document.render(&mut bytes)?;
    Ok(bytes)
}
