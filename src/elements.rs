//! Custom `genpdf` elements for the consumption report.
//!
//! Three elements make up the document body: [`ColumnHeader`] draws one bold
//! line of column names at fixed x-offsets, [`TableBody`] walks the record
//! rows with a vertical cursor and yields a page break when the remaining
//! height cannot hold another row plus the reserved signature space, and
//! [`SignatureBlock`] stacks the caption, the scaled signature image and the
//! underline rule, anchored just above the bottom margin and refusing to
//! split across pages so the block always lands whole on the final page.

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Scale, Size};
use image::GenericImageView;

use crate::layout::{truncate_to_width, ColumnLayout};
use crate::signature::Signature;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Vertical step between table lines, header included.
pub const ROW_STEP_MM: f64 = 5.0;

/// Signature bounding box, 5 cm x 3 cm.
pub const SIGNATURE_BOX_WIDTH_MM: f64 = 50.0;
/// Height of the signature bounding box.
pub const SIGNATURE_BOX_HEIGHT_MM: f64 = 30.0;

const SIGNATURE_CAPTION: &str = "Firma de Recibido:";
const SIGNATURE_CAPTION_FONT_SIZE: u8 = 10;
const SIGNATURE_CAPTION_STEP_MM: f64 = 6.0;
const SIGNATURE_RULE_GAP_MM: f64 = 1.0;
/// Gap kept between the underline rule and the bottom margin, matching the
/// fixed 1 cm offset the paper form uses.
const SIGNATURE_BOTTOM_CLEARANCE_MM: f64 = 10.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> (f64, f64) {
    let (px_width, px_height) = image.dimensions();
    (
        MM_PER_INCH * (px_width as f64) / dpi,
        MM_PER_INCH * (px_height as f64) / dpi,
    )
}

/// Draws the cell texts of one table line at the layout's x-offsets.
///
/// Cell text wider than its column is ellipsis-truncated against real font
/// metrics before printing, so no cell bleeds into its neighbour.
fn draw_table_line(
    context: &genpdf::Context,
    area: &mut render::Area<'_>,
    layout: &ColumnLayout,
    cells: &[String],
    y: f64,
    style: Style,
) -> Result<bool, Error> {
    let measure =
        |text: &str| mm_to_f64(StyledString::new(text.to_owned(), style).width(&context.font_cache));

    for (index, cell) in cells.iter().enumerate().take(layout.len()) {
        if cell.is_empty() {
            continue;
        }
        let width = layout.widths()[index];
        let text = truncate_to_width(cell, width, measure);
        let position = Position::new(mm_from_f64(layout.offsets()[index]), mm_from_f64(y));
        match area.text_section(&context.font_cache, position, style) {
            Some(mut section) => section.print_str(&text, style)?,
            None => return Ok(false),
        }
    }

    Ok(true)
}

/// One bold line of column names, redrawn at the top of every page.
pub struct ColumnHeader {
    columns: Vec<String>,
    layout: ColumnLayout,
    font_size: u8,
}

impl ColumnHeader {
    /// Creates a header line over the planned columns.
    pub fn new(columns: Vec<String>, layout: ColumnLayout, font_size: u8) -> Self {
        Self {
            columns,
            layout,
            font_size,
        }
    }
}

impl Element for ColumnHeader {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut header_style = style;
        header_style.set_font_size(self.font_size);
        header_style.set_bold();

        let mut result = RenderResult::default();
        if !draw_table_line(
            context,
            &mut area,
            &self.layout,
            &self.columns,
            0.0,
            header_style,
        )? {
            result.has_more = true;
            return Ok(result);
        }

        result.size = Size::new(area.size().width, mm_from_f64(ROW_STEP_MM));
        Ok(result)
    }
}

/// The record rows, drawn with a fixed vertical step and a page-break
/// threshold that keeps room for the reserved signature block.
pub struct TableBody {
    rows: Vec<Vec<String>>,
    layout: ColumnLayout,
    font_size: u8,
    reserved_tail: f64,
    next_row: usize,
}

impl TableBody {
    /// Creates the body over pre-stringified rows.
    ///
    /// `reserved_tail` is the height in millimetres kept free below the rows
    /// on every page; pass the signature block height when a signature will
    /// follow, zero otherwise.
    pub fn new(rows: Vec<Vec<String>>, layout: ColumnLayout, font_size: u8, reserved_tail: f64) -> Self {
        Self {
            rows,
            layout,
            font_size,
            reserved_tail,
            next_row: 0,
        }
    }
}

impl Element for TableBody {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut row_style = style;
        row_style.set_font_size(self.font_size);

        let available = mm_to_f64(area.size().height);
        let mut cursor = 0.0;
        let mut result = RenderResult::default();

        while self.next_row < self.rows.len() {
            if available - cursor < ROW_STEP_MM + self.reserved_tail {
                result.has_more = true;
                break;
            }
            if !draw_table_line(
                context,
                &mut area,
                &self.layout,
                &self.rows[self.next_row],
                cursor,
                row_style,
            )? {
                result.has_more = true;
                break;
            }
            cursor += ROW_STEP_MM;
            self.next_row += 1;
        }

        result.size = Size::new(area.size().width, mm_from_f64(cursor));
        Ok(result)
    }
}

/// Caption, scaled signature image and underline rule, drawn exactly once.
pub struct SignatureBlock {
    image: Image,
    scaled_height: f64,
}

impl SignatureBlock {
    /// Builds the block, scaling the signature into the fixed bounding box
    /// while preserving its aspect ratio.
    pub fn new(signature: &Signature) -> Result<Self, Error> {
        let (natural_width, natural_height) =
            estimated_image_size(signature.image(), DEFAULT_IMAGE_DPI);
        let mut image = Image::from_dynamic_image(signature.image().clone())?;

        let mut scaled_height = natural_height;
        if natural_width > f64::EPSILON && natural_height > f64::EPSILON {
            let scale = (SIGNATURE_BOX_WIDTH_MM / natural_width)
                .min(SIGNATURE_BOX_HEIGHT_MM / natural_height);
            image.set_scale(Scale::new(scale, scale));
            scaled_height = natural_height * scale;
        }

        Ok(Self {
            image,
            scaled_height,
        })
    }

    /// Total height the block occupies above the bottom margin, used by
    /// [`TableBody`] as the reserved tail so the block always fits on the
    /// page the rows end on.
    pub fn reserved_height() -> f64 {
        SIGNATURE_CAPTION_STEP_MM
            + SIGNATURE_BOX_HEIGHT_MM
            + SIGNATURE_RULE_GAP_MM
            + SIGNATURE_BOTTOM_CLEARANCE_MM
    }
}

impl Element for SignatureBlock {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let remaining = mm_to_f64(area.size().height);
        let needed = SIGNATURE_CAPTION_STEP_MM
            + self.scaled_height
            + SIGNATURE_RULE_GAP_MM
            + SIGNATURE_BOTTOM_CLEARANCE_MM;
        let mut result = RenderResult::default();
        if remaining < needed {
            // Not enough room left; move the whole block to the next page.
            result.has_more = true;
            return Ok(result);
        }

        // Anchor the block to the bottom of the page rather than letting it
        // trail the last row, so it sits in the same place on every report.
        area.add_offset(Position::new(0, mm_from_f64(remaining - needed)));

        let mut caption_style = style;
        caption_style.set_font_size(SIGNATURE_CAPTION_FONT_SIZE);
        caption_style.set_bold();
        match area.text_section(&context.font_cache, Position::new(0, 0), caption_style) {
            Some(mut section) => section.print_str(SIGNATURE_CAPTION, caption_style)?,
            None => {
                result.has_more = true;
                return Ok(result);
            }
        }
        area.add_offset(Position::new(0, mm_from_f64(SIGNATURE_CAPTION_STEP_MM)));

        let image_result = self.image.render(context, area.clone(), style)?;
        let image_height = mm_to_f64(image_result.size.height);
        let rule_y = image_height + SIGNATURE_RULE_GAP_MM;
        area.draw_line(
            vec![
                Position::new(0, mm_from_f64(rule_y)),
                Position::new(mm_from_f64(SIGNATURE_BOX_WIDTH_MM), mm_from_f64(rule_y)),
            ],
            Style::new(),
        );

        // The whole remaining height is spent, clearance included.
        result.size = Size::new(area.size().width, mm_from_f64(remaining));
        Ok(result)
    }
}
