//! Renders reports as PDF documents.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::{
    Error,
    report::{REPORT_HEADERS, ReportRow},
};

/// The title printed at the top of the first page.
pub const REPORT_TITLE: &str = "Expense Tracker Report";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LAYER_NAME: &str = "Layer 1";
const MARGIN: f32 = 20.0;
const TITLE_Y: f32 = 277.0;
const FIRST_ROW_Y: f32 = 265.0;
const ROW_HEIGHT: f32 = 7.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_FONT_SIZE: f32 = 16.0;
/// The x position of each column in millimetres.
const COLUMN_X: [f32; 4] = [20.0, 50.0, 85.0, 160.0];
const MAX_LABEL_LENGTH: usize = 40;

/// Render `rows` as an A4 PDF with a table of incomes and expenses.
///
/// The table continues onto new pages as needed, repeating the header row on each page.
///
/// # Errors
///
/// Returns [Error::ReportRendering] if the document could not be written.
pub fn render_pdf(rows: &[ReportRow]) -> Result<Vec<u8>, Error> {
    let (document, page, layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);

    let font = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(rendering_error)?;
    let bold_font = document
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(rendering_error)?;

    let mut current_layer = document.get_page(page).get_layer(layer);
    current_layer.use_text(
        REPORT_TITLE,
        TITLE_FONT_SIZE,
        Mm(MARGIN),
        Mm(TITLE_Y),
        &bold_font,
    );
    write_line(&current_layer, &REPORT_HEADERS, FIRST_ROW_Y, &bold_font);
    let mut y = FIRST_ROW_Y - ROW_HEIGHT;

    for row in rows {
        if y < MARGIN {
            let (page, layer) = document.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            current_layer = document.get_page(page).get_layer(layer);
            write_line(&current_layer, &REPORT_HEADERS, TITLE_Y, &bold_font);
            y = TITLE_Y - ROW_HEIGHT;
        }

        let amount = row.amount.to_string();
        let label = truncate(&row.label, MAX_LABEL_LENGTH);
        let date = row.date.to_string();
        write_line(
            &current_layer,
            &[row.kind, amount.as_str(), label.as_str(), date.as_str()],
            y,
            &font,
        );
        y -= ROW_HEIGHT;
    }

    document.save_to_bytes().map_err(rendering_error)
}

fn write_line(layer: &PdfLayerReference, cells: &[&str; 4], y: f32, font: &IndirectFontRef) {
    for (cell, x) in cells.iter().zip(COLUMN_X) {
        layer.use_text(*cell, FONT_SIZE, Mm(x), Mm(y), font);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

fn rendering_error(error: printpdf::Error) -> Error {
    Error::ReportRendering(error.to_string())
}
