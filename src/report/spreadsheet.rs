//! Renders reports as Excel spreadsheets.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::{
    Error,
    report::{REPORT_HEADERS, ReportRow},
};

const SHEET_NAME: &str = "Report";

/// Render `rows` as an `.xlsx` workbook with a single sheet.
///
/// Amounts are written as numbers with two decimal places so that they can be
/// summed in the spreadsheet.
///
/// # Errors
///
/// Returns [Error::ReportRendering] if the workbook could not be written.
pub fn render_spreadsheet(rows: &[ReportRow]) -> Result<Vec<u8>, Error> {
    write_workbook(rows).map_err(|error| Error::ReportRendering(error.to_string()))
}

fn write_workbook(rows: &[ReportRow]) -> Result<Vec<u8>, XlsxError> {
    let header_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format("0.00");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_column_width(2, 30)?;
    worksheet.set_column_width(3, 12)?;

    for (column, header) in (0u16..).zip(REPORT_HEADERS) {
        worksheet.write_string_with_format(0, column, header, &header_format)?;
    }

    for (row_number, row) in (1u32..).zip(rows) {
        worksheet.write_string(row_number, 0, row.kind)?;

        match row.amount.to_f64() {
            Some(amount) => {
                worksheet.write_number_with_format(row_number, 1, amount, &amount_format)?
            }
            None => worksheet.write_string(row_number, 1, row.amount.to_string())?,
        };

        worksheet.write_string(row_number, 2, &row.label)?;
        worksheet.write_string(row_number, 3, row.date.to_string())?;
    }

    workbook.save_to_buffer()
}
