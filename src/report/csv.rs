//! Renders reports as comma separated values.

use crate::{
    Error,
    report::{REPORT_HEADERS, ReportRow},
};

/// Render `rows` as CSV text with a header row.
///
/// # Errors
///
/// Returns [Error::ReportRendering] if the rows could not be written.
pub fn render_csv(rows: &[ReportRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record(REPORT_HEADERS).map_err(rendering_error)?;

    for row in rows {
        let amount = row.amount.to_string();
        let date = row.date.to_string();

        writer
            .write_record([row.kind, amount.as_str(), row.label.as_str(), date.as_str()])
            .map_err(rendering_error)?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ReportRendering(error.to_string()))
}

fn rendering_error(error: csv::Error) -> Error {
    Error::ReportRendering(error.to_string())
}
