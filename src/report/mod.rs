//! Downloadable reports of a user's incomes and expenses.
//!
//! A report is a flat list of [ReportRow]s, incomes first and then expenses,
//! rendered into one of the [ReportFormat]s.

mod csv;
mod pdf;
mod spreadsheet;

use std::str::FromStr;

use axum::{
    Extension,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error, User, UserID,
    app_state::lock_connection,
    expense::ExpenseFields,
    extract::Query,
    income::IncomeFields,
    record::{LedgerEntry, Record, RecordState, list_entries_between, list_records},
};

pub use self::csv::render_csv;
pub use pdf::render_pdf;
pub use spreadsheet::render_spreadsheet;

/// The column headers shared by every report format.
pub const REPORT_HEADERS: [&str; 4] = ["Type", "Amount", "Source/Title", "Date"];

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The message for dates that are not formatted as `YYYY-MM-DD`.
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Use YYYY-MM-DD.";

/// One line of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Either "Income" or "Expense".
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// How much money moved.
    pub amount: Decimal,
    /// The income's source or the expense's title, empty if there is none.
    pub label: String,
    /// The date the money moved.
    pub date: Date,
}

impl<F: LedgerEntry> From<&Record<F>> for ReportRow {
    fn from(record: &Record<F>) -> Self {
        Self {
            kind: F::KIND,
            amount: record.fields.amount(),
            label: record.fields.label().unwrap_or_default().to_owned(),
            date: record.fields.date(),
        }
    }
}

/// The file formats a report can be downloaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// An Excel `.xlsx` workbook.
    Excel,
    /// A PDF document.
    Pdf,
    /// Comma separated values.
    Csv,
}

impl ReportFormat {
    /// The file extension for the format, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Excel => "xlsx",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        }
    }

    /// The MIME type for the format.
    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Csv => "text/csv",
        }
    }

    /// Render `rows` into this format.
    ///
    /// # Errors
    ///
    /// Returns [Error::ReportRendering] if the file could not be written.
    pub fn render(self, rows: &[ReportRow]) -> Result<Vec<u8>, Error> {
        match self {
            ReportFormat::Excel => render_spreadsheet(rows),
            ReportFormat::Pdf => render_pdf(rows),
            ReportFormat::Csv => render_csv(rows),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "excel" => Ok(ReportFormat::Excel),
            "pdf" => Ok(ReportFormat::Pdf),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(Error::Validation(format!(
                "Unsupported report format \"{other}\". Use excel, pdf or csv."
            ))),
        }
    }
}

/// Parse a report date in the format `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [Error::Validation] with [INVALID_DATE_MESSAGE] if the date is malformed.
pub fn parse_report_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date.trim(), DATE_FORMAT)
        .map_err(|_| Error::Validation(INVALID_DATE_MESSAGE.to_owned()))
}

/// Build the rows for every income and expense owned by `owner`.
pub fn full_report_rows(owner: UserID, connection: &Connection) -> Result<Vec<ReportRow>, Error> {
    let incomes = list_records::<IncomeFields>(owner, connection)?;
    let expenses = list_records::<ExpenseFields>(owner, connection)?;

    Ok(to_rows(&incomes, &expenses))
}

/// Build the rows for the incomes and expenses owned by `owner` dated within
/// `[from, to]`, both ends inclusive.
///
/// # Errors
///
/// Returns [Error::Validation] if `from` is after `to`.
pub fn range_report_rows(
    owner: UserID,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Vec<ReportRow>, Error> {
    if from > to {
        return Err(Error::Validation(format!(
            "from_date {from} must not be after to_date {to}"
        )));
    }

    let incomes = list_entries_between::<IncomeFields>(owner, from, to, connection)?;
    let expenses = list_entries_between::<ExpenseFields>(owner, from, to, connection)?;

    Ok(to_rows(&incomes, &expenses))
}

fn to_rows(incomes: &[Record<IncomeFields>], expenses: &[Record<ExpenseFields>]) -> Vec<ReportRow> {
    incomes
        .iter()
        .map(ReportRow::from)
        .chain(expenses.iter().map(ReportRow::from))
        .collect()
}

/// The query parameters for the full report.
#[derive(Debug, Deserialize)]
pub struct FullReportQuery {
    /// One of "excel", "pdf" or "csv".
    pub format: Option<String>,
}

/// The query parameters for the date range report.
#[derive(Debug, Deserialize)]
pub struct RangeReportQuery {
    /// The first date to include, `YYYY-MM-DD`.
    pub from_date: Option<String>,
    /// The last date to include, `YYYY-MM-DD`.
    pub to_date: Option<String>,
    /// One of "excel", "pdf" or "csv".
    pub format: Option<String>,
}

fn parse_format(format: Option<&str>) -> Result<ReportFormat, Error> {
    format
        .ok_or_else(|| Error::Validation("The query parameter format is required.".to_owned()))?
        .parse()
}

fn require_date(raw_date: Option<&str>, name: &str) -> Result<Date, Error> {
    let raw_date = raw_date
        .ok_or_else(|| Error::Validation(format!("The query parameter {name} is required.")))?;

    parse_report_date(raw_date)
}

fn report_response(format: ReportFormat, file_stem: &str, rows: &[ReportRow]) -> Result<Response, Error> {
    let bytes = format.render(rows)?;
    let content_disposition = format!(
        "attachment; filename=\"{file_stem}.{}\"",
        format.extension()
    );

    tracing::debug!(
        "Rendered {file_stem} with {} rows into {} bytes",
        rows.len(),
        bytes.len()
    );

    Ok((
        [
            (CONTENT_TYPE, format.content_type().to_owned()),
            (CONTENT_DISPOSITION, content_disposition),
        ],
        bytes,
    )
        .into_response())
}

/// A route handler for downloading a report of all of the authenticated user's incomes and expenses.
pub async fn get_full_report(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
    Query(query): Query<FullReportQuery>,
) -> Result<Response, Error> {
    let format = parse_format(query.format.as_deref())?;

    let rows = {
        let connection = lock_connection(&state.db_connection)?;
        full_report_rows(user.id, &connection)?
    };

    report_response(format, "report", &rows)
}

/// A route handler for downloading a report of the authenticated user's
/// incomes and expenses dated within an inclusive date range.
pub async fn get_range_report(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
    Query(query): Query<RangeReportQuery>,
) -> Result<Response, Error> {
    let from = require_date(query.from_date.as_deref(), "from_date")?;
    let to = require_date(query.to_date.as_deref(), "to_date")?;
    let format = parse_format(query.format.as_deref())?;

    let rows = {
        let connection = lock_connection(&state.db_connection)?;
        range_report_rows(user.id, from, to, &connection)?
    };

    report_response(format, "datewise_report", &rows)
}
