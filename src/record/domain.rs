//! The generic record type shared by incomes, expenses, bill reminders and categories.

use rusqlite::{Row, types::Value};
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, UserID};

/// Alias for the integer type used for record IDs.
pub type RecordId = i64;

/// The format used for storing dates in the database.
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A stored record of kind `F` that belongs to exactly one user.
///
/// The ID, owner and creation time are assigned by the server and never change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<F> {
    /// The ID of the record.
    pub id: RecordId,
    /// The ID of the user that owns the record.
    #[serde(skip_serializing)]
    pub user_id: UserID,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The client editable fields of the record.
    #[serde(flatten)]
    pub fields: F,
}

/// The client editable fields of a kind of record and how they map onto a database table.
///
/// Each table has the columns `id`, `user_id` and `created_at` followed by [RecordFields::COLUMNS].
pub trait RecordFields: Sized + Clone + Serialize + DeserializeOwned + Send + 'static {
    /// The name of the database table.
    const TABLE: &'static str;

    /// The SQL column definitions for the kind's fields, in the same order as [RecordFields::COLUMNS].
    const COLUMN_DEFINITIONS: &'static str;

    /// The names of the kind's columns.
    const COLUMNS: &'static [&'static str];

    /// Check the fields and normalise them, e.g. rounding amounts to whole cents.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] describing the first invalid field.
    fn validate(self) -> Result<Self, Error>;

    /// The values to bind to [RecordFields::COLUMNS], in order.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if a value cannot be stored.
    fn to_values(&self) -> Result<Vec<Value>, Error>;

    /// Read the fields from `row`, starting at the column index `offset`.
    fn from_row(row: &Row, offset: usize) -> Result<Self, rusqlite::Error>;
}

/// A kind of record that moves money and therefore appears in summaries and reports.
pub trait LedgerEntry: RecordFields {
    /// The name of the record kind as shown in reports, e.g. "Income".
    const KIND: &'static str;

    /// The column holding the date the money moved.
    const DATE_COLUMN: &'static str;

    /// The amount of money.
    fn amount(&self) -> Decimal;

    /// The date the money moved.
    fn date(&self) -> Date;

    /// A short description of the entry, if there is one.
    fn label(&self) -> Option<&str>;
}

/// Convert `date` into the text value stored in the database.
///
/// # Errors
///
/// Returns [Error::Validation] if the date cannot be formatted.
pub fn date_to_value(date: Date) -> Result<Value, Error> {
    date.format(DATE_FORMAT)
        .map(Value::Text)
        .map_err(|error| Error::Validation(format!("could not format the date {date}: {error}")))
}

/// Convert an optional string into a database value, storing `None` as NULL.
pub fn optional_text(text: &Option<String>) -> Value {
    match text {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}

/// Trim an optional string and treat blank strings as absent.
pub fn normalise_optional_text(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
