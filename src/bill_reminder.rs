//! Reminders for bills that a user has to pay.

use rusqlite::{Row, types::Value};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    money::{from_cents, to_cents, validate_amount},
    record::{Record, RecordFields, date_to_value, normalise_optional_text, optional_text},
    user::require_text,
};

/// The status given to bill reminders created without one.
pub const DEFAULT_STATUS: &str = "pending";

fn default_status() -> String {
    DEFAULT_STATUS.to_owned()
}

/// The editable fields of a bill reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillReminderFields {
    /// What the bill is for.
    pub title: String,
    /// How much has to be paid.
    pub amount: Decimal,
    /// When the bill has to be paid by.
    pub due_date: Date,
    /// How often the bill repeats, e.g. "monthly".
    #[serde(default)]
    pub repeat_cycle: Option<String>,
    /// Whether the bill has been paid, defaults to [DEFAULT_STATUS].
    #[serde(default = "default_status")]
    pub status: String,
    /// Free text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A bill reminder owned by a user.
pub type BillReminder = Record<BillReminderFields>;

impl RecordFields for BillReminderFields {
    const TABLE: &'static str = "bill_reminder";

    const COLUMN_DEFINITIONS: &'static str = "title TEXT NOT NULL,
            amount INTEGER NOT NULL,
            due_date TEXT NOT NULL,
            repeat_cycle TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            notes TEXT";

    const COLUMNS: &'static [&'static str] = &[
        "title",
        "amount",
        "due_date",
        "repeat_cycle",
        "status",
        "notes",
    ];

    fn validate(self) -> Result<Self, Error> {
        let status = match self.status.trim() {
            "" => default_status(),
            status => status.to_owned(),
        };

        Ok(Self {
            title: require_text(&self.title, "title")?,
            amount: validate_amount(self.amount, "amount")?,
            due_date: self.due_date,
            repeat_cycle: normalise_optional_text(self.repeat_cycle),
            status,
            notes: self.notes,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>, Error> {
        Ok(vec![
            Value::Text(self.title.clone()),
            Value::Integer(to_cents(self.amount)?),
            date_to_value(self.due_date)?,
            optional_text(&self.repeat_cycle),
            Value::Text(self.status.clone()),
            optional_text(&self.notes),
        ])
    }

    fn from_row(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            title: row.get(offset)?,
            amount: from_cents(row.get(offset + 1)?),
            due_date: row.get(offset + 2)?,
            repeat_cycle: row.get(offset + 3)?,
            status: row.get(offset + 4)?,
            notes: row.get(offset + 5)?,
        })
    }
}
