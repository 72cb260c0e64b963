//! Money received by a user.

use rusqlite::{Row, types::Value};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    money::{from_cents, to_cents, validate_amount},
    record::{
        LedgerEntry, Record, RecordFields, date_to_value, normalise_optional_text, optional_text,
    },
};

/// The editable fields of an income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeFields {
    /// How much money was received.
    pub amount: Decimal,
    /// Where the money came from, e.g. "Salary".
    #[serde(default)]
    pub source: Option<String>,
    /// The date the money was received.
    pub received_date: Date,
}

/// An income owned by a user.
pub type Income = Record<IncomeFields>;

impl RecordFields for IncomeFields {
    const TABLE: &'static str = "income";

    const COLUMN_DEFINITIONS: &'static str = "amount INTEGER NOT NULL,
            source TEXT,
            received_date TEXT NOT NULL";

    const COLUMNS: &'static [&'static str] = &["amount", "source", "received_date"];

    fn validate(self) -> Result<Self, Error> {
        Ok(Self {
            amount: validate_amount(self.amount, "amount")?,
            source: normalise_optional_text(self.source),
            received_date: self.received_date,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>, Error> {
        Ok(vec![
            Value::Integer(to_cents(self.amount)?),
            optional_text(&self.source),
            date_to_value(self.received_date)?,
        ])
    }

    fn from_row(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            amount: from_cents(row.get(offset)?),
            source: row.get(offset + 1)?,
            received_date: row.get(offset + 2)?,
        })
    }
}

impl LedgerEntry for IncomeFields {
    const KIND: &'static str = "Income";

    const DATE_COLUMN: &'static str = "received_date";

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn date(&self) -> Date {
        self.received_date
    }

    fn label(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
