//! Money spent by a user.

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
    user::require_text,
};

/// The editable fields of an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFields {
    /// A short description of what the money was spent on.
    pub title: String,
    /// How much money was spent.
    pub amount: Decimal,
    /// A free text category label, e.g. "Housing".
    #[serde(default)]
    pub category: Option<String>,
    /// The date the money was spent.
    pub expense_date: Date,
}

/// An expense owned by a user.
pub type Expense = Record<ExpenseFields>;

impl RecordFields for ExpenseFields {
    const TABLE: &'static str = "expense";

    const COLUMN_DEFINITIONS: &'static str = "title TEXT NOT NULL,
            amount INTEGER NOT NULL,
            category TEXT,
            expense_date TEXT NOT NULL";

    const COLUMNS: &'static [&'static str] = &["title", "amount", "category", "expense_date"];

    fn validate(self) -> Result<Self, Error> {
        Ok(Self {
            title: require_text(&self.title, "title")?,
            amount: validate_amount(self.amount, "amount")?,
            category: normalise_optional_text(self.category),
            expense_date: self.expense_date,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>, Error> {
        Ok(vec![
            Value::Text(self.title.clone()),
            Value::Integer(to_cents(self.amount)?),
            optional_text(&self.category),
            date_to_value(self.expense_date)?,
        ])
    }

    fn from_row(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            title: row.get(offset)?,
            amount: from_cents(row.get(offset + 1)?),
            category: row.get(offset + 2)?,
            expense_date: row.get(offset + 3)?,
        })
    }
}

impl LedgerEntry for ExpenseFields {
    const KIND: &'static str = "Expense";

    const DATE_COLUMN: &'static str = "expense_date";

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn date(&self) -> Date {
        self.expense_date
    }

    fn label(&self) -> Option<&str> {
        Some(&self.title)
    }
}

#[cfg(test)]
mod expense_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{Error, record::RecordFields};

    use super::ExpenseFields;

    fn rent() -> ExpenseFields {
        ExpenseFields {
            title: "Rent".to_owned(),
            amount: Decimal::new(120_000, 2),
            category: Some("Housing".to_owned()),
            expense_date: date!(2024 - 01 - 01),
        }
    }

    #[test]
    fn validate_accepts_valid_expense() {
        assert_eq!(rent().validate(), Ok(rent()));
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut expense = rent();
        expense.title = "\t ".to_owned();

        assert_eq!(
            expense.validate(),
            Err(Error::Validation("title cannot be empty".to_owned()))
        );
    }

    #[test]
    fn validate_trims_title_and_rounds_amount() {
        let mut expense = rent();
        expense.title = " Rent ".to_owned();
        expense.amount = Decimal::new(1_999_5, 3);

        let got = expense.validate().unwrap();

        assert_eq!(got.title, "Rent");
        assert_eq!(got.amount, Decimal::new(2000, 2));
    }

    #[test]
    fn serializes_amount_as_decimal_string() {
        let json = serde_json::to_value(rent()).unwrap();

        assert_eq!(json["amount"], "1200.00");
        assert_eq!(json["expense_date"], "2024-01-01");
    }
}
