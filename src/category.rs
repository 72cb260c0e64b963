//! Named categories a user can organise their spending with.

use rusqlite::{Row, types::Value};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    record::{Record, RecordFields, normalise_optional_text, optional_text},
    user::require_text,
};

/// The editable fields of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFields {
    /// The name of the category.
    pub name: String,
    /// A display colour, e.g. "#ff0000".
    #[serde(default)]
    pub color: Option<String>,
}

/// A category owned by a user.
pub type Category = Record<CategoryFields>;

impl RecordFields for CategoryFields {
    const TABLE: &'static str = "category";

    const COLUMN_DEFINITIONS: &'static str = "name TEXT NOT NULL,
            color TEXT";

    const COLUMNS: &'static [&'static str] = &["name", "color"];

    fn validate(self) -> Result<Self, Error> {
        Ok(Self {
            name: require_text(&self.name, "name")?,
            color: normalise_optional_text(self.color),
        })
    }

    fn to_values(&self) -> Result<Vec<Value>, Error> {
        Ok(vec![Value::Text(self.name.clone()), optional_text(&self.color)])
    }

    fn from_row(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            name: row.get(offset)?,
            color: row.get(offset + 1)?,
        })
    }
}

#[cfg(test)]
mod category_tests {
    use crate::{Error, record::RecordFields};

    use super::CategoryFields;

    #[test]
    fn validate_fails_on_just_whitespace() {
        let category = CategoryFields {
            name: "\n\t \r".to_owned(),
            color: None,
        };

        assert_eq!(
            category.validate(),
            Err(Error::Validation("name cannot be empty".to_owned()))
        );
    }

    #[test]
    fn validate_succeeds_on_non_empty_name() {
        let category = CategoryFields {
            name: "🔥".to_owned(),
            color: Some("".to_owned()),
        };

        let got = category.validate().unwrap();

        assert_eq!(got.name, "🔥");
        assert_eq!(got.color, None);
    }
}
