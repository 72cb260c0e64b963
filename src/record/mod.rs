//! Records owned by a single user: incomes, expenses, bill reminders and categories.
//!
//! Each kind only describes its own fields through [RecordFields], the storage
//! and HTTP handlers are shared so that every kind is scoped to its owner in
//! exactly the same way.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_record, create_record_table, delete_record, get_record, list_entries_between,
    list_records, total_amount, update_record,
};
pub use domain::{
    LedgerEntry, Record, RecordFields, RecordId, date_to_value, normalise_optional_text,
    optional_text,
};
pub use endpoints::{
    RecordState, create_record_endpoint, delete_record_endpoint, get_record_endpoint,
    list_records_endpoint, update_record_endpoint,
};
