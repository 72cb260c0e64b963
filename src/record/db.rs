//! Database operations shared by every kind of record.
//!
//! Every statement filters on `user_id`, so a record that belongs to another
//! user behaves exactly like a record that does not exist.

use rusqlite::{Connection, Row, ToSql, types::Value};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    money::from_cents,
    record::{LedgerEntry, Record, RecordFields, RecordId, date_to_value},
};

/// Create the table and owner index for the record kind `F`.
///
/// Rows are deleted along with the user that owns them.
pub fn create_record_table<F: RecordFields>(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            {columns}
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table}(user_id);",
        table = F::TABLE,
        columns = F::COLUMN_DEFINITIONS,
    ))?;

    Ok(())
}

/// Validate `fields` and store them as a new record owned by `owner`.
///
/// The ID and creation time are generated here, the owner always comes from
/// the authenticated user and never from client input.
///
/// # Errors
///
/// Returns [Error::Validation] if the fields are invalid or [Error::SqlError]
/// if the record could not be stored.
pub fn create_record<F: RecordFields>(
    owner: UserID,
    fields: F,
    connection: &Connection,
) -> Result<Record<F>, Error> {
    let fields = fields.validate()?;
    let values = fields.to_values()?;
    let owner_id = owner.as_i64();
    let created_at = OffsetDateTime::now_utc();

    let placeholders = (1..=F::COLUMNS.len() + 2)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} (user_id, created_at, {}) VALUES ({placeholders})",
        F::TABLE,
        F::COLUMNS.join(", "),
    );

    let mut params: Vec<&dyn ToSql> = vec![&owner_id, &created_at];
    params.extend(values.iter().map(|value| value as &dyn ToSql));

    let transaction = connection.unchecked_transaction()?;
    transaction.execute(&sql, params.as_slice())?;
    let id = transaction.last_insert_rowid();
    let record = get_record(owner, id, &transaction)?;
    transaction.commit()?;

    Ok(record)
}

/// Get every record of kind `F` owned by `owner`, in the order they were created.
pub fn list_records<F: RecordFields>(
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<Record<F>>, Error> {
    connection
        .prepare(&format!(
            "{} WHERE user_id = ?1 ORDER BY id ASC",
            select_columns::<F>()
        ))?
        .query_map([owner.as_i64()], map_row::<F>)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// Get the record with `id` if it is owned by `owner`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the record does not exist or belongs to another user.
pub fn get_record<F: RecordFields>(
    owner: UserID,
    id: RecordId,
    connection: &Connection,
) -> Result<Record<F>, Error> {
    connection
        .prepare(&format!(
            "{} WHERE id = ?1 AND user_id = ?2",
            select_columns::<F>()
        ))?
        .query_row((id, owner.as_i64()), map_row::<F>)
        .map_err(|error| error.into())
}

/// Replace all of the editable fields of the record with `id` owned by `owner`.
///
/// The ID, owner and creation time are left untouched.
///
/// # Errors
///
/// Returns [Error::Validation] if the fields are invalid, or [Error::NotFound]
/// if the record does not exist or belongs to another user. The stored record
/// is unchanged on error.
pub fn update_record<F: RecordFields>(
    owner: UserID,
    id: RecordId,
    fields: F,
    connection: &Connection,
) -> Result<Record<F>, Error> {
    let fields = fields.validate()?;
    let values = fields.to_values()?;
    let column_count = F::COLUMNS.len();

    let assignments = F::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{} AND user_id = ?{}",
        F::TABLE,
        column_count + 1,
        column_count + 2,
    );

    let mut params: Vec<Value> = values;
    params.push(Value::Integer(id));
    params.push(Value::Integer(owner.as_i64()));

    let transaction = connection.unchecked_transaction()?;
    let rows_affected = transaction.execute(&sql, rusqlite::params_from_iter(params))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    let record = get_record(owner, id, &transaction)?;
    transaction.commit()?;

    Ok(record)
}

/// Delete the record with `id` owned by `owner` and return it as it was just before deletion.
///
/// # Errors
///
/// Returns [Error::NotFound] if the record does not exist or belongs to another user.
pub fn delete_record<F: RecordFields>(
    owner: UserID,
    id: RecordId,
    connection: &Connection,
) -> Result<Record<F>, Error> {
    let transaction = connection.unchecked_transaction()?;
    let record = get_record::<F>(owner, id, &transaction)?;

    let rows_affected = transaction.execute(
        &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", F::TABLE),
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    transaction.commit()?;

    Ok(record)
}

/// Get the entries of kind `F` owned by `owner` dated within `[from, to]`, both ends inclusive.
pub fn list_entries_between<F: LedgerEntry>(
    owner: UserID,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Vec<Record<F>>, Error> {
    let sql = format!(
        "{select} WHERE user_id = ?1 AND {date} BETWEEN ?2 AND ?3 ORDER BY id ASC",
        select = select_columns::<F>(),
        date = F::DATE_COLUMN,
    );
    let params = [
        Value::Integer(owner.as_i64()),
        date_to_value(from)?,
        date_to_value(to)?,
    ];

    connection
        .prepare(&sql)?
        .query_map(rusqlite::params_from_iter(params), map_row::<F>)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// The sum of the amounts of all entries of kind `F` owned by `owner`.
///
/// Returns zero if the user has no entries.
pub fn total_amount<F: LedgerEntry>(owner: UserID, connection: &Connection) -> Result<Decimal, Error> {
    let cents: i64 = connection.query_row(
        &format!(
            "SELECT COALESCE(SUM(amount), 0) FROM {} WHERE user_id = ?1",
            F::TABLE
        ),
        [owner.as_i64()],
        |row| row.get(0),
    )?;

    Ok(from_cents(cents))
}

fn select_columns<F: RecordFields>() -> String {
    format!(
        "SELECT id, user_id, created_at, {} FROM {}",
        F::COLUMNS.join(", "),
        F::TABLE
    )
}

fn map_row<F: RecordFields>(row: &Row) -> Result<Record<F>, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let created_at = row.get(2)?;
    let fields = F::from_row(row, 3)?;

    Ok(Record {
        id,
        user_id: UserID::new(raw_user_id),
        created_at,
        fields,
    })
}
