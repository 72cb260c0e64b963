//! Route handlers shared by every kind of record.
//!
//! The handlers are generic over the record kind and are instantiated once per
//! kind in the router, e.g. `post(create_record_endpoint::<IncomeFields>)`.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, User,
    app_state::lock_connection,
    extract::{Json, Path},
    record::{
        Record, RecordFields, RecordId, create_record, delete_record, get_record, list_records,
        update_record,
    },
};

/// The state needed to manage records.
#[derive(Debug, Clone)]
pub struct RecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a record owned by the authenticated user.
///
/// Responds with `201 Created` and the stored record.
pub async fn create_record_endpoint<F: RecordFields>(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
    Json(fields): Json<F>,
) -> Result<(StatusCode, Json<Record<F>>), Error> {
    let connection = lock_connection(&state.db_connection)?;
    let record = create_record(user.id, fields, &connection)?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// A route handler for listing the authenticated user's records.
pub async fn list_records_endpoint<F: RecordFields>(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Record<F>>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_records(user.id, &connection).map(Json)
}

/// A route handler for getting one of the authenticated user's records.
pub async fn get_record_endpoint<F: RecordFields>(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
    Path(record_id): Path<RecordId>,
) -> Result<Json<Record<F>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_record(user.id, record_id, &connection).map(Json)
}

/// A route handler for replacing the fields of one of the authenticated user's records.
pub async fn update_record_endpoint<F: RecordFields>(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
    Path(record_id): Path<RecordId>,
    Json(fields): Json<F>,
) -> Result<Json<Record<F>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_record(user.id, record_id, fields, &connection).map(Json)
}

/// A route handler for deleting one of the authenticated user's records.
///
/// Responds with the record as it was before it was deleted.
pub async fn delete_record_endpoint<F: RecordFields>(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
    Path(record_id): Path<RecordId>,
) -> Result<Json<Record<F>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_record(user.id, record_id, &connection).map(Json)
}
