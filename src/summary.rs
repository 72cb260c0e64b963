//! Totals of a user's incomes and expenses.

use axum::{Extension, Json, extract::State};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error, User, UserID,
    app_state::lock_connection,
    expense::ExpenseFields,
    income::IncomeFields,
    record::{RecordState, total_amount},
};

/// The totals of a user's incomes and expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all of the user's incomes.
    pub total_income: Decimal,
    /// The sum of all of the user's expenses.
    pub total_expenses: Decimal,
    /// Total income minus total expenses, negative if the user has spent more than they received.
    pub remaining_balance: Decimal,
}

/// Compute the summary of the incomes and expenses owned by `owner`.
///
/// Every total is zero for a user without any incomes or expenses.
pub fn get_summary(owner: UserID, connection: &Connection) -> Result<Summary, Error> {
    let total_income = total_amount::<IncomeFields>(owner, connection)?;
    let total_expenses = total_amount::<ExpenseFields>(owner, connection)?;

    Ok(Summary {
        total_income,
        total_expenses,
        remaining_balance: total_income - total_expenses,
    })
}

/// A route handler for getting the authenticated user's summary.
pub async fn get_summary_endpoint(
    State(state): State<RecordState>,
    Extension(user): Extension<User>,
) -> Result<Json<Summary>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_summary(user.id, &connection).map(Json)
}
