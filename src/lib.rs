//! A multi-user expense tracker served as a JSON REST API.
//!
//! Users register with an email and password and authenticate with bearer
//! access tokens. Each user keeps their own incomes, expenses, bill reminders
//! and categories, can see a summary of their income and spending, and can
//! download reports as Excel, PDF or CSV files.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod bill_reminder;
mod category;
mod db;
pub mod endpoints;
mod error;
mod expense;
mod extract;
mod income;
mod logging;
mod money;
mod password;
mod record;
mod report;
mod routing;
mod summary;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use bill_reminder::{BillReminder, BillReminderFields};
pub use category::{Category, CategoryFields};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{Expense, ExpenseFields};
pub use income::{Income, IncomeFields};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use record::{Record, RecordFields, create_record};
pub use routing::build_router;
pub use user::{
    NewUser, User, UserID, count_users, create_user, delete_user, get_user_by_email,
    get_user_by_id, parse_email, update_password,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for the Ctrl+C signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
