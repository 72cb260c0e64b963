//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    auth::{
        auth_guard, change_password, delete_account, get_profile, log_in, log_out, register_user,
        update_profile,
    },
    bill_reminder::BillReminderFields,
    category::CategoryFields,
    endpoints,
    expense::ExpenseFields,
    income::IncomeFields,
    record::{
        RecordFields, create_record_endpoint, delete_record_endpoint, get_record_endpoint,
        list_records_endpoint, update_record_endpoint,
    },
    report::{get_full_report, get_range_report},
    summary::get_summary_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_welcome))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in));

    let protected_routes = Router::new()
        .route(endpoints::LOG_OUT, post(log_out))
        .route(endpoints::PROFILE, get(get_profile).patch(update_profile))
        .route(endpoints::CHANGE_PASSWORD, post(change_password))
        .route(endpoints::ACCOUNT, delete(delete_account))
        .merge(record_routes::<IncomeFields>(
            endpoints::INCOMES,
            endpoints::INCOME,
        ))
        .merge(record_routes::<ExpenseFields>(
            endpoints::EXPENSES,
            endpoints::EXPENSE,
        ))
        .merge(record_routes::<BillReminderFields>(
            endpoints::BILL_REMINDERS,
            endpoints::BILL_REMINDER,
        ))
        .merge(record_routes::<CategoryFields>(
            endpoints::CATEGORIES,
            endpoints::CATEGORY,
        ))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::FULL_REPORT, get(get_full_report))
        .route(endpoints::RANGE_REPORT, get(get_range_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The create, list, read, update and delete routes for one kind of record.
fn record_routes<F: RecordFields>(
    collection_path: &'static str,
    item_path: &'static str,
) -> Router<AppState> {
    Router::new()
        .route(
            collection_path,
            get(list_records_endpoint::<F>).post(create_record_endpoint::<F>),
        )
        .route(
            item_path,
            get(get_record_endpoint::<F>)
                .put(update_record_endpoint::<F>)
                .delete(delete_record_endpoint::<F>),
        )
}

async fn get_welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Expense Tracker API!" }))
}
