//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/incomes/{income_id}', use [format_endpoint].

/// The root path, responds with a welcome message.
pub const ROOT: &str = "/";
/// The route for registering a new user.
pub const REGISTER: &str = "/auth/register";
/// The route for exchanging an email and password for an access token.
pub const LOG_IN: &str = "/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/auth/logout";
/// The route for reading and updating the current user's profile.
pub const PROFILE: &str = "/auth/profile";
/// The route for changing the current user's password.
pub const CHANGE_PASSWORD: &str = "/auth/change-password";
/// The route for deleting the current user and everything they own.
pub const ACCOUNT: &str = "/auth/account";

/// The route to access incomes.
pub const INCOMES: &str = "/incomes";
/// The route to access a single income.
pub const INCOME: &str = "/incomes/{income_id}";
/// The route to access expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route to access bill reminders.
pub const BILL_REMINDERS: &str = "/bill-reminders";
/// The route to access a single bill reminder.
pub const BILL_REMINDER: &str = "/bill-reminders/{bill_reminder_id}";
/// The route to access categories.
pub const CATEGORIES: &str = "/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/categories/{category_id}";

/// The route for the current user's income and expense totals.
pub const SUMMARY: &str = "/summary";
/// The route for downloading a report of all incomes and expenses.
pub const FULL_REPORT: &str = "/reports/full";
/// The route for downloading a report of the incomes and expenses within a date range.
pub const RANGE_REPORT: &str = "/reports/range";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
