//! Authentication: access tokens, the middleware that checks them, and the
//! routes for registering, logging in and managing the user's own account.

mod log_in;
mod log_out;
mod middleware;
mod profile;
mod register_user;
mod token;

pub use log_in::log_in;
pub use log_out::log_out;
pub use middleware::auth_guard;
pub use profile::{change_password, delete_account, get_profile, update_profile};
pub use register_user::register_user;
pub use token::{DEFAULT_TOKEN_DURATION, TokenKeys, decode_token, issue_token};
