mod docs;
mod health;
mod users;

pub use docs::{not_found, openapi_document};
pub use health::health_check;
pub use users::{AUTH_FAILED_MESSAGE, create_user, get_user, list_users, search_users};
