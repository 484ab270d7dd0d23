mod api;
mod user;

pub use api::{HealthResponse, SearchUsersQuery, StatusPayload};
pub use user::{CreateUserRequest, UserDto};
