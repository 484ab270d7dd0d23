//! Mock user directory.
//!
//! Serves a fixed pair of users; created users are echoed back with a
//! random id and not stored.

use rand::Rng;
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, StatusPayload, UserDto};

/// Upper bound (exclusive) for generated user ids.
const MAX_GENERATED_ID: u64 = 1_000_000;

#[derive(Debug, Clone, Default)]
pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_all_users(&self) -> Vec<UserDto> {
        vec![UserDto::new(1, "Chandra"), UserDto::new(2, "John Doe")]
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: u64) -> Option<UserDto> {
        let user = self
            .get_all_users()
            .await
            .into_iter()
            .find(|u| u.id == id);
        debug!(found = user.is_some(), "User lookup");
        user
    }

    /// Create a user from `request`.
    ///
    /// # Errors
    ///
    /// `AppError::BadRequest("Name is required")` if the name is missing or empty.
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserDto> {
        let name = request
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("Name is required".to_string()))?;

        let id = rand::rng().random_range(0..MAX_GENERATED_ID);
        debug!(id, "User created");
        Ok(UserDto { id, name })
    }

    /// Search is a stub that always reports success.
    pub async fn search_user(&self, id: i64, age: Option<u32>, active: Option<bool>) -> StatusPayload {
        debug!(id, ?age, ?active, "User search");
        StatusPayload::success(json!(true))
    }
}
