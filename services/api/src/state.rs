//! Application state shared across handlers

use std::sync::Arc;

use crate::{repositories::UserRepository, service::UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
}

impl AppState {
    /// Build the state around a user repository
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self {
            user_service: UserService::new(repository),
        }
    }
}
