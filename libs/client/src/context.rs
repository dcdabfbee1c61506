//! Client state layer
//!
//! [`UserContext`] owns the user list shown by the views together with the
//! `loading` and `error` flags. Every action raises `loading`, clears `error`,
//! runs its request and lowers `loading` again when the request settles.
//! Writes re-fetch the whole list instead of patching it locally.

use std::sync::Arc;

use common::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use tokio::sync::RwLock;
use tracing::warn;

use crate::{api::UserApi, error::ClientError};

/// Snapshot of the state layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Shared handle over the user list and its CRUD actions
#[derive(Debug, Clone)]
pub struct UserContext {
    api: UserApi,
    state: Arc<RwLock<UserState>>,
}

impl UserContext {
    pub fn new(api: UserApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(UserState::default())),
        }
    }

    /// Data layer used by this context
    pub fn api(&self) -> &UserApi {
        &self.api
    }

    pub async fn snapshot(&self) -> UserState {
        self.state.read().await.clone()
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn finish(&self) {
        self.state.write().await.loading = false;
    }

    async fn fail(&self, err: &ClientError, fallback: &str) -> String {
        let message = err.user_message(fallback);
        warn!("{}: {}", fallback, err);
        self.state.write().await.error = Some(message.clone());
        message
    }

    /// Reload the list. Failures are recorded in `error`, not returned.
    pub async fn fetch_users(&self) {
        self.begin().await;
        match self.api.get_all_users().await {
            Ok(users) => self.state.write().await.users = users,
            Err(err) => {
                self.fail(&err, "Failed to fetch users").await;
            }
        }
        self.finish().await;
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Option<Role>,
    ) -> Result<(), String> {
        let payload = CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            role: role.map(|r| r.to_string()),
        };

        self.begin().await;
        let result = match self.api.create_user(&payload).await {
            Ok(_) => {
                self.fetch_users().await;
                Ok(())
            }
            Err(err) => Err(self.fail(&err, "Failed to create user").await),
        };
        self.finish().await;
        result
    }

    pub async fn update_user(&self, id: &str, changes: UpdateUserRequest) -> Result<(), String> {
        self.begin().await;
        let result = match self.api.update_user(id, &changes).await {
            Ok(_) => {
                self.fetch_users().await;
                Ok(())
            }
            Err(err) => Err(self.fail(&err, "Failed to update user").await),
        };
        self.finish().await;
        result
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), String> {
        self.begin().await;
        let result = match self.api.delete_user(id).await {
            Ok(()) => {
                self.fetch_users().await;
                Ok(())
            }
            Err(err) => Err(self.fail(&err, "Failed to delete user").await),
        };
        self.finish().await;
        result
    }
}
