//! Typed HTTP access to the user API

use std::time::Duration;

use common::models::{ApiResponse, CreateUserRequest, UpdateUserRequest, User};
use reqwest::{Client, Response, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;

use crate::{config::ClientConfig, error::ClientError};

/// Client data layer: one method per endpoint
#[derive(Debug, Clone)]
pub struct UserApi {
    http: Client,
    base_url: String,
}

impl UserApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Url::parse(&config.api_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/users/{}", self.base_url, id)
    }

    /// All users, newest first. A response without data counts as empty.
    pub async fn get_all_users(&self) -> Result<Vec<User>, ClientError> {
        debug!("GET {}", self.users_url());
        let response = self.http.get(self.users_url()).send().await?;
        let envelope: ApiResponse<Vec<User>> = decode(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<User, ClientError> {
        debug!("GET {}", self.user_url(id));
        let response = self.http.get(self.user_url(id)).send().await?;
        let envelope: ApiResponse<User> = decode(response).await?;
        envelope.data.ok_or(ClientError::MissingData("User not found"))
    }

    pub async fn create_user(&self, payload: &CreateUserRequest) -> Result<User, ClientError> {
        debug!("POST {}", self.users_url());
        let response = self.http.post(self.users_url()).json(payload).send().await?;
        let envelope: ApiResponse<User> = decode(response).await?;
        envelope
            .data
            .ok_or(ClientError::MissingData("Failed to create user"))
    }

    pub async fn update_user(
        &self,
        id: &str,
        payload: &UpdateUserRequest,
    ) -> Result<User, ClientError> {
        debug!("PUT {}", self.user_url(id));
        let response = self.http.put(self.user_url(id)).json(payload).send().await?;
        let envelope: ApiResponse<User> = decode(response).await?;
        envelope
            .data
            .ok_or(ClientError::MissingData("Failed to update user"))
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        debug!("DELETE {}", self.user_url(id));
        let response = self.http.delete(self.user_url(id)).send().await?;
        let _: ApiResponse<IgnoredAny> = decode(response).await?;
        Ok(())
    }
}

/// Decode an envelope, turning non-success statuses into
/// [`ClientError::Api`] carrying the server's message when it sent one.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<ApiResponse<T>>().await?);
    }

    let message = match response.json::<ApiResponse<IgnoredAny>>().await {
        Ok(envelope) => envelope.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
