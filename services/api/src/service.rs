//! User service: validation and existence/uniqueness checks around the
//! repository

use std::sync::Arc;

use common::{
    error::DatabaseError,
    models::{CreateUserRequest, Role, UpdateUserRequest, User},
    validation::{validate_email, validate_name, validate_role},
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::repositories::{NewUser, UserChanges, UserRepository};

/// Errors surfaced by the user service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Input failed a validation rule
    #[error("{0}")]
    Validation(String),

    /// Another user already owns the email
    #[error("Email already exists")]
    EmailTaken,

    /// Persistence failure
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => ServiceError::EmailTaken,
            other => ServiceError::Database(other),
        }
    }
}

/// Type alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Orchestrates user CRUD on top of a [`UserRepository`]
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

/// Ids that are not UUIDs cannot name a stored user
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

/// Treat empty strings like absent fields
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Create a user after validating it and checking the email is free
    pub async fn create(&self, request: CreateUserRequest) -> ServiceResult<User> {
        validate_name(&request.name).map_err(ServiceError::Validation)?;
        validate_email(&request.email).map_err(ServiceError::Validation)?;
        let role = match supplied(request.role) {
            Some(role) => validate_role(&role).map_err(ServiceError::Validation)?,
            None => Role::default(),
        };

        if self
            .repository
            .find_by_email(&request.email, None)
            .await?
            .is_some()
        {
            return Err(ServiceError::EmailTaken);
        }

        let user = self
            .repository
            .insert(&NewUser {
                name: request.name,
                email: request.email,
                role,
            })
            .await?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    /// All users, newest first
    pub async fn find_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn find_one(&self, id: &str) -> ServiceResult<Option<User>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Apply the supplied fields of `request` to a user.
    ///
    /// Returns `None` when the user does not exist and the current record
    /// unchanged when no field was supplied. The existence check, the email
    /// check and the write are separate statements, not one transaction.
    pub async fn update(&self, id: &str, request: UpdateUserRequest) -> ServiceResult<Option<User>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let Some(current) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut changes = UserChanges::default();
        if let Some(name) = supplied(request.name) {
            validate_name(&name).map_err(ServiceError::Validation)?;
            changes.name = Some(name);
        }
        if let Some(email) = supplied(request.email) {
            validate_email(&email).map_err(ServiceError::Validation)?;
            if email != current.email
                && self
                    .repository
                    .find_by_email(&email, Some(id))
                    .await?
                    .is_some()
            {
                return Err(ServiceError::EmailTaken);
            }
            changes.email = Some(email);
        }
        if let Some(role) = supplied(request.role) {
            changes.role = Some(validate_role(&role).map_err(ServiceError::Validation)?);
        }

        if changes.is_empty() {
            return Ok(Some(current));
        }

        Ok(self.repository.update(id, &changes).await?)
    }

    /// Hard-delete a user; `false` when there was nothing to delete
    pub async fn remove(&self, id: &str) -> ServiceResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        if self.repository.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        // A concurrent delete can land between the lookup and this one
        if self.repository.delete(id).await? == 0 {
            return Ok(false);
        }
        info!("Deleted user {}", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserRepository;
    use common::error::DatabaseResult;
    use std::time::Duration;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    /// Stands in for writers racing the service: email lookups never see the
    /// other writer's row, and every delete is beaten by another one.
    #[derive(Default)]
    struct RacingRepository {
        inner: InMemoryUserRepository,
    }

    #[async_trait::async_trait]
    impl UserRepository for RacingRepository {
        async fn find_all(&self) -> DatabaseResult<Vec<User>> {
            self.inner.find_all().await
        }

        async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_email(
            &self,
            _email: &str,
            _exclude: Option<Uuid>,
        ) -> DatabaseResult<Option<User>> {
            Ok(None)
        }

        async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
            self.inner.insert(new_user).await
        }

        async fn update(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>> {
            self.inner.update(id, changes).await
        }

        async fn delete(&self, id: Uuid) -> DatabaseResult<u64> {
            self.inner.delete(id).await?;
            self.inner.delete(id).await
        }
    }

    fn create_request(name: &str, email: &str, role: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_defaults_role_to_user() {
        let user = service()
            .create(create_request("Jane Doe", "jane@example.com", None))
            .await
            .unwrap();

        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let service = service();
        service
            .create(create_request("Jane", "jane@example.com", Some("admin")))
            .await
            .unwrap();

        let err = service
            .create(create_request("Janet", "jane@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailTaken));
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let service = service();
        service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();

        assert!(
            service
                .create(create_request("Jane", "Jane@example.com", None))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn create_validates_input() {
        let service = service();

        let err = service
            .create(create_request("J", "j@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Name must be at least 2 characters");

        let err = service
            .create(create_request("Jane", "not-an-email", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");

        let err = service
            .create(create_request("Jane", "jane@example.com", Some("owner")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_role_only_keeps_other_fields_and_advances_timestamp() {
        let service = service();
        let created = service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = service
            .update(
                &created.id.to_string(),
                UpdateUserRequest {
                    role: Some("moderator".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.role, Role::Moderator);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_without_fields_returns_current_record() {
        let service = service();
        let created = service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();

        let unchanged = service
            .update(
                &created.id.to_string(),
                UpdateUserRequest {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let service = service();
        service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();
        let john = service
            .create(create_request("John", "john@example.com", None))
            .await
            .unwrap();

        let err = service
            .update(
                &john.id.to_string(),
                UpdateUserRequest {
                    email: Some("jane@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailTaken));

        // Re-submitting one's own email is not a collision
        let same = service
            .update(
                &john.id.to_string(),
                UpdateUserRequest {
                    email: Some("john@example.com".to_string()),
                    name: Some("Johnny".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same.name, "Johnny");
    }

    #[tokio::test]
    async fn missing_and_malformed_ids_are_not_found() {
        let service = service();
        assert!(service.find_one("not-a-uuid").await.unwrap().is_none());
        assert!(
            service
                .find_one(&Uuid::new_v4().to_string())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            service
                .update("42", UpdateUserRequest::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!service.remove(&Uuid::new_v4().to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn remove_then_find_is_not_found() {
        let service = service();
        let user = service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();
        let id = user.id.to_string();

        assert!(service.remove(&id).await.unwrap());
        assert!(service.find_one(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_violation_on_write_is_email_taken() {
        let service = UserService::new(Arc::new(RacingRepository::default()));
        let jane = service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();
        let john = service
            .create(create_request("John", "john@example.com", None))
            .await
            .unwrap();

        let err = service
            .create(create_request("Janet", "jane@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailTaken));
        assert_eq!(err.to_string(), "Email already exists");

        let err = service
            .update(
                &john.id.to_string(),
                UpdateUserRequest {
                    email: Some(jane.email.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailTaken));
    }

    #[tokio::test]
    async fn remove_beaten_by_concurrent_delete_is_not_found() {
        let service = UserService::new(Arc::new(RacingRepository::default()));
        let user = service
            .create(create_request("Jane", "jane@example.com", None))
            .await
            .unwrap();

        assert!(!service.remove(&user.id.to_string()).await.unwrap());
    }
}
