//! View models: text rendering of the list and detail screens, and the
//! create/edit form with its client-side validation.

use std::{collections::BTreeMap, fmt::Write as _};

use common::{
    models::{CreateUserRequest, Role, UpdateUserRequest, User},
    validation::{validate_email, validate_name},
};

use crate::context::UserState;

pub const LOADING_USERS: &str = "Loading users...";
pub const NO_USERS: &str = "No users found. Create your first user!";

/// Editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    Name,
    Email,
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl FormErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

/// Values of the create and edit forms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserForm {
    /// Form pre-filled from an existing user, as the edit screen shows it
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }

    /// Apply the same name and email rules the server enforces
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = BTreeMap::new();
        if let Err(msg) = validate_name(&self.name) {
            errors.insert(FormField::Name, msg);
        }
        if let Err(msg) = validate_email(&self.email) {
            errors.insert(FormField::Email, msg);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormErrors(errors))
        }
    }

    pub fn to_create_request(&self) -> CreateUserRequest {
        CreateUserRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            role: Some(self.role.to_string()),
        }
    }

    /// The edit screen submits every field
    pub fn to_update_request(&self) -> UpdateUserRequest {
        UpdateUserRequest {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            role: Some(self.role.to_string()),
        }
    }
}

/// Render the list screen
pub fn render_list(state: &UserState) -> String {
    let mut out = String::new();

    if state.loading {
        out.push_str(LOADING_USERS);
        out.push('\n');
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if !state.loading && state.error.is_none() && state.users.is_empty() {
        out.push_str(NO_USERS);
        out.push('\n');
    }
    if state.loading || state.users.is_empty() {
        return out;
    }

    let name_width = column_width("Name", state.users.iter().map(|u| u.name.as_str()));
    let email_width = column_width("Email", state.users.iter().map(|u| u.email.as_str()));

    let _ = writeln!(
        out,
        "{:<36}  {:<name_width$}  {:<email_width$}  {:<9}  Created At",
        "ID", "Name", "Email", "Role"
    );
    for user in &state.users {
        let _ = writeln!(
            out,
            "{:<36}  {:<name_width$}  {:<email_width$}  {:<9}  {}",
            user.id,
            user.name,
            user.email,
            user.role,
            user.created_at.format("%Y-%m-%d")
        );
    }
    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

/// Render the detail screen for one user
pub fn render_detail(user: &User) -> String {
    format!(
        "User Details\n\
         ID:         {}\n\
         Name:       {}\n\
         Email:      {}\n\
         Role:       {}\n\
         Created At: {}\n\
         Updated At: {}\n",
        user.id,
        user.name,
        user.email,
        user.role,
        user.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        user.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Render a form's validation messages, one per line
pub fn render_form_errors(errors: &FormErrors) -> String {
    errors.messages().map(|m| format!("{m}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn user(name: &str, email: &str) -> User {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        User {
            id: Uuid::nil(),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Admin,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn form_validation_reports_each_field() {
        let form = UserForm {
            name: " ".to_string(),
            email: "nope".to_string(),
            role: Role::User,
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(FormField::Name), Some("Name is required"));
        assert_eq!(
            errors.get(FormField::Email),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            render_form_errors(&errors),
            "Name is required\nPlease enter a valid email address\n"
        );
    }

    #[test]
    fn valid_form_builds_requests() {
        let form = UserForm {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::Moderator,
        };
        assert!(form.validate().is_ok());

        let create = form.to_create_request();
        assert_eq!(create.role.as_deref(), Some("moderator"));

        let update = form.to_update_request();
        assert_eq!(update.name.as_deref(), Some("Jane"));
        assert_eq!(update.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let form = UserForm::from_user(&user("Jane", "jane@example.com"));
        assert_eq!(form.name, "Jane");
        assert_eq!(form.role, Role::Admin);
        assert_eq!(UserForm::default().role, Role::User);
    }

    #[test]
    fn list_shows_placeholder_states() {
        let loading = UserState {
            loading: true,
            ..Default::default()
        };
        assert_eq!(render_list(&loading), "Loading users...\n");

        assert_eq!(render_list(&UserState::default()), format!("{NO_USERS}\n"));

        let failed = UserState {
            error: Some("Failed to fetch users".to_string()),
            ..Default::default()
        };
        assert_eq!(render_list(&failed), "Error: Failed to fetch users\n");
    }

    #[test]
    fn list_renders_table_rows() {
        let state = UserState {
            users: vec![user("Jane", "jane@example.com")],
            ..Default::default()
        };

        let rendered = render_list(&state);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Name") && lines[0].contains("Created At"));
        assert!(lines[1].contains("jane@example.com"));
        assert!(lines[1].contains("admin"));
        assert!(lines[1].ends_with("2024-03-01"));
    }

    #[test]
    fn detail_lists_every_attribute() {
        let rendered = render_detail(&user("Jane", "jane@example.com"));
        assert!(rendered.starts_with("User Details\n"));
        assert!(rendered.contains("Email:      jane@example.com"));
        assert!(rendered.contains("Role:       admin"));
        assert!(rendered.contains("Updated At: 2024-03-01 12:30:00 UTC"));
    }
}
