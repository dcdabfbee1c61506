//! Input validation shared by the API service and its clients

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Role;

/// Validate a user name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();

    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() < 2 {
        return Err("Name must be at least 2 characters".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Please enter a valid email address".to_string());
    }

    Ok(())
}

/// Validate a role name and return the parsed role
pub fn validate_role(role: &str) -> Result<Role, String> {
    role.parse().map_err(|_| {
        let names: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        format!("Role must be one of: {}", names.join(", "))
    })
}
