//! Client for the user directory API
//!
//! Three layers, each built on the one below:
//! - [`api::UserApi`]: typed functions over the HTTP endpoints
//! - [`context::UserContext`]: the user list with loading/error flags
//! - [`views`]: list/detail rendering and form validation

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod views;

pub use api::UserApi;
pub use config::ClientConfig;
pub use context::{UserContext, UserState};
pub use error::ClientError;
