//! HTTP API for the user directory
//!
//! Five REST endpoints over the `users` relation, each answering with the
//! `{success, message, data?}` envelope.

pub mod config;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
