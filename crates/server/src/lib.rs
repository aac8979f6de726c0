//! Trellis server library.
//!
//! This crate provides the backend functionality as a library, allowing it
//! to be tested and reused (the CLI links against it for migrations and
//! user management).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

/// Embedded SQL migrations, run via `trellis-cli migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
