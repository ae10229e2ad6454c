//! Common test utilities and helpers
//!
//! - Application state and login fixtures
//! - PostgreSQL fixtures (only used when `DATABASE_URL` is set)
//! - Custom assertion macros
#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;
pub mod database;

pub use auth_helpers::*;
