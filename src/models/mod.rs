//! Data models for credentials and sessions.
//!
//! This module contains the persisted credential entity, the ephemeral
//! session value, and the API request/response types built from them.

/// Magic-link credential model
pub mod credential;
/// Ephemeral session model
pub mod session;
