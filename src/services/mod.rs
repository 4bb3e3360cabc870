//! Core credential services.
//!
//! Services hold the security logic separated from HTTP handlers:
//! secret generation and hashing, token issuance and validation,
//! revocation policy, and the periodic cleanup sweep.

pub mod cleanup;
pub mod eligibility;
pub mod revocation;
pub mod secret;
pub mod token_service;
