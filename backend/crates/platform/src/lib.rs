//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Secret hashing (scrypt, salted, constant-time verification)
//! - Signed session tokens (HMAC-SHA256)
//! - Cookie management
//! - Lockout policy primitives
//! - Client identification helpers

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod rate_limit;
pub mod secret;
pub mod token;
