//! Platform - Shared infrastructure primitives
//!
//! Cryptographic building blocks used by the backend crates:
//! - `password`: multi-scheme password hashing and verification
//! - `crypto`: random generation, hashing, encoding helpers
//! - `secretbox`: authenticated symmetric encryption for secrets at rest

pub mod crypto;
pub mod password;
pub mod secretbox;
