//! `identity-core`: identifiers and validation errors shared by the identity crates.
//!
//! This crate has no infrastructure or crypto concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{TokenId, UserId};
