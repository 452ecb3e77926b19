//! Durable credential lookup.

pub mod postgres;

pub use postgres::PostgresCredentialStore;
