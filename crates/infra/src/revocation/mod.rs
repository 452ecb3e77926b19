//! Durable revocation stores.

pub mod postgres;

pub use postgres::PostgresRevocationStore;
