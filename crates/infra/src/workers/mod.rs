//! Background housekeeping tasks.

pub mod revocation_pruner;

pub use revocation_pruner::{PrunerHandle, RevocationPruner};
