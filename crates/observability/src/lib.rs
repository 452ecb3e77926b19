//! Tracing setup shared by every identity service binary and test harness.

/// Initialize process-wide tracing with JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Tracing configuration (filters, formats).
pub mod tracing;
