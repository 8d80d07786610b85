//! Tracing/logging setup shared by forgecast binaries.

/// Initialize process-wide logging with the format chosen by
/// `FORGECAST_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use tracing::LogFormat;
