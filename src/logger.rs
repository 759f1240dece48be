//! Centralized logging configuration for programs driving the constraint layer
//!
//! The library itself only emits `tracing` events: `debug!` once per
//! linearization and per KKT verdict, `trace!` once per constraint. An outer
//! SQP loop calls [`init_logger`] to see them.

use tracing::Level;

/// Initialize the tracing subscriber with the standard configuration
///
/// Default log level: INFO (overrideable via RUST_LOG environment variable)
///
/// # Example
/// ```no_run
/// use apex_constraints::init_logger;
///
/// fn main() {
///     init_logger();
///     tracing::info!("SQP loop started");
/// }
/// ```
///
/// # Environment Variables
/// ```bash
/// RUST_LOG=apex_constraints=trace cargo run
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via RUST_LOG)
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}
