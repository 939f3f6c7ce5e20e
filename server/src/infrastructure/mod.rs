/// Audit logging for security events.
pub mod audit;
/// Configuration management.
pub mod config;
/// HTTP server and health/metrics endpoints.
pub mod server;
/// Telemetry setup for logging and tracing.
pub mod telemetry;
