//! Logging facilities for faceted-core.
//!
//! The crate is instrumented with the `tracing` crate. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "faceted_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "faceted_core::timer";
    /// Deferred task queue target.
    pub const DEFERRED: &str = "faceted_core::deferred";
}
