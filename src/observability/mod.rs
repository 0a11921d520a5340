//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Route table build, server and error handler produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every request span
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
