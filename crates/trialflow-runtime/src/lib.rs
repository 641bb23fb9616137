//! # trialflow-runtime
//!
//! Asynchronous delivery side channel for trialflow sessions.
//!
//! The core in `trialflow-core` is fully synchronous and performs no I/O.
//! This crate adds the one asynchronous operation the instrument has:
//! one-way, best-effort delivery of committed trial responses to an
//! external logging endpoint.
//!
//! ## Important
//!
//! Delivery is fire-and-forget by design. There is no retry, no ordering
//! guarantee between deliveries, no backpressure, and no cancellation; a
//! session reaching Done does not wait for outstanding deliveries. The
//! outcome of a delivery is never read back into session state — failures
//! are recovered into a local [`DiagnosticLog`] and go no further.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trialflow_core::Session;
//! use trialflow_runtime::{EventLogger, LoggerConfig};
//!
//! let logger = Arc::new(EventLogger::from_config(&LoggerConfig::from_env()));
//! let session = Session::new(catalog, "EM1234").with_observer(logger.clone());
//! // commits now flow to the endpoint without ever blocking the session
//! ```

pub mod config;
pub mod diagnostics;
pub mod logger;
pub mod sink;

// Re-export main types at crate root
pub use config::{ConfigError, LoggerConfig};
pub use diagnostics::{DeliveryFailure, DiagnosticLog};
pub use logger::EventLogger;
pub use sink::{EventSink, HttpSink, LogRecord, SinkError, SINK_URL_ENV};
