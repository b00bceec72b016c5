//! headline-observability - logging setup and span helpers
//!
//! Installs a `tracing` subscriber that writes plain or JSON lines to stderr,
//! filtered by an `EnvFilter`, and exposes the span helpers the runtime uses
//! to annotate each submitted turn.
//!
//! # Quick Start
//!
//! ```no_run
//! use headline_observability::{init, LogFormat, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::new("headline")
//!     .with_log_level("headline_runtime=debug")
//!     .with_format(LogFormat::Json);
//!
//! init(config)?;
//! tracing::info!("Service started");
//! # Ok::<(), headline_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `HEADLINE_LOG` or `RUST_LOG` - Log level filter
//! - `HEADLINE_LOG_FORMAT` - `plain` (default) or `json`

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::{LogFormat, ObservabilityConfig};
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env};
pub use tracing::{record_duration, record_error};
