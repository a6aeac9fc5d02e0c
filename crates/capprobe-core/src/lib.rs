//! capprobe core - shared foundation for environment capability probing.
//!
//! This crate provides error types, configuration, validated domain types and
//! the capability report that the `capprobe-context` crate builds on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Validated newtypes and the environment snapshot
//! - [`capabilities`] - Capability identifiers and the serializable report
//! - [`logging`] - Tracing subscriber setup
//!
//! # Example
//!
//! ```rust
//! use capprobe_core::{PartitionId, ProbeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeConfig::default();
//! let partition = PartitionId::compose(&config.platform_cache.scope_prefix, "Main")?;
//! assert_eq!(partition.as_str(), "local.Main");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod capabilities;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use capabilities::{CapabilityId, CapabilityReport};
pub use config::{
    CurrencyConfig, CurrencyProbePolicy, PlatformCacheConfig, ProbeConfig, SessionConfig,
};
pub use error::{ConfigError, ConfigResult, ProbeError, Result, SourceError};
pub use types::{
    EnvironmentId, EnvironmentRecord, EnvironmentSnapshot, FiscalMonth, PartitionId, Timestamp,
};
