//! sl-core: stable foundation for the syslink toolkit.
//!
//! Contains:
//! - types (declared configuration value types and their typed values)
//! - coerce (raw document value -> typed value)
//! - format (typed value -> engine text encoding)
//! - error (shared error types)

pub mod coerce;
pub mod error;
pub mod format;
pub mod types;

// Re-exports: nice ergonomics for downstream crates
pub use coerce::coerce;
pub use error::{ValueError, ValueResult};
pub use format::{EngineValue, format_for_engine};
pub use types::{ScalarType, TypedValue, ValueType};
