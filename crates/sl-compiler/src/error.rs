//! Error types for compilation and the service layer.

use std::fmt;
use std::path::PathBuf;

use sl_core::{ValueError, ValueType};
use sl_graph::GraphError;
use sl_plugins::PluginError;
use sl_project::{ProjectError, ValidationError};

use crate::engine::EngineError;

/// Which end of a high-level link failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

/// Why a link endpoint did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFailure {
    UnknownBlock { block_id: String },
    PortOutOfRange { block_id: String, port: u32, available: u32 },
    NotMapped { block_id: String, port: u32 },
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkFailure::UnknownBlock { block_id } => write!(f, "no block '{}'", block_id),
            LinkFailure::PortOutOfRange {
                block_id,
                port,
                available,
            } => write!(
                f,
                "port {} out of range, block '{}' has {} ports",
                port, block_id, available
            ),
            LinkFailure::NotMapped { block_id, port } => {
                write!(f, "port {} of block '{}' is not in its port map", port, block_id)
            }
        }
    }
}

/// The single failure a compilation reports. Every variant names the block
/// or link that triggered it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileFailure {
    #[error("Schema lookup failed for block '{block_id}': {source}")]
    SchemaLookup {
        block_id: String,
        #[source]
        source: PluginError,
    },

    #[error("Block '{block_id}': cannot convert property '{property}' to {value_type}: {source}")]
    Coercion {
        block_id: String,
        property: String,
        value_type: ValueType,
        #[source]
        source: ValueError,
    },

    #[error("No plugin accepted block '{block_id}' (library '{block_library}', type '{block_type}')")]
    UnresolvedBlock {
        block_id: String,
        block_library: String,
        block_type: String,
    },

    #[error("Cannot resolve {endpoint} of link '{link_id}': {reason}")]
    UnresolvedLink {
        link_id: String,
        endpoint: Endpoint,
        reason: LinkFailure,
    },

    #[error("Malformed diagram: {0}")]
    MalformedDiagram(#[from] ValidationError),

    #[error("Block '{block_id}' failed to compile: {source}")]
    BlockFailed {
        block_id: String,
        #[source]
        source: PluginError,
    },

    #[error("Invalid structure: {0}")]
    InvalidStructure(#[from] GraphError),
}

impl CompileFailure {
    /// Classify a plugin failure for `block_id`.
    pub fn from_plugin(block_id: &str, err: PluginError) -> Self {
        match err {
            PluginError::Coercion {
                property,
                value_type,
                source,
            } => CompileFailure::Coercion {
                block_id: block_id.to_string(),
                property,
                value_type,
                source,
            },
            err if err.is_schema_lookup() => CompileFailure::SchemaLookup {
                block_id: block_id.to_string(),
                source: err,
            },
            err => CompileFailure::BlockFailed {
                block_id: block_id.to_string(),
                source: err,
            },
        }
    }
}

/// Application error type for the service layer shared by front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileFailure),

    #[error("Simulation failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Diagram-level problems surface as compile failures so that callers
    /// see one taxonomy.
    pub fn from_project(err: ProjectError) -> Self {
        match err {
            ProjectError::Validation(v) => AppError::Compile(CompileFailure::MalformedDiagram(v)),
            other => AppError::Project(other),
        }
    }

    pub fn compile_failure(&self) -> Option<&CompileFailure> {
        match self {
            AppError::Compile(failure) => Some(failure),
            _ => None,
        }
    }
}
