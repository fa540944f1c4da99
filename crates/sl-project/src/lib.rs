//! sl-project: on-disk document formats, validation and parameter namespaces.
//!
//! Documents are YAML unless the file extension is `.json` or `.pslk`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sl_graph::{GraphError, HighLevelBlock, HighLevelSystem};

pub mod migrate;
pub mod namespace;
pub mod schema;
pub mod system;
pub mod validate;

pub use migrate::{normalize_properties, normalize_property};
pub use namespace::{FileNamespaceLoader, NamespaceLoader, ParameterNamespace};
pub use schema::*;
pub use system::{build_block, build_system};
pub use validate::{ValidationError, validate_diagram};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Graph(#[from] GraphError),

    #[error("Cannot load parameter namespace {}: {reason}", path.display())]
    Namespace { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON documents are recognized by extension; everything else is YAML.
pub fn is_json_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json") | Some("pslk")
    )
}

fn read(path: &Path) -> ProjectResult<String> {
    std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: String) -> ProjectResult<()> {
    std::fs::write(path, content).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode any document, choosing the format from the extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> ProjectResult<T> {
    let content = read(path)?;
    if is_json_path(path) {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

pub fn save_document<T: Serialize>(path: &Path, value: &T) -> ProjectResult<()> {
    let content = if is_json_path(path) {
        serde_json::to_string_pretty(value)?
    } else {
        serde_yaml::to_string(value)?
    };
    write(path, content)
}

pub fn load_yaml(path: &Path) -> ProjectResult<DiagramDef> {
    let content = read(path)?;
    let diagram: DiagramDef = serde_yaml::from_str(&content)?;
    validate_diagram(&diagram)?;
    Ok(diagram)
}

pub fn save_yaml(path: &Path, diagram: &DiagramDef) -> ProjectResult<()> {
    validate_diagram(diagram)?;
    let content = serde_yaml::to_string(diagram)?;
    write(path, content)
}

pub fn load_json(path: &Path) -> ProjectResult<DiagramDef> {
    let content = read(path)?;
    let diagram: DiagramDef = serde_json::from_str(&content)?;
    validate_diagram(&diagram)?;
    Ok(diagram)
}

pub fn save_json(path: &Path, diagram: &DiagramDef) -> ProjectResult<()> {
    validate_diagram(diagram)?;
    let content = serde_json::to_string_pretty(diagram)?;
    write(path, content)
}

/// Load and validate a diagram in either format.
pub fn load_diagram(path: &Path) -> ProjectResult<DiagramDef> {
    if is_json_path(path) {
        load_json(path)
    } else {
        load_yaml(path)
    }
}

/// Load a diagram and build its `HighLevelSystem`, reading the initialization
/// namespace next to the diagram file.
pub fn load_system(path: &Path) -> ProjectResult<HighLevelSystem> {
    load_system_with(path, &FileNamespaceLoader::for_diagram(path))
}

pub fn load_system_with(path: &Path, loader: &dyn NamespaceLoader) -> ProjectResult<HighLevelSystem> {
    let diagram = load_diagram(path)?;
    let namespace = loader.load(diagram.initialization_script_path.as_deref())?;
    build_system(&diagram, &namespace)
}

/// Load a single block document (used to describe one block).
pub fn load_block(path: &Path) -> ProjectResult<HighLevelBlock> {
    let block: BlockDef = load_document(path)?;
    build_block(&block, &ParameterNamespace::new())
}

pub fn load_toolkit_config(path: &Path) -> ProjectResult<ToolkitConfig> {
    load_document(path)
}

pub fn load_descriptor(path: &Path) -> ProjectResult<PluginDescriptor> {
    load_document(path)
}

pub fn load_simulation_options(path: &Path) -> ProjectResult<SimulationOptions> {
    load_document(path)
}

/// Suffix identifying descriptor files inside `pluginPaths` directories.
pub const DESCRIPTOR_SUFFIX: &str = ".pslkp.yaml";

impl ToolkitConfig {
    /// Every descriptor file this configuration names, in order: explicit
    /// `pluginDescriptors` first, then descriptors found under each
    /// `pluginPaths` directory (sorted by path). Relative paths are resolved
    /// against `base_dir`, normally the configuration file's directory.
    pub fn descriptor_files(&self, base_dir: &Path) -> ProjectResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .plugin_descriptors
            .iter()
            .map(|p| base_dir.join(p))
            .collect();

        for root in &self.plugin_paths {
            let mut found = Vec::new();
            collect_descriptors(&base_dir.join(root), &mut found)?;
            found.sort();
            files.extend(found);
        }
        Ok(files)
    }
}

fn collect_descriptors(dir: &Path, found: &mut Vec<PathBuf>) -> ProjectResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| ProjectError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let path = entry
            .map_err(|source| ProjectError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_dir() {
            collect_descriptors(&path, found)?;
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(DESCRIPTOR_SUFFIX))
        {
            found.push(path);
        }
    }
    Ok(())
}
