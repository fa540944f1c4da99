//! File-level operations shared by front ends.

use std::path::{Path, PathBuf};

use sl_graph::LowLevelStructure;
use sl_plugins::{PluginRegistry, RenderInfo};
use sl_project::{DiagramDef, ToolkitConfig, load_descriptor, load_toolkit_config};
use tracing::{debug, info};

use crate::compile::{CompileOptions, compile_system_with};
use crate::describe::describe_block;
use crate::error::{AppError, AppResult};

/// A loaded toolkit: configuration plus the registry built from it.
#[derive(Debug)]
pub struct Toolkit {
    pub config: ToolkitConfig,
    pub registry: PluginRegistry,
}

impl Toolkit {
    /// Build the registry: descriptor plugins in configuration order, then
    /// the built-ins if enabled. Relative paths resolve against `base_dir`.
    pub fn from_config(config: ToolkitConfig, base_dir: &Path) -> AppResult<Self> {
        let mut descriptors = Vec::new();
        for path in config.descriptor_files(base_dir)? {
            debug!(path = %path.display(), "Loading plugin descriptor");
            descriptors.push(load_descriptor(&path)?);
        }

        let mut registry = PluginRegistry::from_descriptors(descriptors, config.strict_properties)?;
        if config.builtin_plugins {
            registry.register_builtins();
        }
        info!(plugins = registry.len(), "Loaded toolkit");

        Ok(Self { config, registry })
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::from_config(&self.config)
    }
}

/// Overrides applied on top of a toolkit configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolkitOverrides {
    pub strict_properties: Option<bool>,
    pub parallel: Option<bool>,
}

/// Load a toolkit configuration file and build its registry.
pub fn load_toolkit(config_path: &Path, overrides: ToolkitOverrides) -> AppResult<Toolkit> {
    let mut config = load_toolkit_config(config_path)?;
    if let Some(strict) = overrides.strict_properties {
        config.strict_properties = strict;
    }
    if let Some(parallel) = overrides.parallel {
        config.parallel = parallel;
    }
    Toolkit::from_config(config, base_dir(config_path))
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Load, validate and compile a diagram file.
pub fn compile_file(diagram_path: &Path, toolkit: &Toolkit) -> AppResult<LowLevelStructure> {
    let system = sl_project::load_system(diagram_path).map_err(AppError::from_project)?;
    info!(
        diagram = %diagram_path.display(),
        blocks = system.blocks().len(),
        links = system.links().len(),
        "Loaded diagram"
    );
    Ok(compile_system_with(&system, &toolkit.registry, toolkit.compile_options())?)
}

/// Output document encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// JSON for `.json` paths, YAML otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

pub fn render_structure(structure: &LowLevelStructure, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Yaml => structure
            .to_yaml_string()
            .map_err(|e| AppError::Serialization(e.to_string())),
        OutputFormat::Json => structure
            .to_json_string()
            .map_err(|e| AppError::Serialization(e.to_string())),
    }
}

pub fn write_structure(path: &Path, structure: &LowLevelStructure, format: OutputFormat) -> AppResult<()> {
    let content = render_structure(structure, format)?;
    std::fs::write(path, content).map_err(|source| AppError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Compile `diagram_path` and write the output document; returns the
/// output fingerprint.
pub fn compile_to_file(
    diagram_path: &Path,
    toolkit: &Toolkit,
    output_path: &Path,
    format: OutputFormat,
) -> AppResult<String> {
    let structure = compile_file(diagram_path, toolkit)?;
    write_structure(output_path, &structure, format)?;
    let fingerprint = structure.fingerprint();
    info!(output = %output_path.display(), fingerprint = fingerprint.as_str(), "Wrote output");
    Ok(fingerprint)
}

/// Default output path: the diagram path with a `.yaml` or `.json`
/// extension.
pub fn default_output_path(diagram_path: &Path, format: OutputFormat) -> PathBuf {
    let extension = match format {
        OutputFormat::Yaml => "yaml",
        OutputFormat::Json => "json",
    };
    let mut stem = diagram_path.file_stem().unwrap_or_default().to_os_string();
    stem.push(".compiled.");
    stem.push(extension);
    diagram_path.with_file_name(stem)
}

/// Describe the single block stored in `block_path`.
pub fn describe_file(block_path: &Path, toolkit: &Toolkit) -> AppResult<RenderInfo> {
    let block = sl_project::load_block(block_path).map_err(AppError::from_project)?;
    Ok(describe_block(&block, &toolkit.registry)?)
}

/// Summary of a validated diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSummary {
    pub blocks: usize,
    pub links: usize,
    pub segments: usize,
    pub legacy_properties: usize,
    pub initialization_script: Option<String>,
}

/// Validate a diagram file without compiling it.
pub fn validate_file(diagram_path: &Path) -> AppResult<DiagramSummary> {
    let diagram = sl_project::load_diagram(diagram_path).map_err(AppError::from_project)?;
    Ok(summarize(&diagram))
}

fn summarize(diagram: &DiagramDef) -> DiagramSummary {
    DiagramSummary {
        blocks: diagram.blocks.len(),
        links: diagram.links.len(),
        segments: diagram
            .links
            .iter()
            .map(|link| link.intermediate_segments.len())
            .sum(),
        legacy_properties: diagram
            .blocks
            .iter()
            .flat_map(|block| block.properties.values())
            .filter(|property| property.is_legacy())
            .count(),
        initialization_script: diagram.initialization_script_path.clone(),
    }
}
