use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sl_compiler::{
    AppResult, OutputFormat, Toolkit, ToolkitOverrides, available_libraries, compile_to_file,
    default_output_path, describe_file, load_toolkit, validate_file,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(about = "SysLink CLI - compile block diagrams for the simulation engine", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a diagram into an engine document
    Compile {
        /// Path to the diagram (.pslk, .json or .yaml)
        diagram_path: PathBuf,
        /// Toolkit configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Output file (defaults to <diagram>.compiled.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (defaults to the output file's extension)
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Compile blocks in parallel
        #[arg(long)]
        parallel: bool,
        /// Reject properties without a declared type
        #[arg(long)]
        strict: bool,
    },
    /// List the block libraries a toolkit provides
    Libraries {
        /// Toolkit configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show rendering info for a single block document
    Describe {
        /// Path to the block document
        block_path: PathBuf,
        /// Toolkit configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate diagram syntax and structure
    Validate {
        /// Path to the diagram
        diagram_path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            diagram_path,
            config,
            output,
            format,
            parallel,
            strict,
        } => {
            let overrides = ToolkitOverrides {
                strict_properties: strict.then_some(true),
                parallel: parallel.then_some(true),
            };
            cmd_compile(&diagram_path, &config, output, format, overrides)
        }
        Commands::Libraries { config } => cmd_libraries(&config),
        Commands::Describe { block_path, config } => cmd_describe(&block_path, &config),
        Commands::Validate { diagram_path } => cmd_validate(&diagram_path),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_compile(
    diagram_path: &Path,
    config_path: &Path,
    output: Option<PathBuf>,
    format: Option<Format>,
    overrides: ToolkitOverrides,
) -> AppResult<()> {
    println!("Compiling diagram: {}", diagram_path.display());
    let started = Instant::now();

    let toolkit = load_toolkit(config_path, overrides)?;
    debug!(
        plugins = toolkit.registry.len(),
        parallel = toolkit.config.parallel,
        strict = toolkit.config.strict_properties,
        "Toolkit ready"
    );
    let (output_path, format) = match (output, format) {
        (Some(path), Some(format)) => (path, format.into()),
        (Some(path), None) => {
            let format = OutputFormat::from_path(&path);
            (path, format)
        }
        (None, format) => {
            let format = format.map_or(OutputFormat::Yaml, OutputFormat::from);
            (default_output_path(diagram_path, format), format)
        }
    };

    let fingerprint = compile_to_file(diagram_path, &toolkit, &output_path, format)?;
    println!(
        "✓ Wrote {} in {:.1} ms",
        output_path.display(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    println!("  Fingerprint: {}", fingerprint);
    Ok(())
}

fn cmd_libraries(config_path: &Path) -> AppResult<()> {
    let toolkit = load_toolkit(config_path, ToolkitOverrides::default())?;
    print_libraries(&toolkit);
    Ok(())
}

fn print_libraries(toolkit: &Toolkit) {
    let libraries = available_libraries(&toolkit.registry);
    if libraries.is_empty() {
        println!("No block libraries available");
        return;
    }

    println!("Block libraries:");
    for library in libraries {
        println!("  {}", library.name);
        for block_type in &library.block_types {
            let values: Vec<String> = block_type
                .configuration_values
                .iter()
                .map(|v| format!("{}: {}", v.name, v.value_type))
                .collect();
            if values.is_empty() {
                println!("    {}", block_type.name);
            } else {
                println!("    {} ({})", block_type.name, values.join(", "));
            }
        }
    }
}

fn cmd_describe(block_path: &Path, config_path: &Path) -> AppResult<()> {
    let toolkit = load_toolkit(config_path, ToolkitOverrides::default())?;
    let info = describe_file(block_path, &toolkit)?;

    println!("Block: {}", info.label);
    println!("  Inputs:  {}", info.input_ports);
    println!("  Outputs: {}", info.output_ports);
    if let Some(shape) = &info.shape {
        println!("  Shape:   {}", shape);
    }
    Ok(())
}

fn cmd_validate(diagram_path: &Path) -> AppResult<()> {
    println!("Validating diagram: {}", diagram_path.display());
    let summary = validate_file(diagram_path)?;
    println!("✓ Diagram is valid");
    println!(
        "  {} blocks, {} links, {} routing segments",
        summary.blocks, summary.links, summary.segments
    );
    if summary.legacy_properties > 0 {
        println!(
            "  {} properties use the legacy flat format",
            summary.legacy_properties
        );
    }
    if let Some(script) = &summary.initialization_script {
        println!("  Parameters: {}", script);
    }
    Ok(())
}
