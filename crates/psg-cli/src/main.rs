use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use psg_core::config::{self, CONFIG_FILE_NAME, ProjectConfig};
use psg_core::ir::{Resource, TypeShape};
use psg_core::parse;
use psg_core::parse::spec::OpenApiSpec;
use psg_core::{Builder, BuilderConfig};
use psg_python::PythonEmitter;

#[derive(Parser)]
#[command(name = "psg", about = "Python SDK generator for OpenAPI 3.x", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Python SDK from an OpenAPI spec
    Generate {
        /// Path to the OpenAPI spec file (YAML or JSON)
        spec: Option<PathBuf>,

        /// Python import name of the generated package
        #[arg(short, long)]
        module: Option<String>,

        /// Distribution name written to pyproject.toml
        #[arg(short, long)]
        package: Option<String>,

        /// Service name; the client class is its PascalCase form
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Overwrite pyproject.toml and __init__.py if they exist
        #[arg(short, long)]
        force: bool,
    },

    /// Validate an OpenAPI spec and build its resources without writing
    Validate {
        /// Path to the OpenAPI spec file
        spec: PathBuf,
    },

    /// Print a summary of the resources an OpenAPI spec produces
    Inspect {
        /// Path to the OpenAPI spec file
        spec: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new psg configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

/// Options of `psg generate` that override the project config.
struct GenerateArgs {
    spec: Option<PathBuf>,
    module: Option<String>,
    package: Option<String>,
    name: Option<String>,
    out: Option<PathBuf>,
    force: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            spec,
            module,
            package,
            name,
            out,
            force,
        } => cmd_generate(GenerateArgs {
            spec,
            module,
            package,
            name,
            out,
            force,
        }),

        Commands::Validate { spec } => cmd_validate(&spec),

        Commands::Inspect { spec, format } => cmd_inspect(&spec, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "psg", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ProjectConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let loaded = config::load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if loaded.is_some() {
        log::debug!("loaded {}", config_path.display());
    }
    Ok(loaded)
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse::from_path_contents(path, &content)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Config file values with command-line flags applied on top.
fn resolve_config(args: GenerateArgs) -> Result<(PathBuf, BuilderConfig)> {
    let mut project = try_load_config()?.unwrap_or_default();
    if let Some(module) = args.module {
        project.module = Some(module);
    }
    if let Some(package) = args.package {
        project.package = Some(package);
    }
    if let Some(name) = args.name {
        project.name = Some(name);
    }
    if let Some(out) = args.out {
        project.output = out.display().to_string();
    }
    project.force |= args.force;

    let spec = args.spec.unwrap_or_else(|| PathBuf::from(&project.input));
    let config = project
        .to_builder_config()
        .context("pass the setting as a flag or add it to .psg.yaml")?;
    Ok((spec, config))
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let (spec_path, config) = resolve_config(args)?;
    let spec = load_spec(&spec_path)?;

    eprintln!(
        "Generating {} → {}",
        spec_path.display(),
        config.out.display()
    );
    let builder = Builder::load(&spec, &config)
        .with_context(|| format!("failed to index {}", spec_path.display()))?;
    let report = builder
        .build(&PythonEmitter)
        .context("generation failed")?;

    for path in &report.written {
        eprintln!("  wrote {}", path.display());
    }
    for path in &report.skipped {
        eprintln!("  kept {} (use --force to overwrite)", path.display());
    }
    eprintln!(
        "Generated {} resources, {} files in {}",
        report.resources.len(),
        report.written.len(),
        config.out.display()
    );
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let spec = load_spec(path)?;

    eprintln!("Valid OpenAPI {} spec: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    if let Some(ref components) = spec.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    let config = BuilderConfig::new(".", "sdk", "sdk", "Client");
    let builder = Builder::load(&spec, &config)?;
    let resources = builder.resources()?;
    eprintln!("  Resources: {}", resources.len());
    eprintln!(
        "  Methods: {}",
        resources.iter().map(|r| r.methods.len()).sum::<usize>()
    );

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(path: &Path, format: InspectFormat) -> Result<()> {
    let spec = load_spec(path)?;
    let config = BuilderConfig::new(".", "sdk", "sdk", "Client");
    let builder = Builder::load(&spec, &config)?;
    let resources = builder.resources()?;

    let summary = build_inspect_summary(&spec, &resources);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(spec: &OpenApiSpec, resources: &[Resource]) -> serde_json::Value {
    let resources: Vec<serde_json::Value> = resources
        .iter()
        .map(|r| {
            let types: Vec<serde_json::Value> = r
                .all_types()
                .map(|t| {
                    serde_json::json!({
                        "name": t.type_name(),
                        "kind": match t.shape {
                            TypeShape::Object(_) => "object",
                            TypeShape::Enum(_) => "enum",
                            TypeShape::Alias(_) => "alias",
                        },
                    })
                })
                .collect();
            let methods: Vec<serde_json::Value> = r
                .methods
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "name": m.name.snake_case,
                        "method": m.http_method.as_str(),
                        "path": m.path,
                        "deprecated": m.deprecated,
                    })
                })
                .collect();
            serde_json::json!({
                "tag": r.tag.name,
                "package": r.package,
                "types": types,
                "methods": methods,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
        },
        "resources": resources,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
