//! sdkforge CLI entrypoint
//! Parses command-line arguments and dispatches to the generation engine.
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use sdkforge::core::GeneratorConfig;
use sdkforge::generation::{ArtifactOutput, GenerationEngine, SpecificationLoader};
use sdkforge::infrastructure::{
    ArtifactManifest, CompositeSpecLoader, ManifestFormat, ManifestOutput,
};

#[derive(Parser)]
#[command(name = "sdkforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate request and DTO artifacts from an OpenAPI specification
    Generate(GenerateArgs),
    /// Print the default configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Path or URL to OpenAPI schema (YAML or JSON)
    #[arg(long)]
    schema_path: String,
    /// Configuration file (defaults to ./sdkforge.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base namespace for generated artifacts
    #[arg(long)]
    namespace: Option<String>,
    /// Resource group for endpoints without a tag
    #[arg(long)]
    fallback_resource_name: Option<String>,
    /// Also emit DTOs for component schemas
    #[arg(long)]
    emit_schema_dtos: bool,
    /// Manifest file to write; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// Manifest format
    #[arg(long, value_enum, default_value_t = ManifestFormat::Json)]
    format: ManifestFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO; logs go to stderr so the
    // manifest can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate(args).await?,
        Commands::Config => {
            let rendered = GeneratorConfig::default()
                .to_toml_string()
                .context("Failed to render default configuration")?;
            print!("{rendered}");
        }
    }
    Ok(())
}

/// Load configuration, apply CLI overrides and validate
async fn resolve_config(args: &GenerateArgs) -> anyhow::Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => GeneratorConfig::load_or_default(Path::new("."))
            .await
            .context("Failed to load configuration")?,
    };

    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(fallback) = &args.fallback_resource_name {
        config.fallback_resource_name = fallback.clone();
    }
    if args.emit_schema_dtos {
        config.emit_schema_dtos = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Generate the artifact manifest for one specification
async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    info!(schema = %args.schema_path, "Generating SDK artifacts");

    let config = resolve_config(&args).await?;

    let loader = CompositeSpecLoader::new().context("Failed to initialize specification loader")?;
    let spec = loader
        .load(&args.schema_path)
        .await
        .context("Failed to load OpenAPI schema")?;

    let engine = GenerationEngine::new(config);
    let artifacts = engine
        .generate(&spec)
        .context("Failed to generate artifacts")?;

    let manifest = ArtifactManifest::new(&spec, engine.config(), artifacts);
    info!(
        dtos = manifest.dto_count(),
        requests = manifest.request_count(),
        "Generated artifacts"
    );

    ManifestOutput::new(args.output, args.format)
        .write(&manifest)
        .await
        .context("Failed to write artifact manifest")?;

    Ok(())
}
