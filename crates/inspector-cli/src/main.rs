//! # inspector
//!
//! Command-line front end for Ingredient Inspector.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a label photo (remote if GEMINI_API_KEY is set, catalog otherwise)
//! inspector analyze label.jpg --category cosmetics --profile me.yaml
//!
//! # Reproducible offline report
//! inspector analyze label.jpg --offline --seed 7 --format text
//!
//! # Show the catalog used for fallback reports
//! inspector catalog --category household
//! ```
//!
//! Exit codes: 0 on success, 2 when the image is missing or empty,
//! 1 for any other failure (unreadable files, bad config).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use inspector_core::{Catalog, Category, SafetyReport, UserProfile};
use inspector_runtime::providers::GEMINI_API_KEY_ENV;
use inspector_runtime::{
    AnalysisError, AnalysisOutcome, AnalysisPipelineBuilder, AnalysisRequest, ImageInput,
    ProviderSettings, RandomOrder, RuntimeConfig, SeededOrder,
};

#[derive(Parser, Debug)]
#[command(name = "inspector")]
#[command(about = "Analyze product ingredient labels for safety and allergens")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a label photo
    Analyze(AnalyzeArgs),

    /// Print the ingredient catalog
    Catalog(CatalogArgs),
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Image file, or a `data:` URI
    image: String,

    /// Product category (food, cosmetics, household, baby, ...)
    #[arg(short, long, default_value = "food")]
    category: String,

    /// User profile (YAML or JSON) with allergies
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Catalog file (YAML or JSON) replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Runtime configuration file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Never call the remote provider
    #[arg(long)]
    offline: bool,

    /// Seed for fallback ingredient order
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,
}

#[derive(clap::Args, Debug)]
struct CatalogArgs {
    /// Catalog file (YAML or JSON) replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Only show this category (unknown categories show the food list)
    #[arg(short, long)]
    category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CatalogFormat::Yaml)]
    format: CatalogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CatalogFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::Catalog(args) => print_catalog(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InvalidInput(_)) => 2,
        None => 1,
    }
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.offline)?;

    let mut builder = pipeline_builder(config);
    if let Some(path) = &args.catalog {
        builder = builder.catalog(load_catalog(path)?);
    }
    builder = match args.seed {
        Some(seed) => builder.order(Arc::new(SeededOrder::new(seed))),
        None => builder.order(Arc::new(RandomOrder)),
    };
    let pipeline = builder.build();
    tracing::debug!(remote = pipeline.has_remote(), category = %args.category, "Pipeline ready");

    let profile = args
        .profile
        .as_deref()
        .map(|path| {
            UserProfile::from_file(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))
        })
        .transpose()?;

    let request = AnalysisRequest {
        image: Some(load_image(&args.image)?),
        category: Category::new(&args.category),
        profile,
    };

    let outcome = pipeline.run(request).await?;

    let rendered = match args.format {
        ReportFormat::Json => serde_json::to_string_pretty(&outcome)?,
        ReportFormat::Text => render_text(&outcome),
    };
    println!("{rendered}");
    Ok(())
}

fn print_catalog(args: CatalogArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => Catalog::builtin(),
    };

    let rendered = match &args.category {
        Some(category) => {
            let (_, ingredients) = catalog.resolve(&Category::new(category));
            match args.format {
                CatalogFormat::Json => serde_json::to_string_pretty(ingredients)?,
                CatalogFormat::Yaml => serde_yaml::to_string(ingredients)?,
            }
        }
        None => match args.format {
            CatalogFormat::Json => serde_json::to_string_pretty(&catalog)?,
            CatalogFormat::Yaml => serde_yaml::to_string(&catalog)?,
        },
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Config file if given; otherwise Gemini when its key is in the environment.
fn load_config(path: Option<&Path>, offline: bool) -> Result<RuntimeConfig> {
    let config = match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if std::env::var_os(GEMINI_API_KEY_ENV).is_some() => {
            RuntimeConfig::default().with_provider(ProviderSettings::new("gemini"))
        }
        None => RuntimeConfig::default(),
    };

    Ok(if offline { config.offline() } else { config })
}

/// Builder for `config`, dropping to catalog-only when its provider cannot be created.
fn pipeline_builder(config: RuntimeConfig) -> AnalysisPipelineBuilder {
    match AnalysisPipelineBuilder::from_config(config.clone()) {
        Ok(builder) => builder,
        Err(err) => {
            tracing::warn!(error = %err, "Remote provider unavailable, answering from the catalog");
            AnalysisPipelineBuilder::new().config(config.offline())
        }
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::from_file(path).with_context(|| format!("Failed to load catalog {}", path.display()))
}

fn load_image(arg: &str) -> Result<ImageInput> {
    if arg.trim_start().starts_with("data:") {
        return Ok(ImageInput::data_uri(arg));
    }
    ImageInput::from_path(arg).with_context(|| format!("Failed to read image {arg}"))
}

fn render_text(outcome: &AnalysisOutcome) -> String {
    let report: &SafetyReport = &outcome.report;
    let mut out = String::new();

    let _ = writeln!(out, "Score: {}/100", report.score);
    let _ = writeln!(out, "{}", report.summary);
    let _ = writeln!(out, "Source: {}", outcome.source);
    if let Some(model) = &outcome.model {
        let _ = writeln!(out, "Model: {model}");
    }
    if let Some(reason) = &outcome.fallback_reason {
        let _ = writeln!(out, "Fallback reason: {reason}");
    }

    let _ = writeln!(out, "\nIngredients:");
    for ingredient in &report.ingredients {
        let _ = write!(
            out,
            "  {:<10} {}",
            format!("[{}]", ingredient.status),
            ingredient.name
        );
        if !ingredient.description.is_empty() {
            let _ = write!(out, " - {}", ingredient.description);
        }
        if let Some(risk) = &ingredient.risk {
            let _ = write!(out, " (risk: {risk})");
        }
        let _ = writeln!(out);
        if ingredient.is_banned() {
            let _ = write!(out, "             Banned in: {}", ingredient.banned_in.join(", "));
            if let Some(reason) = &ingredient.ban_reason {
                let _ = write!(out, ". {reason}");
            }
            let _ = writeln!(out);
        }
    }

    if report.has_conflicts() {
        let _ = writeln!(out, "\nAllergy conflicts: {}", report.conflicts.join(", "));
    }

    out.trim_end().to_string()
}
