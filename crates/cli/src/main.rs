//! FoodCheck command line.
//!
//! Usage:
//!     foodcheck resolve "EAN 4006381333931"
//!     foodcheck analyze 4006381333931 --format json
//!     foodcheck classify product.json
//!     foodcheck lexicon
//!     foodcheck health

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use foodcheck_backend_off::{
    parse_product_document, OpenFoodFactsBackend, OpenFoodFactsConfig, ProductSource,
};
use foodcheck_barcode::{resolve, BarcodeError, ValidatedBarcode};
use foodcheck_classify::classify;
use foodcheck_explain::{render_report, summarize, Summary};
use foodcheck_lexicon::Lexicon;
use foodcheck_model::{AnalysisResult, Product, ProductSignal};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "foodcheck", version)]
#[command(about = "Check a product's barcode and ingredients")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Open Food Facts API base URL
    #[arg(
        long,
        env = "OPEN_FOOD_FACTS_API",
        default_value = "https://world.openfoodfacts.org/api/v0"
    )]
    api_url: String,

    /// Lookup timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a valid barcode in text (reads stdin when no text is given)
    Resolve {
        text: Vec<String>,
    },

    /// Resolve a barcode, look the product up and classify it
    Analyze {
        /// Recognized text or typed digits
        text: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Classify a saved product record without a lookup
    Classify {
        /// Path to a product JSON file (lookup response or bare product)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the built-in lexicon
    Lexicon,

    /// Check the lookup service
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    barcode: Option<&'a ValidatedBarcode>,
    product: &'a Product,
    healthy: bool,
    summary: Summary,
    analysis: &'a AnalysisResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("foodcheck=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = OpenFoodFactsConfig {
        base_url: cli.api_url,
        timeout_secs: cli.timeout_secs,
        ..Default::default()
    };

    match cli.command {
        Commands::Resolve { text } => {
            run_resolve(&input_text(text)?)?;
        }
        Commands::Analyze { text, format } => {
            let backend = OpenFoodFactsBackend::new(config)?;
            run_analyze(&backend, &input_text(text)?, format).await?;
        }
        Commands::Classify { file, format } => {
            run_classify(&file, format)?;
        }
        Commands::Lexicon => {
            println!("{}", serde_json::to_string_pretty(Lexicon::builtin())?);
        }
        Commands::Health => {
            let backend = OpenFoodFactsBackend::new(config)?;
            run_health(&backend).await?;
        }
    }

    Ok(())
}

fn input_text(args: Vec<String>) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

fn resolve_or_exit(text: &str) -> ValidatedBarcode {
    resolve(text).unwrap_or_else(|e: BarcodeError| {
        eprintln!("{}. Enter 8-13 digits or the text recognized around the barcode.", e);
        std::process::exit(1);
    })
}

fn run_resolve(text: &str) -> Result<()> {
    let barcode = resolve_or_exit(text);
    println!("{} ({})", barcode, barcode.format().label());
    Ok(())
}

async fn run_analyze<S: ProductSource>(source: &S, text: &str, format: Format) -> Result<()> {
    let barcode = resolve_or_exit(text);
    tracing::info!(barcode = %barcode, source = source.name(), "Looking up product");

    let product = source
        .lookup(&barcode)
        .await
        .with_context(|| format!("Could not find a product with barcode {}", barcode))?;

    print_analysis(Some(&barcode), &product, format)
}

fn run_classify(file: &Path, format: Format) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let product = parse_product_document(&json)
        .with_context(|| format!("Failed to load product from {}", file.display()))?;

    print_analysis(None, &product, format)
}

fn print_analysis(
    barcode: Option<&ValidatedBarcode>,
    product: &Product,
    format: Format,
) -> Result<()> {
    let result = classify(&ProductSignal::from(product), Lexicon::builtin());

    match format {
        Format::Json => {
            let report = Report {
                barcode,
                product,
                healthy: result.is_healthy(),
                summary: summarize(&result),
                analysis: &result,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            print!("{}", render_report(product, &result));
            println!("\n{}", summarize(&result).headline);
        }
    }

    Ok(())
}

async fn run_health<S: ProductSource>(source: &S) -> Result<()> {
    print!("Checking {} service... ", source.name());

    match source.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["foodcheck", "analyze", "EAN", "4006381333931", "-f", "json"])
            .unwrap();
        match cli.command {
            Commands::Analyze { text, format } => {
                assert_eq!(input_text(text).unwrap(), "EAN 4006381333931");
                assert!(matches!(format, Format::Json));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_classify_defaults_to_text() {
        let cli = Cli::try_parse_from(["foodcheck", "classify", "product.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Classify { format: Format::Text, .. }
        ));
    }
}
