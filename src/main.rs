//! CLI entry point for the importer.

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use normas_importer::error::Result;
use normas_importer::import::{import_law, ImportOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Import Brazilian federal legislation from normas.leg.br into the
/// reader JSON format.
#[derive(Parser)]
#[command(name = "importer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Full LexML URN (e.g. urn:lex:br:federal:decreto.lei:1940-12-07;2848)
    #[arg(long)]
    urn: Option<String>,

    /// Short alias of a known law (e.g. codigo-penal)
    #[arg(long)]
    lei: Option<String>,

    /// Output JSON path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Parse a local Planalto HTML file instead of fetching
    #[arg(long)]
    planalto_html: Option<PathBuf>,

    /// Cache directory for acquisition payloads
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.urn.is_none() && cli.lei.is_none() {
        eprintln!("Error: pass --urn or --lei (see --help)");
        std::process::exit(1);
    }

    let options = ImportOptions {
        urn: cli.urn,
        alias: cli.lei,
        output: cli.output,
        planalto_html: cli.planalto_html,
        cache_dir: cli.cache_dir,
        base_url: None,
    };

    println!(
        "{} {}",
        style("Importing").bold(),
        style(
            options
                .urn
                .as_deref()
                .or(options.alias.as_deref())
                .unwrap_or("")
        )
        .cyan()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Fetching and parsing...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let (_, report) = match import_law(&options).await {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!(
        "  Law: {}",
        style(if report.law_name.is_empty() {
            report.urn.as_str()
        } else {
            report.law_name.as_str()
        })
        .green()
    );
    println!("  Parser: {}", report.parser.as_str());
    println!("  Articles: {}", style(report.article_count).green());
    println!(
        "  Structure: {} partes, {} títulos, {} capítulos",
        report.parte_count, report.titulo_count, report.capitulo_count
    );

    if report.urn_slug_mismatches > 0 {
        println!(
            "  {} {} URN→slug conversions with possible problems",
            style("!!").yellow().bold(),
            report.urn_slug_mismatches
        );
    }
    for warning in &report.warnings {
        println!("  {} {}", style("warn:").yellow(), warning);
    }

    if let Some(path) = &report.output_path {
        println!();
        println!(
            "{} {}",
            style("Saved to:").green().bold(),
            path.display()
        );
    }

    Ok(())
}
