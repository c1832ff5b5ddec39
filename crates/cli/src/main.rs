//! # exportdash-cli
//!
//! Command-line front end for the export dashboard pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use exportdash_core::{Config, PipelineCache, TidyTable};
use exportdash_viz::{CountrySelection, Dashboard, ProductChoice, Selection};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "exportdash.toml";

/// exportdash - quarterly export sales dashboard
#[derive(Parser)]
#[command(name = "exportdash")]
#[command(author, version, about = "Quarterly export sales dashboard", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Spreadsheet export to read (overrides the config file)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Worksheet name (defaults to the first sheet)
    #[arg(short = 's', long = "sheet")]
    sheet: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the dashboard page
    Render {
        /// Output directory (overrides the config file)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Country to compare, or "Total"
        #[arg(long, default_value = "Total")]
        country: String,

        /// Product to compare, or "Total"; repeatable. Blank values are
        /// ignored, so `--product ""` selects nothing.
        #[arg(short, long = "product", value_name = "PRODUCT")]
        products: Vec<String>,
    },
    /// Print the tidy table
    Tidy {
        /// Output format (table, csv, json)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },
    /// Print a short summary of the tidy table
    Summary,
}

/// Output format for the tidy table.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Aligned table output (default)
    #[default]
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(io::stderr)
            .init();
    }

    let config = resolve_config(&cli)?;
    let mut cache = PipelineCache::new();
    let table = load_table(&mut cache, &config)?;

    match cli.command {
        Command::Render {
            out,
            country,
            products,
        } => {
            let selection = build_selection(&country, &products);
            let out = out.unwrap_or_else(|| config.dashboard.output_dir.clone());
            render(&table, &config, &selection, &out)?;
            Ok(())
        }
        Command::Tidy { format } => print_tidy(&table, format),
        Command::Summary => {
            print_summary(&table);
            Ok(())
        }
    }
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::load(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load config: {DEFAULT_CONFIG_FILE}"))?,
        None => Config::default(),
    };

    if let Some(input) = &cli.input {
        config.input.path.clone_from(input);
    }
    if let Some(sheet) = &cli.sheet {
        config.input.sheet = Some(sheet.clone());
    }
    Ok(config)
}

fn load_table(cache: &mut PipelineCache, config: &Config) -> Result<Arc<TidyTable>> {
    let path = &config.input.path;
    let table = cache
        .get_or_load(path, &config.input.pipeline_options())
        .with_context(|| format!("Failed to process {}", path.display()))?;
    tracing::info!("Loaded {} export records from {}", table.len(), path.display());
    Ok(table)
}

/// Turn the raw selection arguments into a [`Selection`].
///
/// No `--product` at all keeps the default `{Total}` selection.
fn build_selection(country: &str, products: &[String]) -> Selection {
    // FromStr for both choices is infallible
    let country = country.parse::<CountrySelection>().unwrap_or_default();
    let selection = Selection::default().with_country(country);
    if products.is_empty() {
        return selection;
    }

    let choices = products
        .iter()
        .filter(|p| !p.trim().is_empty())
        .filter_map(|p| p.parse::<ProductChoice>().ok());
    selection.with_products(choices)
}

/// Build and write the dashboard, printing any selection warnings.
fn render(
    table: &TidyTable,
    config: &Config,
    selection: &Selection,
    out: &Path,
) -> Result<Dashboard> {
    let dashboard = Dashboard::build(table, &config.dashboard, selection);
    for warning in &dashboard.warnings {
        eprintln!("{} {warning}", "Warning:".yellow().bold());
    }

    let page = dashboard
        .write_to(out)
        .with_context(|| format!("Failed to write dashboard to {}", out.display()))?;
    println!(
        "{} {} charts to {}",
        "Rendered".green().bold(),
        dashboard.charts.len(),
        page.display()
    );
    Ok(dashboard)
}

fn print_tidy(table: &TidyTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", table.to_json()?),
        OutputFormat::Csv => {
            let stdout = io::stdout();
            table.write_csv(stdout.lock())?;
        }
        OutputFormat::Table => {
            if table.is_empty() {
                println!("(empty table)");
                return Ok(());
            }
            let mut stdout = io::stdout().lock();
            for line in format_table(table) {
                writeln!(stdout, "{line}")?;
            }
        }
    }
    Ok(())
}

/// Lay out the tidy table as aligned text rows, header first.
fn format_table(table: &TidyTable) -> Vec<String> {
    let rows: Vec<[String; 4]> = table
        .iter()
        .map(|r| {
            [
                r.date.to_string(),
                r.country.clone(),
                r.product.clone(),
                r.value.to_string(),
            ]
        })
        .collect();

    let header = ["date", "country", "product", "value"].map(str::to_string);
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| {
                    let pad = width - cell.chars().count();
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

fn print_summary(table: &TidyTable) {
    println!("{}", "Export records".cyan().bold());
    println!("  {:<10} {}", "records:", table.len());
    match table.date_range() {
        Some((first, last)) => println!("  {:<10} {first} .. {last}", "periods:"),
        None => println!("  {:<10} {}", "periods:", "none".yellow()),
    }
    println!("  {:<10} {:.2}", "total:", table.total());
    println!("  {:<10} {}", "countries:", table.countries().join(", "));
    println!("  {:<10} {}", "products:", table.products().join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> TidyTable {
        serde_json::from_str(
            r#"[
                {"date": "2021-01-01", "country": "USA", "product": "Machinery ", "value": 12.5},
                {"date": "2021-04-01", "country": "Japan", "product": "ICT products", "value": 3.0}
            ]"#,
        )
        .unwrap()
    }

    // ========================================================================
    // CLI argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parse_render() {
        let cli = Cli::parse_from([
            "exportdash",
            "--input",
            "exports.xlsx",
            "render",
            "--country",
            "USA",
            "-p",
            "Total",
            "-p",
            "ICT products",
        ]);
        assert_eq!(cli.input, Some(PathBuf::from("exports.xlsx")));
        match cli.command {
            Command::Render {
                out,
                country,
                products,
            } => {
                assert!(out.is_none());
                assert_eq!(country, "USA");
                assert_eq!(products, vec!["Total", "ICT products"]);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_cli_parse_tidy_format() {
        let cli = Cli::parse_from(["exportdash", "tidy", "-f", "csv"]);
        assert!(matches!(
            cli.command,
            Command::Tidy {
                format: OutputFormat::Csv
            }
        ));

        let cli = Cli::parse_from(["exportdash", "tidy"]);
        assert!(matches!(
            cli.command,
            Command::Tidy {
                format: OutputFormat::Table
            }
        ));
    }

    #[test]
    fn test_cli_parse_verbose_and_sheet() {
        let cli = Cli::parse_from(["exportdash", "-v", "--sheet", "Sheet2", "summary"]);
        assert!(cli.verbose);
        assert_eq!(cli.sheet.as_deref(), Some("Sheet2"));
        assert!(matches!(cli.command, Command::Summary));
    }

    // ========================================================================
    // Selection and config tests
    // ========================================================================

    #[test]
    fn test_build_selection_defaults_to_total() {
        let selection = build_selection("Total", &[]);
        assert_eq!(selection, Selection::default());
    }

    #[test]
    fn test_build_selection_blank_product_is_empty() {
        let selection = build_selection("USA", &[String::new()]);
        assert_eq!(selection.country, CountrySelection::Country("USA".to_string()));
        assert!(selection.products.is_empty());
    }

    #[test]
    fn test_build_selection_keeps_trailing_space() {
        let selection = build_selection("Total", &["Machinery ".to_string()]);
        assert!(selection
            .products
            .contains(&ProductChoice::Product("Machinery ".to_string())));
    }

    #[test]
    fn test_resolve_config_applies_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exportdash.toml");
        std::fs::write(&path, "[input]\npath = \"a.xls\"\nsheet = \"One\"\n").unwrap();

        let cli = Cli::parse_from([
            "exportdash",
            "--config",
            path.to_str().unwrap(),
            "--input",
            "b.xlsx",
            "summary",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.input.path, PathBuf::from("b.xlsx"));
        assert_eq!(config.input.sheet.as_deref(), Some("One"));
    }

    // ========================================================================
    // Output tests
    // ========================================================================

    #[test]
    fn test_format_table_aligns_columns() {
        let lines = format_table(&sample());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date        country  product       value");
        assert_eq!(lines[1], "2021-01-01  USA      Machinery     12.5");
        assert_eq!(lines[2], "2021-04-01  Japan    ICT products  3");
    }

    #[test]
    fn test_render_writes_page() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("site");
        let dashboard =
            render(&sample(), &Config::default(), &Selection::default(), &out).unwrap();
        assert!(out.join("index.html").exists());
        assert!(dashboard.warnings.is_empty());
    }

    #[test]
    fn test_render_warns_on_unknown_country() {
        let dir = tempdir().unwrap();
        let selection = build_selection("Germany", &[]);
        let dashboard = render(&sample(), &Config::default(), &selection, dir.path()).unwrap();
        assert_eq!(
            dashboard.warnings,
            vec!["Unknown country 'Germany'. Choose one of: Total, Japan, USA".to_string()]
        );
    }

    #[test]
    fn test_render_warns_on_unknown_product() {
        let dir = tempdir().unwrap();
        let selection = build_selection("USA", &["Machinery".to_string()]);
        let dashboard = render(&sample(), &Config::default(), &selection, dir.path()).unwrap();
        assert_eq!(
            dashboard.warnings,
            vec!["Unknown product 'Machinery'. Did you mean 'Machinery '?".to_string()]
        );
        assert!(dir.path().join("index.html").exists());
    }
}
