//! Quarry CLI
//!
//! Command-line interface for Quarry operations:
//! - Inspect the database schema
//! - Run saved queries and raw SQL
//! - Pivot results and suggest charts offline
//! - Try out date patterns

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quarry::backend::{HttpBackend, QueryBackend};
use quarry::config::{generate_default_config, Config, LoggingConfig};
use quarry::format::{format_cell, format_date, parse_date_like};
use quarry::pivot::{pivot, PivotConfig};
use quarry::query::{executable, ColumnSelection, SavedQuery};
use quarry::result::QueryResult;
use quarry::suggest::suggest;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, run and reshape analytical queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Query backend URL (overrides config)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Pivot options shared by `run` and `pivot`
#[derive(clap::Args, Debug, Clone)]
pub struct PivotArgs {
    /// Column whose values become new columns
    #[arg(long)]
    pub pivot: Option<String>,
    /// Column that fills the pivoted cells
    #[arg(long, requires = "pivot")]
    pub value: Option<String>,
    /// Columns that identify a row (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub dims: Vec<String>,
    /// Date pattern for pivoted headers, e.g. "MMM yyyy"
    #[arg(long)]
    pub header_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tables in the database
    Tables {
        /// Also list each table's columns
        #[arg(long)]
        columns: bool,
    },

    /// Run a saved query
    Run {
        /// Saved query JSON file
        path: PathBuf,
        /// Maximum rows to fetch
        #[arg(short, long)]
        limit: Option<u32>,
        /// Date pattern for date-like cells
        #[arg(long)]
        date_format: Option<String>,
        #[command(flatten)]
        pivot: PivotArgs,
    },

    /// Run raw SQL
    Sql {
        /// SQL text
        sql: String,
        /// Date pattern for date-like cells
        #[arg(long)]
        date_format: Option<String>,
    },

    /// Pivot a result file from long to wide format
    Pivot {
        /// Query result JSON file
        path: PathBuf,
        #[command(flatten)]
        pivot: PivotArgs,
    },

    /// Suggest charts for a result file
    Suggest {
        /// Query result JSON file
        path: PathBuf,
        /// Saved query the result came from (for aggregation info)
        #[arg(short, long)]
        query: Option<PathBuf>,
        /// Print the chart data for the top suggestion
        #[arg(long)]
        data: bool,
    },

    /// Format a date with a pattern
    FormatDate {
        /// Date or timestamp, e.g. 2024-01-15 or 2024-01-15T09:30:00Z
        date: String,
        /// Pattern, e.g. "MMM dd, yyyy"
        pattern: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.backend_url.clone() {
        config.backend.url = url;
    }
    init_logging(&config.logging);

    match cli.command {
        Commands::Tables { columns } => {
            let backend = HttpBackend::new(config.backend.clone())?;
            let schema = backend.fetch_schema().await?;

            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
                return Ok(());
            }

            if schema.tables.is_empty() {
                println!("No tables found.");
                return Ok(());
            }

            println!("{:<30} {:<10} {}", "Table", "Columns", "Rows (est.)");
            println!("{}", "-".repeat(55));
            for table in &schema.tables {
                let rows = table
                    .row_count_estimate
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<30} {:<10} {}",
                    table.qualified_name(),
                    table.columns.len(),
                    rows
                );

                if columns {
                    for column in &table.columns {
                        let marker = if column.is_primary_key { " (pk)" } else { "" };
                        println!(
                            "    {:<26} {:<20} {}{}",
                            column.name,
                            column.data_type,
                            column.category(),
                            marker
                        );
                    }
                }
            }
        }

        Commands::Run {
            path,
            limit,
            date_format,
            pivot: pivot_args,
        } => {
            let saved = SavedQuery::load(&path)?;
            let Some(query) = executable(&saved.query) else {
                eprintln!("Query in {:?} is incomplete and cannot be run", path);
                std::process::exit(1);
            };

            let backend = HttpBackend::new(config.backend.clone())?;
            let mut result = backend.execute_query(&query, limit).await?;

            if let Some(pivot_config) = pivot_config(&pivot_args, &config) {
                result = pivot(&result, &pivot_config);
            }

            print_result(&result, cli.format, date_format.as_deref())?;
        }

        Commands::Sql { sql, date_format } => {
            let backend = HttpBackend::new(config.backend.clone())?;
            let result = backend.execute_sql(&sql).await?;
            print_result(&result, cli.format, date_format.as_deref())?;
        }

        Commands::Pivot {
            path,
            pivot: pivot_args,
        } => {
            let result = load_result(&path)?;
            let Some(pivot_config) = pivot_config(&pivot_args, &config) else {
                eprintln!("Both --pivot and --value are required");
                std::process::exit(1);
            };
            print_result(&pivot(&result, &pivot_config), cli.format, None)?;
        }

        Commands::Suggest { path, query, data } => {
            let result = load_result(&path)?;
            let selections: Vec<ColumnSelection> = match query {
                Some(query_path) => SavedQuery::load(&query_path)?.query.columns,
                None => Vec::new(),
            };

            let mut suggestions = suggest(&result, &selections);
            suggestions.truncate(config.suggest.max_suggestions);

            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else if suggestions.is_empty() {
                println!("No chart suggestions for this result.");
            } else {
                println!("{:<10} {:<12} {}", "Chart", "Confidence", "Reason");
                println!("{}", "-".repeat(60));
                for s in &suggestions {
                    println!("{:<10} {:<12.2} {}", s.chart_type, s.confidence, s.reason);
                }
            }

            if data {
                if let Some(top) = suggestions.first() {
                    println!("{}", serde_json::to_string_pretty(&top.chart_data(&result))?);
                }
            }
        }

        Commands::FormatDate { date, pattern } => {
            let Some(parsed) = parse_date_like(&date) else {
                eprintln!("Cannot parse date: {}", date);
                std::process::exit(1);
            };
            println!("{}", format_date(&parsed, &pattern));
        }

        Commands::Config { output } => {
            let template = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &template)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", template);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quarry={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn pivot_config(args: &PivotArgs, config: &Config) -> Option<PivotConfig> {
    let (Some(pivot_column), Some(value_column)) = (&args.pivot, &args.value) else {
        return None;
    };

    Some(PivotConfig {
        pivot_column: pivot_column.clone(),
        value_column: value_column.clone(),
        dimension_columns: args.dims.clone(),
        pivot_column_format: args
            .header_format
            .clone()
            .or_else(|| config.pivot.header_format.clone()),
    })
}

fn load_result(path: &Path) -> Result<QueryResult, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_result(
    result: &QueryResult,
    format: OutputFormat,
    date_format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => print_csv(result, date_format)?,
        OutputFormat::Table => print_table(result, date_format),
    }
    Ok(())
}

fn print_table(result: &QueryResult, date_format: Option<&str>) {
    if result.is_empty() {
        println!("No rows");
        return;
    }

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|v| format_cell(v, date_format)).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .fold(name.chars().count(), usize::max)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(result.columns.iter().map(String::as_str).collect()));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1)));
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }

    println!();
    let mut footer = format!("{} rows", result.row_count);
    if result.truncated {
        footer.push_str(" (truncated)");
    }
    if result.execution_time_ms > 0 {
        footer.push_str(&format!(" in {} ms", result.execution_time_ms));
    }
    println!("{}", footer);
}

fn print_csv(result: &QueryResult, date_format: Option<&str>) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(|v| format_cell(v, date_format)))?;
    }
    writer.flush()?;
    Ok(())
}
