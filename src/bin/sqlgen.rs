//! sqlgen — The sqlgen CLI
//!
//! Turns a directory of `.sql` files with `:named` parameters into Rust
//! query structs.
//!
//! # Usage
//!
//! ```bash
//! # Generate structs for every .sql file under queries/
//! sqlgen generate --root queries --out src/queries.rs
//!
//! # Target SQL Server placeholders
//! sqlgen generate --root queries --driver mssql
//!
//! # Rewrite a single query
//! sqlgen scan queries/authors/fetch.sql --style question
//! ```

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use sqlgen::bind::DRIVERS;
use sqlgen::prelude::*;
use tracing::Level;

#[derive(Parser)]
#[command(name = "sqlgen")]
#[command(version)]
#[command(about = "Named-parameter SQL rewriter and query struct generator", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlgen generate --root queries --out src/queries.rs
    sqlgen generate --root queries --driver mysql --module queries
    sqlgen scan queries/authors/create.sql --style at
    cat query.sql | sqlgen scan --format json")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate query structs from a directory of .sql files
    Generate(GenerateArgs),
    /// Rewrite a single query and show its parameters
    Scan {
        /// Query file to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Bind style for the rewritten query
        #[arg(short, long, value_parser = parse_style, default_value = "dollar")]
        style: BindStyle,

        /// Give every occurrence of a repeated name its own marker
        #[arg(long)]
        no_combine: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show bind styles and the drivers that use them
    Styles,
}

#[derive(Args)]
struct GenerateArgs {
    /// Config file (default: ./sqlgen.toml, then the user config dir)
    #[arg(short, long, env = "SQLGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory searched recursively for query files
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Bind style: question, dollar, named, at
    #[arg(short, long, value_parser = parse_style, conflicts_with = "driver")]
    style: Option<BindStyle>,

    /// Driver name used to pick the bind style (postgres, mysql, mssql, ...)
    #[arg(short, long)]
    driver: Option<String>,

    /// Combine repeated parameter names into one argument
    #[arg(long, conflicts_with = "no_combine")]
    combine: bool,

    /// Pass every occurrence of a parameter as its own argument
    #[arg(long)]
    no_combine: bool,

    /// Wrap the generated code in `pub mod <MODULE>`
    #[arg(short, long)]
    module: Option<String>,

    /// Rust type of every generated field
    #[arg(long)]
    value_type: Option<String>,

    /// Extension of query files
    #[arg(long)]
    extension: Option<String>,

    /// Octal permissions for the output file
    #[arg(long)]
    perms: Option<String>,

    /// Refuse query files larger than this many bytes
    #[arg(long)]
    max_file_bytes: Option<u64>,
}

impl GenerateArgs {
    /// Layer command-line flags over the loaded config.
    fn apply(self, config: &mut GenConfig) {
        if let Some(root) = self.root {
            config.root = root;
        }
        if self.out.is_some() {
            config.out = self.out;
        }
        if let Some(style) = self.style {
            config.style = style;
            config.driver = None;
        }
        if self.driver.is_some() {
            config.driver = self.driver;
        }
        if self.combine {
            config.combine_duplicates = true;
        }
        if self.no_combine {
            config.combine_duplicates = false;
        }
        if self.module.is_some() {
            config.module = self.module;
        }
        if let Some(value_type) = self.value_type {
            config.value_type = value_type;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }
        if let Some(perms) = self.perms {
            config.perms = perms;
        }
        if self.max_file_bytes.is_some() {
            config.max_file_bytes = self.max_file_bytes;
        }
    }
}

fn parse_style(s: &str) -> Result<BindStyle, String> {
    s.parse::<BindStyle>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Scan {
            file,
            style,
            no_combine,
            format,
        } => run_scan(file, style, !no_combine, &format),
        Commands::Styles => {
            show_styles();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut config = GenConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    if config.bind_style() == BindStyle::Unknown {
        tracing::warn!(
            driver = config.driver.as_deref().unwrap_or(""),
            "unrecognized driver, falling back to `?` markers"
        );
    }

    let mut stdout = std::io::stdout().lock();
    let generated = sqlgen::generator::run(&config, &mut stdout)?;

    if let Some(path) = &config.out {
        eprintln!(
            "{} Wrote {} {} to {}",
            "✓".green(),
            generated.groups.len().to_string().cyan(),
            if generated.groups.len() == 1 { "query" } else { "queries" },
            path.display().to_string().cyan()
        );
    }
    Ok(())
}

fn run_scan(
    file: Option<PathBuf>,
    style: BindStyle,
    combine_duplicates: bool,
    format: &OutputFormat,
) -> Result<()> {
    let query = match &file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let out = scan(&query, style, combine_duplicates);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{}", "Rewritten SQL:".green().bold());
            for line in out.sql.lines() {
                println!("  {}", line.white());
            }

            println!();
            if out.params.is_empty() {
                println!("{}", "(no parameters)".dimmed());
            } else {
                println!("{}", "Parameters:".cyan());
                for (i, name) in out.params.iter().enumerate() {
                    println!("  {:>3}. {}", i + 1, name.yellow());
                }
            }

            if let Some(region) = out.unterminated {
                println!();
                println!(
                    "{}",
                    format!("⚠ Query ends inside an unterminated {}", region.describe()).yellow()
                );
            }
        }
    }

    Ok(())
}

fn show_styles() {
    println!("{}", "sqlgen Bind Styles".cyan().bold());
    println!();

    println!(
        "{:10} {:8} {}",
        "Style".white().bold(),
        "Marker".white().bold(),
        "Drivers".white().bold()
    );
    println!("{}", "─".repeat(60).dimmed());

    for style in BindStyle::ALL {
        let drivers: Vec<&str> = DRIVERS
            .iter()
            .filter(|(_, s)| *s == style)
            .map(|(name, _)| *name)
            .collect();
        let drivers = if drivers.is_empty() {
            "(any other driver)".to_string()
        } else {
            drivers.join(", ")
        };
        println!(
            "{:10} {:8} {}",
            style.as_str().cyan().bold(),
            style.marker(1, "name").yellow(),
            drivers.dimmed()
        );
    }
}
