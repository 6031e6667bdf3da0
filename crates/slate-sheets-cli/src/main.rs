//! Slate Sheets CLI - evaluate spreadsheets and inspect formulas

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use slate_sheets::prelude::*;
use slate_sheets::{parse_formula, tokenize};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slate")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every cell of a CSV file and print the results as CSV
    Eval {
        /// Input CSV file, one cell per field
        input: PathBuf,

        /// Format to apply before evaluating, as RANGE=KIND[:SPEC]
        /// (e.g. "B1:B9=number:%.2f", "C1=date:%Y-%m-%d")
        #[arg(short, long = "format", value_name = "RANGE=KIND[:SPEC]")]
        formats: Vec<FormatArg>,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Print the evaluated value of one cell
    Get {
        /// Input CSV file
        input: PathBuf,

        /// Cell to evaluate (e.g. "B3")
        index: String,
    },

    /// Print the expression tree of a formula
    Parse {
        /// Formula text, with or without the leading '='
        formula: String,
    },

    /// Print the tokens of a formula, one per line
    Tokens {
        /// Formula text, without the leading '='
        formula: String,
    },

    /// Show information about a CSV spreadsheet
    Info {
        /// Input CSV file
        input: PathBuf,
    },
}

/// A `RANGE=KIND[:SPEC]` argument
#[derive(Debug, Clone)]
struct FormatArg {
    range: Range,
    kind: FormatKind,
    spec: Option<String>,
}

impl FromStr for FormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (target, format) = s
            .split_once('=')
            .ok_or_else(|| format!("expected RANGE=KIND[:SPEC], got '{}'", s))?;

        let range = if target.contains(':') {
            Range::parse(target)
        } else {
            Index::parse(target).map(Range::single)
        }
        .map_err(|e| e.to_string())?;

        let (kind, spec) = match format.split_once(':') {
            Some((kind, spec)) => (kind, Some(spec.to_string())),
            None => (format, None),
        };
        let kind = kind.parse::<FormatKind>().map_err(|e| e.to_string())?;

        Ok(Self { range, kind, spec })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval {
            input,
            formats,
            output,
            delimiter,
        } => eval(&input, &formats, output.as_deref(), delimiter),
        Commands::Get { input, index } => get(&input, &index),
        Commands::Parse { formula } => show_tree(&formula),
        Commands::Tokens { formula } => show_tokens(&formula),
        Commands::Info { input } => show_info(&input),
    }
}

/// Install the stderr log subscriber
///
/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, falling back
/// to warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open(input: &Path) -> Result<Spreadsheet> {
    Spreadsheet::open_csv(input, &CsvReadOptions::default())
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn eval(input: &Path, formats: &[FormatArg], output: Option<&Path>, delimiter: char) -> Result<()> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| anyhow!("Delimiter must be a single ASCII character, got '{}'", delimiter))?;

    let mut sheet = open(input)?;
    for format in formats {
        sheet
            .set_range_format(&format.range, format.kind, format.spec.as_deref())
            .with_context(|| format!("Failed to apply format to {}", format.range))?;
    }

    let options = CsvWriteOptions {
        delimiter,
        ..Default::default()
    };

    match output {
        Some(path) => {
            sheet
                .save_csv(path, &options)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!(path = %path.display(), "wrote evaluated sheet");
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            sheet
                .write_csv(&mut out, &options)
                .context("Failed to write to stdout")?;
            out.flush().context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn get(input: &Path, label: &str) -> Result<()> {
    let index = Index::parse(label).with_context(|| format!("Invalid cell '{}'", label))?;
    let sheet = open(input)?;
    println!("{}", sheet.get_formatted(index));
    Ok(())
}

fn show_tree(formula: &str) -> Result<()> {
    let expr = parse_formula(formula).with_context(|| format!("Failed to parse '{}'", formula))?;
    println!("{}", expr.to_sexpr());
    Ok(())
}

fn show_tokens(formula: &str) -> Result<()> {
    let tokens = tokenize(formula).with_context(|| format!("Failed to tokenize '{}'", formula))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for token in &tokens {
        writeln!(out, "{} '{}'", token.kind.name(), token.text)?;
    }
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let sheet = open(input)?;
    let worksheet = sheet.worksheet();

    println!("File: {}", input.display());
    match worksheet.used_range() {
        Some(range) => println!(
            "Used range: {} ({} rows x {} columns)",
            range,
            range.height(),
            range.width()
        ),
        None => {
            println!("Used range: empty");
            return Ok(());
        }
    }

    let formulas: Vec<Index> = worksheet.formula_cells().map(|(index, _)| index).collect();
    let errors = formulas
        .iter()
        .filter(|index| CellError::from_str(&sheet.get_formatted(**index)).is_some())
        .count();

    println!("Cells: {}", worksheet.len());
    println!("Formulas: {}", formulas.len());
    if errors > 0 {
        println!("Formulas with errors: {}", errors);
    }
    Ok(())
}
