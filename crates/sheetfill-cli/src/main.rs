//! Sheetfill CLI - fill XLSX templates from the command line

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use sheetfill::prelude::*;
use sheetfill::{FieldKey, SheetRef};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetfill")]
#[command(author, version, about = "Fill spreadsheet templates from field bindings")]
struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template and write the result
    Fill {
        /// Template spreadsheet (xlsx)
        #[arg(short, long)]
        template: PathBuf,

        /// JSON file holding a flat object of field keys to values
        #[arg(short, long)]
        fields: Option<PathBuf>,

        /// Bind a single field (repeatable); overrides --fields
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Write the result to this exact file
        #[arg(short, long, conflicts_with_all = ["output_dir", "request_id"])]
        output: Option<PathBuf>,

        /// Directory for request-named output files
        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,

        /// Request id used in the output file name (default: random UUID)
        #[arg(long)]
        request_id: Option<String>,

        /// Insert new rows in row order instead of appending them
        #[arg(long)]
        sorted_rows: bool,

        /// How new cells are ordered within a row
        #[arg(long, value_enum, default_value_t = CellOrder::Lexical)]
        cell_order: CellOrder,
    },

    /// List the defined names of a workbook
    Names {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// Print the text of the cell a field key resolves to
    Get {
        /// Input spreadsheet file
        input: PathBuf,

        /// Cell token (E7) or defined name (rngFirstName)
        key: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CellOrder {
    /// Compare references as text (AA1 before B1)
    Lexical,
    /// Compare by column, then row (B1 before AA1)
    ColumnRank,
}

impl From<CellOrder> for CellOrdering {
    fn from(order: CellOrder) -> Self {
        match order {
            CellOrder::Lexical => CellOrdering::Lexical,
            CellOrder::ColumnRank => CellOrdering::ColumnRank,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fill {
            template,
            fields,
            set,
            output,
            output_dir,
            request_id,
            sorted_rows,
            cell_order,
        } => {
            let bindings = load_bindings(fields.as_deref(), &set)?;
            let options = FillOptions {
                layout: LayoutOptions {
                    row_placement: if sorted_rows {
                        RowPlacement::Sorted
                    } else {
                        RowPlacement::Append
                    },
                    cell_ordering: cell_order.into(),
                },
            };
            match output {
                Some(output) => fill_to_file(&template, &output, &bindings, &options),
                None => generate(template, output_dir, request_id, &bindings, options),
            }
        }
        Commands::Names { input } => list_names(&input),
        Commands::Get { input, key } => get_cell(&input, &key),
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` picks the level
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_bindings(fields: Option<&Path>, set: &[String]) -> Result<FieldBindings> {
    let mut bindings = match fields {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse fields from '{}'", path.display()))?
        }
        None => FieldBindings::new(),
    };

    for pair in set {
        let (key, value) = parse_assignment(pair)?;
        bindings.set(key, Some(value.to_string()));
    }

    tracing::debug!(count = bindings.len(), "loaded field bindings");
    Ok(bindings)
}

fn parse_assignment(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Invalid --set '{}': expected KEY=VALUE", pair),
    }
}

fn fill_to_file(
    template: &Path,
    output: &Path,
    bindings: &FieldBindings,
    options: &FillOptions,
) -> Result<()> {
    if !template.is_file() {
        bail!("Template not found: {}", template.display());
    }
    let mut doc = Document::open(template)
        .with_context(|| format!("Failed to open '{}'", template.display()))?;
    let report = doc.fill(bindings, options).context("Failed to fill template")?;
    doc.save_file(output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    print_report(&report);
    println!("{}", output.display());
    Ok(())
}

fn generate(
    template: PathBuf,
    output_dir: PathBuf,
    request_id: Option<String>,
    bindings: &FieldBindings,
    options: FillOptions,
) -> Result<()> {
    let generator = TemplateGenerator::new(
        GeneratorConfig::new(template)
            .with_output_dir(output_dir)
            .with_options(options),
    );
    let generated = generator
        .generate(bindings, request_id.as_deref())
        .context("Failed to generate spreadsheet")?;

    print_report(&generated.report);
    if let Some(path) = generated.output_path {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_report(report: &FillReport) {
    eprintln!(
        "Wrote {} field(s), {} blank, {} skipped",
        report.written.len(),
        report.blank.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        eprintln!("  skipped {}: {}", skipped.key, skipped.reason);
    }
}

fn list_names(input: &Path) -> Result<()> {
    let doc =
        Document::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    for name in doc.defined_names().iter() {
        if name.hidden {
            println!("{}: {} (hidden)", name.name, name.refers_to);
        } else {
            println!("{}: {}", name.name, name.refers_to);
        }
    }

    Ok(())
}

fn get_cell(input: &Path, key: &str) -> Result<()> {
    let mut doc =
        Document::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    let target = FieldKey::classify(key)
        .and_then(|field| field.resolve(doc.defined_names()))
        .with_context(|| format!("Cannot resolve '{}'", key))?;

    let index = match doc.sheet_index(&target.sheet) {
        Some(index) => index,
        None => match &target.sheet {
            SheetRef::First => bail!("Workbook has no worksheets"),
            SheetRef::Named(name) => bail!("Worksheet not found: {}", name),
        },
    };

    let text = doc
        .cell_text(index, &target.address)
        .with_context(|| format!("Failed to read {}", target.address))?;
    println!("{}", text.unwrap_or_default());
    Ok(())
}
