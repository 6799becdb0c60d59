use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use timetable_normalize::{
    DEFAULT_ROW_LABEL, DEFAULT_SHEET_NAME, ExportOptions, NormalizationReport, NormalizeOptions,
    NormalizedTable, Personalized, PipelineWarning, Selection, export_personal_timetable_to_path,
    extract_subjects, normalize_workbook, normalized_table_to_csv, personal_table_to_csv_string,
    personalize,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "timetable",
    version,
    about = "Normalize a published timetable workbook and build personal timetables"
)]
struct Cli {
    /// Name given to the row-label column.
    #[arg(long, global = true, default_value = DEFAULT_ROW_LABEL)]
    row_label: String,

    /// Enable verbose warning output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the selectable subject tokens, one per line.
    Subjects(InputArgs),
    /// Write the normalized table as CSV.
    Normalize(NormalizeArgs),
    /// Write a personal timetable for the selected subjects.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Input XLSX path.
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    #[command(flatten)]
    source: InputArgs,

    /// Output CSV path.
    #[arg(short, long)]
    output: PathBuf,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    source: InputArgs,

    /// Output path; `.csv` writes CSV, anything else XLSX.
    #[arg(short, long)]
    output: PathBuf,

    /// Subject tokens, comma or space separated. Repeatable.
    #[arg(short, long = "subject")]
    subjects: Vec<String>,

    /// Worksheet name of the generated workbook.
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Delimiter character when writing CSV.
    #[arg(long, default_value = ",")]
    delimiter: char,
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }
    Ok(delimiter as u8)
}

fn log_warnings(warnings: &[PipelineWarning], verbose: bool) {
    if warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", warnings.len());
    if verbose {
        for warning in warnings {
            eprintln!(
                "  - {:?} region={:?}: {}",
                warning.code, warning.region, warning.message
            );
        }
    }
}

fn load(cli: &Cli, input: &Path) -> Result<(NormalizedTable, NormalizationReport)> {
    let options = NormalizeOptions {
        row_label_name: cli.row_label.clone(),
        ..NormalizeOptions::default()
    };
    let (table, report) = normalize_workbook(input, &options)
        .with_context(|| format!("failed to normalize '{}'", input.display()))?;
    log_warnings(&report.warnings, cli.verbose);
    Ok((table, report))
}

fn run_subjects(cli: &Cli, args: &InputArgs) -> Result<ExitCode> {
    let (table, _) = load(cli, &args.input)?;
    let subjects = extract_subjects(&table);
    for subject in subjects.iter() {
        println!("{subject}");
    }
    Ok(if subjects.is_empty() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn run_normalize(cli: &Cli, args: &NormalizeArgs) -> Result<ExitCode> {
    let delimiter = delimiter_byte(args.delimiter)?;
    let (table, report) = load(cli, &args.source.input)?;
    normalized_table_to_csv(&table, &args.output, delimiter)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    tracing::info!(
        rows = report.row_count,
        columns = report.column_count,
        "wrote normalized table"
    );
    Ok(ExitCode::SUCCESS)
}

fn run_generate(cli: &Cli, args: &GenerateArgs) -> Result<ExitCode> {
    let selection = Selection::parse_list(&args.subjects.join(","));

    let (table, _) = load(cli, &args.source.input)?;
    let personal = match personalize(&table, &selection) {
        Personalized::Table(personal) => personal,
        Personalized::NothingSelected(warning) => {
            log_warnings(&[warning], cli.verbose);
            return Ok(ExitCode::from(2));
        }
    };

    let is_csv = args
        .output
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));
    if is_csv {
        let csv = personal_table_to_csv_string(&personal, delimiter_byte(args.delimiter)?)?;
        std::fs::write(&args.output, csv)
            .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    } else {
        let options = ExportOptions {
            sheet_name: args.sheet_name.clone(),
            ..ExportOptions::default()
        };
        export_personal_timetable_to_path(&personal, &args.output, &options)
            .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    }

    tracing::info!(rows = personal.rows.len(), "wrote personal timetable");
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("timetable_normalize=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Subjects(args) => run_subjects(&cli, args),
        Commands::Normalize(args) => run_normalize(&cli, args),
        Commands::Generate(args) => run_generate(&cli, args),
    };

    match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
