// reset; cargo run -- --input-file data/input/recibos_ejemplos.xlsx
// reset; cargo run -- --input-file demo.csv --assume-yes

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use recibos_importer::{
    logging::TracingLog,
    model::{Dataset, DateRangeOutcome, RecordLoader, Summary},
    ERRORS_LOG_FILE, EXPECTED_COLUMNS,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recibos-importer")]
#[command(about = "Loads and validates a spreadsheet of fee receipts before submission")]
#[command(version)]
struct Args {
    /// Path to the spreadsheet with the receipt records
    #[arg(short, long, default_value = "data/input/recibos_ejemplos.xlsx")]
    input_file: PathBuf,

    /// Optional sheet name (XLSX only; defaults to the first sheet)
    #[arg(long)]
    sheet_name: Option<String>,

    /// Process records without asking for confirmation
    #[arg(long)]
    assume_yes: bool,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let arguments = Args::parse();

    print_directory_diagnostic()?;

    println!("{}", "=".repeat(60));
    println!("🤖 RECIBOS POR HONORARIOS");
    println!("{}", "=".repeat(60));

    let log = TracingLog;
    let loader = RecordLoader::new(&log);

    if !loader.locate(&arguments.input_file) {
        println!("❌ Cannot continue without the input file");
        return Ok(());
    }

    let mut dataset = match loader.load(&arguments.input_file, arguments.sheet_name.as_deref()) {
        Ok(dataset) => dataset,
        Err(e) => {
            println!("❌ Failed to read the input file: {e}");
            return Ok(());
        }
    };

    let report = loader.validate(&dataset, &EXPECTED_COLUMNS);
    if !report.is_valid {
        println!("⚠️ The spreadsheet structure has problems, check {ERRORS_LOG_FILE} for details");
    }

    let summary = loader.summarize(&mut dataset);
    print_summary(&dataset, &summary);

    let proceed = arguments.assume_yes || confirm_processing()?;
    if proceed {
        loader.process_all(&dataset);
    } else {
        println!("👋 Processing cancelled by the user");
    }

    Ok(())
}

/// Lists the working directory and the expected `data/input` layout, so
/// a misplaced input file is obvious before anything else runs.
fn print_directory_diagnostic() -> Result<()> {
    println!("🔍 FILE DIAGNOSTIC:");
    println!("📂 Working directory: {}", std::env::current_dir()?.display());
    println!("📁 Entries in the working directory:");
    for entry in fs::read_dir(".")? {
        println!("   - {}", entry?.file_name().to_string_lossy());
    }

    if Path::new("data").is_dir() {
        println!("✅ Directory 'data' found");
        if Path::new("data/input").is_dir() {
            println!("✅ Directory 'data/input' found");
            println!("📁 Entries in data/input:");
            for entry in fs::read_dir("data/input")? {
                println!("   - {}", entry?.file_name().to_string_lossy());
            }
        } else {
            println!("❌ Directory 'data/input' NOT found");
        }
    } else {
        println!("❌ Directory 'data' NOT found");
    }

    Ok(())
}

fn print_summary(dataset: &Dataset, summary: &Summary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("📊 LOADED DATA SUMMARY");
    println!("{}", "=".repeat(60));

    println!("🔍 First rows:");
    for (position, record) in dataset.numbered().take(3) {
        println!(
            "   {position}. {} | {} | S/ {}",
            record.client_name.as_deref().unwrap_or("<unknown>"),
            record.concept.as_deref().unwrap_or("<no concept>"),
            record
                .total
                .map(|t| format!("{t:.2}"))
                .unwrap_or_else(|| "<missing>".to_string()),
        );
    }

    if let Some(stats) = &summary.totals {
        println!("💰 Grand total: S/ {:.2}", stats.sum);
        println!("📈 Average amount: S/ {:.2}", stats.mean);
    }
    println!("🎯 Receipt count: {}", summary.record_count);

    match &summary.date_range {
        DateRangeOutcome::Range { min, max } => println!(
            "📅 Date range: {} - {}",
            min.format("%d/%m/%Y"),
            max.format("%d/%m/%Y")
        ),
        DateRangeOutcome::CoercionFailed => println!("📅 Dates: could not be processed"),
        DateRangeOutcome::ColumnAbsent | DateRangeOutcome::NoDates => {}
    }
}

fn confirm_processing() -> Result<bool> {
    println!();
    println!("{}", "=".repeat(60));
    print!("Process all receipts? (si/no): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("si"))
}
