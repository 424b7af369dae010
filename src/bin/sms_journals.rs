use std::{
    path::{Path, PathBuf},
    process,
};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use sms_journal_core::{
    core::services::{ClassificationReport, JournalRequest, JournalSet, SplitReport},
    domain::{JournalKind, SmsKind, SummaryTables},
    init,
    storage::{columns, records, CsvStorage},
    utils::{build_info, format::format_amount},
    ConfigManager, Pipeline, PipelineConfig, PipelineResult,
};

const PROCESSED_SHEET: &str = "Processed_SMS";
const SALES_SHEET: &str = "Sales by Subsidiary";
const USAGE_SHEET: &str = "Overall Plan Usage";
const TOTALS_SHEET: &str = "Totals";

#[derive(Debug, Parser)]
#[command(
    name = "sms_journals",
    version,
    about = "Generate SMS DDI and Plan accrual journals from an accrual export"
)]
struct Cli {
    /// Pipeline configuration file (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Filter and classify SMS rows, writing Processed_SMS.csv.
    Process {
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Build the summary tables from a processed file.
    Summarize {
        processed: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate DDI and Plan journals from a processed file.
    Journals {
        processed: PathBuf,
        #[command(flatten)]
        date: DateArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Split previously generated journals into upload-sized files.
    ///
    /// Split files left in the output directory by an earlier run for the same
    /// journal and month are removed first.
    Split {
        /// DDI journal CSV.
        ddi: PathBuf,
        /// Plan journal CSV.
        plan: PathBuf,
        #[command(flatten)]
        journal: JournalArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run every stage on a raw export.
    Run {
        input: PathBuf,
        #[command(flatten)]
        journal: JournalArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Manage configuration files.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print build metadata.
    Version,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Write the default configuration to a file.
    Init { path: PathBuf },
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Directory receiving the generated CSV files.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct DateArgs {
    /// Journal date (YYYY-MM-DD); its month names the memos.
    #[arg(long)]
    date: NaiveDate,
}

#[derive(Debug, Args)]
struct JournalArgs {
    /// Journal date (YYYY-MM-DD); its month names the memos and split files.
    #[arg(long)]
    date: NaiveDate,
    /// Override the configured maximum rows per split file.
    #[arg(long)]
    row_limit: Option<usize>,
}

fn main() {
    init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run(cli: Cli) -> PipelineResult<()> {
    let manager = cli.config.as_deref().map(ConfigManager::new);
    let load = |row_limit: Option<usize>| -> PipelineResult<Pipeline> {
        let mut config = match &manager {
            Some(manager) => manager.load()?,
            None => PipelineConfig::default(),
        };
        if let Some(limit) = row_limit {
            config.row_limit = limit;
        }
        Pipeline::from_config(config)
    };

    match cli.command {
        Command::Process { input, output } => {
            let pipeline = load(None)?;
            let storage = CsvStorage::new(output.output)?;
            let report = pipeline.classify(&CsvStorage::read(&input)?)?;
            write_processed(&storage, &report)?;
            print_classification(&report);
        }
        Command::Summarize { processed, output } => {
            let pipeline = load(None)?;
            let storage = CsvStorage::new(output.output)?;
            let table = CsvStorage::read(&processed)?;
            let rows = records::processed_rows(&table, PROCESSED_SHEET, columns::SUMMARY_INPUT)?;
            let summary = pipeline.summarize(&rows);
            write_summary(&storage, &summary)?;
            print_summary(&summary);
        }
        Command::Journals {
            processed,
            date,
            output,
        } => {
            let pipeline = load(None)?;
            let storage = CsvStorage::new(output.output)?;
            let table = CsvStorage::read(&processed)?;
            let rows = records::processed_rows(&table, PROCESSED_SHEET, columns::JOURNAL_INPUT)?;
            let request = JournalRequest::new(date.date);
            let journals = pipeline.journals(&rows, &request);
            write_journals(&storage, &journals, &pipeline.config().date_format)?;
            print_reversal(&request);
        }
        Command::Split {
            ddi,
            plan,
            journal,
            output,
        } => {
            let pipeline = load(journal.row_limit)?;
            let storage = CsvStorage::new(output.output)?;
            let request = JournalRequest::new(journal.date);
            let format = pipeline.config().date_format.clone();
            for (kind, path) in [(JournalKind::Ddi, ddi), (JournalKind::Plan, plan)] {
                let table = CsvStorage::read(&path)?;
                let loaded = records::journal_from_table(&table, kind, &format)?;
                let report = pipeline.split(&loaded)?;
                write_splits(&storage, &report, &request, &format)?;
            }
        }
        Command::Run {
            input,
            journal,
            output,
        } => {
            let pipeline = load(journal.row_limit)?;
            let storage = CsvStorage::new(output.output)?;
            let result = pipeline.run(&CsvStorage::read(&input)?, journal.date)?;
            let format = &pipeline.config().date_format;

            write_processed(&storage, &result.classification)?;
            print_classification(&result.classification);
            write_summary(&storage, &result.summary)?;
            print_summary(&result.summary);
            write_journals(&storage, &result.journals, format)?;
            print_reversal(&result.request);
            write_splits(&storage, &result.ddi_splits, &result.request, format)?;
            write_splits(&storage, &result.plan_splits, &result.request, format)?;
        }
        Command::Config {
            action: ConfigAction::Init { path },
        } => {
            let manager = ConfigManager::new(path);
            manager.save(&PipelineConfig::default())?;
            println!(
                "{} wrote default configuration to {}",
                "[✓]".green(),
                manager.path().display()
            );
        }
        Command::Version => {
            println!("{}", build_info::current());
        }
    }
    Ok(())
}

fn write_processed(storage: &CsvStorage, report: &ClassificationReport) -> PipelineResult<()> {
    let path = storage.write(PROCESSED_SHEET, &records::processed_table(&report.rows))?;
    print_written(&path, report.rows.len());
    Ok(())
}

fn write_summary(storage: &CsvStorage, summary: &SummaryTables) -> PipelineResult<()> {
    let tables = [
        (SALES_SHEET, records::sales_by_subsidiary_table(summary)),
        (USAGE_SHEET, records::usage_by_location_table(summary)),
        (TOTALS_SHEET, records::totals_table(summary)),
    ];
    for (name, table) in tables {
        let path = storage.write(name, &table)?;
        print_written(&path, table.len());
    }
    Ok(())
}

fn write_journals(
    storage: &CsvStorage,
    journals: &JournalSet,
    date_format: &str,
) -> PipelineResult<()> {
    for generated in [&journals.ddi, &journals.plan] {
        let path = storage.write(
            generated.kind.sheet_name(),
            &records::journal_table(&generated.entries, date_format),
        )?;
        print_written(&path, generated.len());
    }
    if journals.unknown_locations > 0 {
        println!(
            "{} {} SMS rows were posted to the Unknown location",
            "[!]".yellow(),
            journals.unknown_locations
        );
    }
    Ok(())
}

fn write_splits(
    storage: &CsvStorage,
    report: &SplitReport,
    request: &JournalRequest,
    date_format: &str,
) -> PipelineResult<()> {
    section(&format!("Processing {} Journal", report.kind));
    let month = request.month_name();
    let stale = storage.remove_numbered(&report.file_prefix(&month))?;
    if stale > 0 {
        println!(
            "{} removed {} split files from an earlier run",
            "[!]".yellow(),
            stale
        );
    }
    for batch in &report.batches {
        let name = report.file_name(&month, batch);
        storage.write(&name, &records::journal_table(&batch.entries, date_format))?;
        println!(
            "Split {}: Debit: ${}, Credit: ${} ({} rows) -> {}.csv",
            batch.index,
            format_amount(batch.debit_total),
            format_amount(batch.credit_total),
            batch.len(),
            name
        );
    }
    println!(
        "{} Total {} Journal: Debit: ${}, Credit: ${}",
        "[✓]".green(),
        report.kind,
        format_amount(report.debit_total),
        format_amount(report.credit_total)
    );
    Ok(())
}

fn section(title: &str) {
    println!("\n{}", title.bold());
}

fn print_written(path: &Path, rows: usize) {
    println!("{} {} ({} rows)", "[✓]".green(), path.display(), rows);
}

fn print_classification(report: &ClassificationReport) {
    section("Totals:");
    println!("- Total Amount: {}", format_amount(report.total_amount()));
    println!(
        "- Usage Total: {}",
        format_amount(report.total_for(SmsKind::Usage))
    );
    println!(
        "- Bundle/Purchase Total: {}",
        format_amount(report.total_for(SmsKind::BundlePurchase))
    );
    if report.defaulted_types > 0 {
        println!(
            "{} {} SMS rows had no recognised SMS TYPE and were treated as Bundle/Purchase",
            "[!]".yellow(),
            report.defaulted_types
        );
    }
    if report.unknown_regions > 0 {
        println!(
            "{} {} SMS rows have an Unknown region",
            "[!]".yellow(),
            report.unknown_regions
        );
    }
}

fn print_summary(summary: &SummaryTables) {
    section("Sales by Subsidiary:");
    for row in &summary.sales_by_subsidiary {
        println!(
            "Subsidiary: {}, Usage: {}, Bundle/Purchase: {}, Grand Total: {}",
            row.subsidiary,
            format_amount(row.usage),
            format_amount(row.bundle_purchase),
            format_amount(row.grand_total())
        );
    }
    for (label, amount) in summary.totals.rows() {
        println!("{}: {}", label, format_amount(amount));
    }
}

fn print_reversal(request: &JournalRequest) {
    if let Some(reversal) = request.reversal_date() {
        println!("Accrual reverses on {}", reversal);
    }
}
