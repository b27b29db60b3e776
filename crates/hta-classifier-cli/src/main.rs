// HTA Classifier CLI
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use hta_classifier_core::classify::{self, LabelCount};
use hta_classifier_core::export::{
    write_record_report, PatientReportExport, ReportMetadata, DEFAULT_RECORD_REPORT,
};
use hta_classifier_core::{Classifier, Config, PatientReport};

mod logging;

/// Default patient report directory.
const DEFAULT_PATIENT_REPORT_DIR: &str = "reporte_pacientes";

#[derive(Parser)]
#[command(name = "hta-classifier")]
#[command(version)]
#[command(about = "Classify medication records by antihypertensive drug class", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file (columns, delimiters, taxonomy, stopwords)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Label every record and write the rows that matched
    Records {
        /// Input CSV files
        #[arg(short, long = "input", value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output CSV file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_RECORD_REPORT)]
        output: PathBuf,

        /// Also write the label counts as JSON
        #[arg(long, value_name = "FILE")]
        summary_json: Option<PathBuf>,
    },

    /// Aggregate medications per patient and write the patient report
    Patients {
        /// Input CSV files
        #[arg(short, long = "input", value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = DEFAULT_PATIENT_REPORT_DIR)]
        output: PathBuf,
    },

    /// Classify medication texts given on the command line
    Classify {
        /// Medication texts
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let classifier = build_classifier(cli.config)?;

    match cli.command {
        Commands::Records {
            inputs,
            output,
            summary_json,
        } => records_command(&classifier, inputs, output, summary_json),
        Commands::Patients { inputs, output } => patients_command(&classifier, inputs, output),
        Commands::Classify { texts } => classify_command(&classifier, &texts),
    }
}

fn build_classifier(config: Option<PathBuf>) -> Result<Classifier> {
    let config = match config {
        Some(path) => Config::from_json_file(&path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    Classifier::new(config).context("Invalid drug taxonomy in config")
}

fn records_command(
    classifier: &Classifier,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    summary_json: Option<PathBuf>,
) -> Result<()> {
    let input = classifier.load(&inputs).context("Failed to load input files")?;
    let result = classifier.classify_records(&input.records);

    write_record_report(&output, &input.dataset.headers, &result)
        .with_context(|| format!("Failed to write record report: {}", output.display()))?;

    if let Some(path) = summary_json {
        let json = result.summary_json().context("Failed to serialize summary")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    }

    println!(
        "✓ {} of {} rows classified → {}",
        result.records.len(),
        result.total_rows,
        output.display()
    );
    print_label_counts(&result.summary);

    Ok(())
}

fn patients_command(classifier: &Classifier, inputs: Vec<PathBuf>, output: PathBuf) -> Result<()> {
    let input = classifier.load(&inputs).context("Failed to load input files")?;
    let aggregates = classifier.aggregate_patients(&input.records);

    let report = PatientReport::build(&aggregates);
    let export = PatientReportExport::new(
        report,
        ReportMetadata::new(&input.dataset.sources, &aggregates),
    );
    let written = export
        .write_to_dir(&output)
        .with_context(|| format!("Failed to write patient report: {}", output.display()))?;

    println!(
        "✓ {} patients with antihypertensives → {} ({} files)",
        aggregates.len(),
        output.display(),
        written.len()
    );
    for entry in &export.report.summary {
        println!("  {:<60} {:>6}", entry.category, entry.count);
    }

    Ok(())
}

fn classify_command(classifier: &Classifier, texts: &[String]) -> Result<()> {
    for text in texts {
        let result = classifier.analyze(text);
        let groups: Vec<&str> = result.groups.iter().map(|g| g.code()).collect();

        println!("{}", text);
        println!("  groups: {}", if groups.is_empty() { "-".to_string() } else { groups.join(", ") });
        println!("  extra:  {}", result.has_extra);
        println!("  label:  {}", classify::label_for(&result));
    }

    Ok(())
}

fn print_label_counts(summary: &[LabelCount]) {
    if summary.is_empty() {
        return;
    }
    println!("\nLabel counts:");
    for entry in summary {
        println!("  {:<60} {:>6}", entry.label, entry.count);
    }
}
