//! Trender CLI - exports the survey-trend workbook to report JSON

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};

use trender_report::{extract_sections, ReportPayload};
use trender_xlsx::{read_chart_parts, XlsxReader};

#[derive(Parser)]
#[command(name = "trender")]
#[command(
    author,
    version,
    about = "Svenska trender workbook exporter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the workbook's charts, tables and metadata to a JSON payload
    Export {
        /// Path to the macro-enabled Excel workbook
        #[arg(long, default_value = "3. Svenska trender 1986-2024.xlsm")]
        workbook: PathBuf,

        /// Destination JSON path
        #[arg(long, default_value = "data/report-data.json")]
        output: PathBuf,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook file
        input: PathBuf,
    },

    /// Show information about a workbook
    Info {
        /// Input workbook file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export { workbook, output } => export(&workbook, &output),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Info { input } => show_info(&input),
    }
}

fn export(workbook_path: &Path, output_path: &Path) -> Result<()> {
    let workbook = XlsxReader::read_file(workbook_path)
        .with_context(|| format!("Failed to open '{}'", workbook_path.display()))?;
    let chart_parts = read_chart_parts(workbook_path)
        .with_context(|| format!("Failed to read chart parts from '{}'", workbook_path.display()))?;

    let sections = extract_sections(&workbook, &chart_parts);

    let source_name = workbook_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| workbook_path.display().to_string());
    let payload = ReportPayload::new(
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        source_name,
        sections,
    );

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write '{}'", output_path.display()))?;

    let processed: Vec<&str> = payload
        .sections
        .iter()
        .flat_map(|section| section.indicators.iter().map(|i| i.sheet.as_str()))
        .collect();
    println!(
        "Wrote {} with {} sections and {} indicators.",
        output_path.display(),
        payload.section_count,
        processed.len()
    );

    // Header sheets are expected to be absent from the payload; anything
    // else missing deserves a closer look at the source workbook
    let processed_set: BTreeSet<&str> = processed.iter().copied().collect();
    let missing: Vec<&str> = workbook
        .sheet_names()
        .into_iter()
        .filter(|name| {
            !processed_set.contains(name) && !trender_report::section::is_section_header(name)
        })
        .collect();
    if missing.is_empty() {
        println!(
            "SUCCESS: All {} content sheets processed",
            processed.len()
        );
    } else {
        println!(
            "WARNING: Missing sheets ({}): {}",
            missing.len(),
            missing.join(", ")
        );
    }

    let tail: Vec<&str> = processed.iter().rev().take(10).rev().copied().collect();
    println!("Last {} processed: {}", tail.len(), tail.join(", "));

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, name) in workbook.sheet_names().iter().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let chart_parts = read_chart_parts(input)
        .with_context(|| format!("Failed to read chart parts from '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());
    println!("Chart parts: {}", chart_parts.len());

    for (i, sheet) in workbook.worksheets().enumerate() {
        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());
        if let Some(range) = sheet.used_range() {
            println!(
                "    Used range: {} rows x {} columns",
                range.row_count(),
                range.col_count()
            );
        } else {
            println!("    Used range: empty");
        }
    }

    Ok(())
}
