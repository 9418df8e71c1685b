//! Output encodings for resolution results.

use std::io::{self, Write};

use serde::Serialize;
use tattle_core::{AppUsage, FileUsageReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Jsonl,
    Json,
    Csv,
    Tsv,
}

#[derive(Serialize)]
struct Record<'a> {
    app: AppRecord<'a>,
    file: FileRecord,
}

#[derive(Serialize)]
struct AppRecord<'a> {
    name: &'a str,
    pid: u32,
    #[serde(rename = "bundleId")]
    bundle_id: &'a str,
    frontmost: bool,
}

#[derive(Serialize)]
struct FileRecord {
    visibility: tattle_core::FileVisibility,
}

fn record(usage: &AppUsage) -> Record<'_> {
    Record {
        app: AppRecord {
            name: &usage.name,
            pid: usage.pid,
            bundle_id: &usage.bundle_id,
            frontmost: usage.is_frontmost,
        },
        file: FileRecord {
            visibility: usage.file_visibility(),
        },
    }
}

pub fn render(report: &FileUsageReport, format: Format) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        Format::Text => {
            for usage in &report.apps {
                writeln!(
                    out,
                    "{} pid={} bundleId={} frontmost={} visibility={}",
                    usage.name,
                    usage.pid,
                    usage.bundle_id,
                    usage.is_frontmost,
                    usage.file_visibility().as_str(),
                )?;
            }
        }
        Format::Jsonl => {
            for usage in &report.apps {
                let line = serde_json::to_string(&record(usage)).map_err(io::Error::other)?;
                writeln!(out, "{line}")?;
            }
        }
        Format::Json => {
            let records: Vec<Record<'_>> = report.apps.iter().map(record).collect();
            let body = serde_json::to_string(&records).map_err(io::Error::other)?;
            writeln!(out, "{body}")?;
        }
        Format::Csv | Format::Tsv => {
            let delimiter = if format == Format::Tsv { '\t' } else { ',' };
            let sep = delimiter.to_string();
            writeln!(
                out,
                "{}",
                ["pid", "name", "bundleId", "frontmost", "visibility"].join(sep.as_str())
            )?;
            for usage in &report.apps {
                let columns = [
                    usage.pid.to_string(),
                    escape_delimited(&usage.name, delimiter),
                    escape_delimited(&usage.bundle_id, delimiter),
                    usage.is_frontmost.to_string(),
                    usage.file_visibility().as_str().to_string(),
                ];
                writeln!(out, "{}", columns.join(sep.as_str()))?;
            }
        }
    }

    Ok(())
}

/// Per-heuristic notes for each match, written to stderr.
pub fn print_debug_trail(report: &FileUsageReport) {
    for usage in &report.apps {
        let Some(steps) = &usage.debug else { continue };
        for step in steps {
            eprintln!("# {} {}: {}", usage.bundle_id, step.name, step.notes.join("; "));
        }
    }
}

fn escape_delimited(value: &str, delimiter: char) -> String {
    let needs_quoting = value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r')
        || value.contains('\t');
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
