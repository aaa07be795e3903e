use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use cgmes_core::CgmesSubset;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use super::util::{flush_table, open_dataset, print_json};
use cgmes_cli::OutputFormat;

#[derive(Debug, Serialize)]
struct ScanReport {
    base_name: String,
    cim_version: u32,
    cim_namespace: String,
    files: Vec<ScannedFile>,
}

#[derive(Debug, Serialize)]
struct ScannedFile {
    file: String,
    subset: CgmesSubset,
}

pub fn handle(path: &Path, format: OutputFormat) -> Result<()> {
    let cgmes = open_dataset(path)?;
    let files: Vec<ScannedFile> = cgmes
        .names()?
        .into_iter()
        .map(|file| ScannedFile {
            subset: CgmesSubset::classify(&file),
            file,
        })
        .collect();
    let report = ScanReport {
        base_name: cgmes.base_name()?,
        cim_version: cgmes.cim_version()?,
        cim_namespace: cgmes.cim_namespace()?,
        files,
    };
    info!(files = report.files.len(), cim = report.cim_version, "dataset scanned");

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Plain => {
            println!("Base name: {}", report.base_name);
            println!("CIM {} ({})", report.cim_version, report.cim_namespace);
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "FILE\tSUBSET")?;
            for entry in &report.files {
                writeln!(writer, "{}\t{}", entry.file, entry.subset.identifier())?;
            }
            flush_table(writer)
        }
    }
}
