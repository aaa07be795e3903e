use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use cgmes_io::{find_cim_archive, load_cim_archive};
use tabwriter::TabWriter;

use super::util::{flush_table, open_dataset, print_json};
use cgmes_cli::OutputFormat;

pub fn handle(path: &Path, strict: bool, format: OutputFormat) -> Result<()> {
    let cgmes = open_dataset(path)?;
    let archive = if strict {
        load_cim_archive(cgmes.data_source())
            .with_context(|| format!("assembling CIM archive of '{}'", path.display()))?
    } else {
        match find_cim_archive(cgmes.data_source())? {
            Some(archive) => archive,
            None => {
                println!("No CIM archive found in '{}'", path.display());
                return Ok(());
            }
        }
    };

    match format {
        OutputFormat::Json => print_json(&archive),
        OutputFormat::Plain => {
            match archive.cim_version() {
                Some(version) => println!("Equipment: {} (CIM {version})", archive.equipment()),
                None => println!("Equipment: {}", archive.equipment()),
            }
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "SUBSET\tFILE")?;
            for (subset, files) in archive.subsets() {
                for file in files {
                    writeln!(writer, "{}\t{}", subset.identifier(), file)?;
                }
            }
            flush_table(writer)
        }
    }
}
