use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use cgmes_io::read_dataset_metadata;
use tabwriter::TabWriter;

use super::util::{flush_table, open_dataset, print_json};
use cgmes_cli::OutputFormat;

pub fn handle(path: &Path, format: OutputFormat) -> Result<()> {
    let cgmes = open_dataset(path)?;
    let headers = read_dataset_metadata(&cgmes)?;
    if headers.is_empty() && format == OutputFormat::Plain {
        println!("No FullModel headers in '{}'", path.display());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&headers),
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "FILE\tSUBSET\tID\tVERSION\tSCENARIO TIME\tPROFILES")?;
            for header in &headers {
                let md = &header.metadata;
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    header.file,
                    md.subset().identifier(),
                    md.id().unwrap_or("-"),
                    md.version().map_or_else(|| "-".to_string(), |v| v.to_string()),
                    md.scenario_time()
                        .map_or_else(|| "-".to_string(), |t| t.to_rfc3339()),
                    md.profiles().iter().cloned().collect::<Vec<_>>().join(","),
                )?;
            }
            flush_table(writer)
        }
    }
}
