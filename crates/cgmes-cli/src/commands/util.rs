use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use cgmes_io::{data_source_for_path, CgmesOnDataSource, ReadOnlyDataSource};
use serde::Serialize;

pub type Dataset = CgmesOnDataSource<Box<dyn ReadOnlyDataSource>>;

/// Open `path` as a CGMES dataset, failing when it holds no CGMES file.
pub fn open_dataset(path: &Path) -> Result<Dataset> {
    let ds = data_source_for_path(path)
        .with_context(|| format!("opening dataset '{}'", path.display()))?;
    let cgmes = CgmesOnDataSource::new(ds);
    if !cgmes.exists()? && !cgmes.exists_cim14()? {
        bail!(
            "no CGMES files found in '{}' (expected .xml or .zip files declaring RDF and CIM namespaces)",
            path.display()
        );
    }
    Ok(cgmes)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout(), value)?;
    println!();
    Ok(())
}

pub fn flush_table<W: Write>(mut writer: tabwriter::TabWriter<W>) -> Result<()> {
    writer.flush()?;
    Ok(())
}
