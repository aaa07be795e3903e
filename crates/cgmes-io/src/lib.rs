//! # cgmes-io: CGMES Dataset Discovery
//!
//! Reads just enough of a CGMES dataset to know what it is: which files it
//! holds, which CIM generation they declare, which subset each file carries
//! and what their `FullModel` headers say. Records themselves are left to the
//! relation engine behind [`cgmes_core::RecordQuery`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cgmes_io::{CgmesOnDataSource, DirectoryDataSource, find_cim_archive};
//!
//! fn main() -> cgmes_core::CgmesResult<()> {
//!     let cgmes = CgmesOnDataSource::new(DirectoryDataSource::new("data/MicroGrid"));
//!     if cgmes.exists()? {
//!         println!("CIM {} in {:?}", cgmes.cim_version()?, cgmes.names()?);
//!     }
//!     if let Some(archive) = find_cim_archive(cgmes.data_source())? {
//!         println!("equipment: {}", archive.equipment());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Data Sources
//!
//! | Source | Entries |
//! |--------|---------|
//! | [`DirectoryDataSource`] | Files directly inside a directory |
//! | [`ZipDataSource`] | Entries of a `.zip` container |
//! | [`MemDataSource`] | In-memory bundle |
//!
//! A dataset file may itself be zipped (`grid_EQ.zip`); only its first entry
//! is inspected.
//!
//! ## Module Overview
//!
//! - [`namespace_reader`] - Namespace and `xml:base` declarations of a document
//! - [`on_data_source`] - Which entries are CGMES files, dataset base name and CIM version
//! - [`archive`] - `_EQ` file family assembly with boundary files
//! - [`metadata`] - `md:FullModel` header parsing
//! - [`dataset`] - Headers of a whole dataset, attached to a model

use cgmes_core::CgmesError;

pub mod archive;
pub mod data_source;
pub mod dataset;
pub mod metadata;
pub mod namespace_reader;
pub mod on_data_source;

pub use archive::{find_cim_archive, load_cim_archive, CimArchive};
pub use data_source::{
    data_source_for_path, DirectoryDataSource, MemDataSource, ReadOnlyDataSource, ZipDataSource,
};
pub use dataset::{attach_metadata, read_dataset_metadata, FileMetadata};
pub use metadata::read_metadata;
pub use on_data_source::CgmesOnDataSource;

/// XML and zip failures surface as [`CgmesError::Format`].
pub(crate) fn format_error<E: std::fmt::Display>(err: E) -> CgmesError {
    CgmesError::Format(err.to_string())
}
