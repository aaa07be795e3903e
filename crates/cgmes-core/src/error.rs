//! Unified error types for the CGMES layer
//!
//! Every fallible operation in `cgmes-core` and `cgmes-io` returns
//! [`CgmesResult`]. Soft negatives (a file that simply is not CGMES, a data
//! source without an equipment file) are modelled as `Option`/empty values by
//! the callers; the variants here are reserved for states that are genuinely
//! exceptional.
//!
//! # Example
//!
//! ```ignore
//! use cgmes_core::{CgmesError, CgmesResult};
//!
//! fn equipment_file(ds: &dyn ReadOnlyDataSource) -> CgmesResult<String> {
//!     let archive = load_cim_archive(ds)?;
//!     Ok(archive.equipment().to_string())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all CGMES operations.
#[derive(Error, Debug)]
pub enum CgmesError {
    /// I/O errors (file access, archive entries, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML or compressed content while reading a stream
    #[error("Format error: {0}")]
    Format(String),

    /// No CIM namespace, or no qualifying equipment file, in a data source
    #[error("No valid CGMES dataset: {0}")]
    NoValidDataset(String),

    /// A terminal attribute was re-assigned with a conflicting value
    #[error(
        "Inconsistent values for {attribute} of terminal {terminal}: previous {previous}, now {now}"
    )]
    InconsistentAssignment {
        terminal: String,
        attribute: &'static str,
        previous: String,
        now: String,
    },

    /// A metadata header lacks a required element
    #[error("Missing mandatory field in model header: {field}")]
    MissingMandatoryField { field: &'static str },

    /// Lookup for a CIM version outside the closed version table
    #[error("Unsupported CIM version: {0}")]
    UnsupportedVersion(u32),

    /// Sum requested over a power flow that carries no values
    #[error("Cannot sum undefined power flows")]
    UndefinedPowerFlow,
}

/// Convenience type alias for Results using CgmesError.
pub type CgmesResult<T> = Result<T, CgmesError>;
