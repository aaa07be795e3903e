//! Discovery of the CGMES files inside a data source.

use std::collections::BTreeSet;

use cgmes_core::namespace::{self, CIM_14_NAMESPACE, RDF_NAMESPACE};
use cgmes_core::{CgmesError, CgmesResult, CgmesSubset};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::data_source::ReadOnlyDataSource;
use crate::namespace_reader;

/// Base name used when neither the files nor the data source provide one.
pub const DEFAULT_BASE_NAME: &str = "cgmes";

static CGMES_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^.*\.(xml|zip)$").expect("valid regex"));

pub(crate) fn is_zip_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".zip")
}

fn is_cgmes_namespaces(found: &BTreeSet<String>) -> bool {
    found.contains(RDF_NAMESPACE) && found.iter().any(|ns| namespace::is_valid_cim_namespace(ns))
}

fn is_cim14_namespaces(found: &BTreeSet<String>) -> bool {
    found.contains(RDF_NAMESPACE) && found.contains(CIM_14_NAMESPACE)
}

/// A data source seen as a CGMES dataset.
#[derive(Debug, Clone)]
pub struct CgmesOnDataSource<D> {
    ds: D,
}

impl<D: ReadOnlyDataSource> CgmesOnDataSource<D> {
    pub fn new(ds: D) -> Self {
        Self { ds }
    }

    pub fn data_source(&self) -> &D {
        &self.ds
    }

    pub fn into_inner(self) -> D {
        self.ds
    }

    /// Namespaces declared by an entry; `None` when the entry cannot be opened.
    /// Zip entries are inspected through their first archived document.
    pub fn namespaces_of(&self, name: &str) -> CgmesResult<Option<BTreeSet<String>>> {
        let stream = match self.ds.new_input_stream(name) {
            Ok(stream) => stream,
            Err(CgmesError::Io(e)) => {
                debug!(file = name, error = %e, "skipping unreadable entry");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let found = if is_zip_name(name) {
            namespace_reader::namespaces_from_zip(stream)?
        } else {
            namespace_reader::namespaces(stream)?
        };
        Ok(Some(found))
    }

    fn qualifying(
        &self,
        accept: impl Fn(&BTreeSet<String>) -> bool,
    ) -> CgmesResult<Vec<String>> {
        let mut names = Vec::new();
        for name in self.ds.list_names(&CGMES_FILE)? {
            match self.namespaces_of(&name)? {
                Some(found) if accept(&found) => {
                    debug!(file = %name, "CGMES file");
                    names.push(name);
                }
                _ => debug!(file = %name, "not a CGMES file"),
            }
        }
        Ok(names)
    }

    /// Entries with an `.xml` or `.zip` suffix that declare the RDF namespace
    /// and a CIM namespace, in the data source's listing order.
    pub fn names(&self) -> CgmesResult<Vec<String>> {
        self.qualifying(is_cgmes_namespaces)
    }

    fn main_file_accepted(&self, accept: impl Fn(&BTreeSet<String>) -> bool) -> CgmesResult<bool> {
        match self.ds.main_file_name() {
            Some(main) => Ok(self
                .namespaces_of(main)?
                .map(|found| accept(&found))
                .unwrap_or(false)),
            None => Ok(true),
        }
    }

    /// The data source holds CGMES files, and its main file, if it names
    /// one, is one of them.
    pub fn exists(&self) -> CgmesResult<bool> {
        Ok(self.main_file_accepted(is_cgmes_namespaces)? && !self.names()?.is_empty())
    }

    /// Like [`exists`](Self::exists) for CIM14 data, which must also carry an
    /// equipment file.
    pub fn exists_cim14(&self) -> CgmesResult<bool> {
        if !self.main_file_accepted(is_cim14_namespaces)? {
            return Ok(false);
        }
        Ok(self
            .qualifying(is_cim14_namespaces)?
            .iter()
            .any(|name| CgmesSubset::Equipment.is_valid_name(name)))
    }

    /// Base URI of the dataset.
    ///
    /// The first `xml:base` declared by a CGMES file wins; otherwise the data
    /// source base name, lowercased and reduced to `[a-z0-9_-]`.
    pub fn base_name(&self) -> CgmesResult<String> {
        for name in self.names()? {
            let stream = self.ds.new_input_stream(&name)?;
            let base = if is_zip_name(&name) {
                namespace_reader::base_from_zip(stream)?
            } else {
                namespace_reader::base(stream)?
            };
            if let Some(base) = base.filter(|b| !b.is_empty()) {
                debug!(file = %name, %base, "base name from xml:base");
                return Ok(base);
            }
        }
        let sanitized: String = self
            .ds
            .base_name()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        if sanitized.is_empty() {
            Ok(DEFAULT_BASE_NAME.to_string())
        } else {
            Ok(sanitized)
        }
    }

    /// First CIM namespace declared across the CGMES files.
    pub fn cim_namespace(&self) -> CgmesResult<String> {
        for name in self.names()? {
            if let Some(found) = self.namespaces_of(&name)? {
                if let Some(ns) = found
                    .into_iter()
                    .find(|ns| namespace::is_valid_cim_namespace(ns))
                {
                    return Ok(ns);
                }
            }
        }
        Err(CgmesError::NoValidDataset(format!(
            "no CIM namespace declared in data source '{}'",
            self.ds.base_name()
        )))
    }

    pub fn cim_version(&self) -> CgmesResult<u32> {
        let ns = self.cim_namespace()?;
        namespace::cim_version_from_namespace(&ns).ok_or_else(|| {
            CgmesError::NoValidDataset(format!("no CIM version in namespace {ns}"))
        })
    }
}
