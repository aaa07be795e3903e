//! Backing stores a CGMES dataset can be read from.
//!
//! A [`ReadOnlyDataSource`] lists and opens named entries. Three
//! implementations are provided: a filesystem directory, an in-memory bundle
//! and a zip container whose entries are the dataset files.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use cgmes_core::{CgmesError, CgmesResult};
use regex::Regex;
use tracing::debug;
use zip::ZipArchive;

use crate::format_error;

/// Capability interface over a set of named entries.
pub trait ReadOnlyDataSource {
    /// Name the store declares for the dataset (directory name, archive stem, ...).
    fn base_name(&self) -> &str;

    /// Entry nominated as the main file of the dataset, if any.
    fn main_file_name(&self) -> Option<&str> {
        None
    }

    fn exists(&self, name: &str) -> CgmesResult<bool>;

    /// Entry names matching `pattern`, in a stable order.
    fn list_names(&self, pattern: &Regex) -> CgmesResult<BTreeSet<String>>;

    fn new_input_stream(&self, name: &str) -> CgmesResult<Box<dyn Read + '_>>;
}

impl<T: ReadOnlyDataSource + ?Sized> ReadOnlyDataSource for &T {
    fn base_name(&self) -> &str {
        (**self).base_name()
    }

    fn main_file_name(&self) -> Option<&str> {
        (**self).main_file_name()
    }

    fn exists(&self, name: &str) -> CgmesResult<bool> {
        (**self).exists(name)
    }

    fn list_names(&self, pattern: &Regex) -> CgmesResult<BTreeSet<String>> {
        (**self).list_names(pattern)
    }

    fn new_input_stream(&self, name: &str) -> CgmesResult<Box<dyn Read + '_>> {
        (**self).new_input_stream(name)
    }
}

impl<T: ReadOnlyDataSource + ?Sized> ReadOnlyDataSource for Box<T> {
    fn base_name(&self) -> &str {
        (**self).base_name()
    }

    fn main_file_name(&self) -> Option<&str> {
        (**self).main_file_name()
    }

    fn exists(&self, name: &str) -> CgmesResult<bool> {
        (**self).exists(name)
    }

    fn list_names(&self, pattern: &Regex) -> CgmesResult<BTreeSet<String>> {
        (**self).list_names(pattern)
    }

    fn new_input_stream(&self, name: &str) -> CgmesResult<Box<dyn Read + '_>> {
        (**self).new_input_stream(name)
    }
}

fn not_found(name: &str) -> CgmesError {
    CgmesError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("entry '{name}' not found"),
    ))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Files directly inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryDataSource {
    dir: PathBuf,
    base_name: String,
    main_file: Option<String>,
}

impl DirectoryDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let base_name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            dir,
            base_name,
            main_file: None,
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    pub fn with_main_file(mut self, name: impl Into<String>) -> Self {
        self.main_file = Some(name.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReadOnlyDataSource for DirectoryDataSource {
    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn main_file_name(&self) -> Option<&str> {
        self.main_file.as_deref()
    }

    fn exists(&self, name: &str) -> CgmesResult<bool> {
        Ok(self.dir.join(name).is_file())
    }

    fn list_names(&self, pattern: &Regex) -> CgmesResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if pattern.is_match(name) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn new_input_stream(&self, name: &str) -> CgmesResult<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self.dir.join(name))?))
    }
}

/// Entries held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemDataSource {
    base_name: String,
    main_file: Option<String>,
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemDataSource {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.put(name, data);
        self
    }

    pub fn with_main_file(mut self, name: impl Into<String>) -> Self {
        self.main_file = Some(name.into());
        self
    }

    pub fn put(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), data.into());
    }
}

impl ReadOnlyDataSource for MemDataSource {
    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn main_file_name(&self) -> Option<&str> {
        self.main_file.as_deref()
    }

    fn exists(&self, name: &str) -> CgmesResult<bool> {
        Ok(self.entries.contains_key(name))
    }

    fn list_names(&self, pattern: &Regex) -> CgmesResult<BTreeSet<String>> {
        Ok(self
            .entries
            .keys()
            .filter(|name| pattern.is_match(name))
            .cloned()
            .collect())
    }

    fn new_input_stream(&self, name: &str) -> CgmesResult<Box<dyn Read + '_>> {
        let data = self.entries.get(name).ok_or_else(|| not_found(name))?;
        Ok(Box::new(Cursor::new(data.as_slice())))
    }
}

/// Entries of a zip container on disk.
///
/// Entry names are read once when the source is opened; each stream reopens
/// the container and decompresses the entry into memory.
#[derive(Debug, Clone)]
pub struct ZipDataSource {
    path: PathBuf,
    base_name: String,
    main_file: Option<String>,
    names: BTreeSet<String>,
}

impl ZipDataSource {
    pub fn open(path: impl Into<PathBuf>) -> CgmesResult<Self> {
        let path = path.into();
        let archive = ZipArchive::new(File::open(&path)?).map_err(format_error)?;
        let names: BTreeSet<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        debug!(path = %path.display(), entries = names.len(), "opened zip data source");
        Ok(Self {
            base_name: file_stem(&path),
            path,
            main_file: None,
            names,
        })
    }

    pub fn with_main_file(mut self, name: impl Into<String>) -> Self {
        self.main_file = Some(name.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadOnlyDataSource for ZipDataSource {
    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn main_file_name(&self) -> Option<&str> {
        self.main_file.as_deref()
    }

    fn exists(&self, name: &str) -> CgmesResult<bool> {
        Ok(self.names.contains(name))
    }

    fn list_names(&self, pattern: &Regex) -> CgmesResult<BTreeSet<String>> {
        Ok(self
            .names
            .iter()
            .filter(|name| pattern.is_match(name))
            .cloned()
            .collect())
    }

    fn new_input_stream(&self, name: &str) -> CgmesResult<Box<dyn Read + '_>> {
        if !self.names.contains(name) {
            return Err(not_found(name));
        }
        let mut archive = ZipArchive::new(File::open(&self.path)?).map_err(format_error)?;
        let mut entry = archive.by_name(name).map_err(format_error)?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(Box::new(Cursor::new(data)))
    }
}

/// Data source for a path: a zip container for `*.zip` files, a directory otherwise.
pub fn data_source_for_path(path: &Path) -> CgmesResult<Box<dyn ReadOnlyDataSource>> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    if is_zip && path.is_file() {
        Ok(Box::new(ZipDataSource::open(path)?))
    } else if path.is_dir() {
        Ok(Box::new(DirectoryDataSource::new(path)))
    } else {
        Err(CgmesError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "'{}' is neither a directory nor a zip container",
                path.display()
            ),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::FileOptions;

    fn xml_pattern() -> Regex {
        Regex::new(r"(?i)^.*\.xml$").unwrap()
    }

    #[test]
    fn directory_lists_matching_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a_EQ.xml"), "<x/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let ds = DirectoryDataSource::new(dir.path());
        let names = ds.list_names(&xml_pattern()).unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a_EQ.xml"]);
        assert!(ds.exists("a_EQ.xml").unwrap());
        assert!(!ds.exists("nested.xml").unwrap());

        let mut text = String::new();
        ds.new_input_stream("a_EQ.xml")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "<x/>");
    }

    #[test]
    fn memory_source_reports_missing_entry() {
        let ds = MemDataSource::new("grid").with_entry("grid_EQ.xml", "<x/>");
        assert_eq!(ds.base_name(), "grid");
        assert!(matches!(
            ds.new_input_stream("grid_TP.xml"),
            Err(CgmesError::Io(_))
        ));
    }

    #[test]
    fn zip_source_reads_entries() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("Bundle.zip");
        let mut writer = zip::ZipWriter::new(File::create(&zip_path).unwrap());
        writer.add_directory("sub/", FileOptions::default()).unwrap();
        writer
            .start_file("grid_EQ.xml", FileOptions::default())
            .unwrap();
        writer.write_all(b"<eq/>").unwrap();
        writer.finish().unwrap();

        let ds = ZipDataSource::open(&zip_path).unwrap();
        assert_eq!(ds.base_name(), "Bundle");
        assert!(ds.exists("grid_EQ.xml").unwrap());
        assert!(!ds.exists("sub/").unwrap());

        let mut text = String::new();
        ds.new_input_stream("grid_EQ.xml")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "<eq/>");
    }

    #[test]
    fn path_dispatch() {
        let dir = tempdir().unwrap();
        let ds = data_source_for_path(dir.path()).unwrap();
        assert!(ds.list_names(&xml_pattern()).unwrap().is_empty());
        assert!(data_source_for_path(&dir.path().join("missing.zip")).is_err());
    }
}
