//! File-family assembly for data sources that follow the `<name>_EQ.xml`
//! naming convention.
//!
//! One equipment file anchors the archive. Its topology, state-variables and
//! steady-state-hypothesis siblings are found by swapping the `_EQ` token in
//! its name, and boundary files are picked up by pattern.

use std::collections::BTreeMap;

use cgmes_core::namespace::{self, CIM_VERSIONS};
use cgmes_core::{CgmesError, CgmesResult, CgmesSubset};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::data_source::ReadOnlyDataSource;
use crate::namespace_reader;

static EQ_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^.*_EQ.*\.xml$").expect("valid regex"));
static XML_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^.*\.xml$").expect("valid regex"));

const SIBLINGS: [CgmesSubset; 3] = [
    CgmesSubset::Topology,
    CgmesSubset::StateVariables,
    CgmesSubset::SteadyStateHypothesis,
];

/// Files of a dataset, by subset. A boundary subset may hold several files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CimArchive {
    cim_namespace: String,
    subsets: BTreeMap<CgmesSubset, Vec<String>>,
}

impl CimArchive {
    /// Equipment file anchoring the archive.
    pub fn equipment(&self) -> &str {
        self.files(CgmesSubset::Equipment)
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn files(&self, subset: CgmesSubset) -> &[String] {
        self.subsets.get(&subset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, subset: CgmesSubset) -> bool {
        self.subsets.contains_key(&subset)
    }

    pub fn subsets(&self) -> &BTreeMap<CgmesSubset, Vec<String>> {
        &self.subsets
    }

    /// CIM namespace declared by the equipment file.
    pub fn cim_namespace(&self) -> &str {
        &self.cim_namespace
    }

    pub fn cim_version(&self) -> Option<u32> {
        namespace::cim_version_from_namespace(&self.cim_namespace)
    }
}

/// Name of the file holding `subset` next to an equipment file.
pub fn sibling_name(equipment: &str, subset: CgmesSubset) -> Option<String> {
    let token = subset.file_token()?;
    Some(equipment.replace("_EQ", token))
}

fn equipment_file<D: ReadOnlyDataSource + ?Sized>(ds: &D) -> CgmesResult<String> {
    if let Some(main) = ds.main_file_name() {
        if CgmesSubset::Equipment.is_valid_name(main) && XML_FILE.is_match(main) {
            return Ok(main.to_string());
        }
        return Err(CgmesError::NoValidDataset(format!(
            "main file '{main}' is not an equipment file"
        )));
    }
    let candidates: Vec<String> = ds
        .list_names(&EQ_FILE)?
        .into_iter()
        .filter(|name| CgmesSubset::Equipment.is_valid_name(name))
        .collect();
    match candidates.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(CgmesError::NoValidDataset(format!(
            "no equipment file in data source '{}'",
            ds.base_name()
        ))),
        many => Err(CgmesError::NoValidDataset(format!(
            "{} candidate equipment files in data source '{}': {}",
            many.len(),
            ds.base_name(),
            many.join(", ")
        ))),
    }
}

fn assemble<D: ReadOnlyDataSource + ?Sized>(ds: &D) -> CgmesResult<CimArchive> {
    let equipment = equipment_file(ds)?;
    let declared = namespace_reader::namespaces(ds.new_input_stream(&equipment)?)?;
    let cim_namespace = CIM_VERSIONS
        .iter()
        .filter_map(|version| namespace::cim_namespace(*version).ok())
        .find(|ns| declared.contains(*ns))
        .ok_or_else(|| {
            CgmesError::NoValidDataset(format!(
                "equipment file '{equipment}' declares no CIM namespace"
            ))
        })?;

    let mut subsets = BTreeMap::new();
    for subset in SIBLINGS {
        if let Some(name) = sibling_name(&equipment, subset) {
            if ds.exists(&name)? {
                subsets.insert(subset, vec![name]);
            } else {
                debug!(file = %name, %subset, "sibling file not present");
            }
        }
    }
    subsets.insert(CgmesSubset::Equipment, vec![equipment]);

    let xml_names = ds.list_names(&XML_FILE)?;
    for &subset in CgmesSubset::ALL.iter().filter(|s| s.is_boundary()) {
        let boundary: Vec<String> = xml_names
            .iter()
            .filter(|name| subset.is_valid_name(name))
            .cloned()
            .collect();
        if !boundary.is_empty() {
            subsets.entry(subset).or_insert_with(Vec::new).extend(boundary);
        }
    }

    Ok(CimArchive {
        cim_namespace: cim_namespace.to_string(),
        subsets,
    })
}

/// Assemble the archive of a data source. `None` when no single equipment
/// file can be identified or it declares no CIM namespace.
pub fn find_cim_archive<D: ReadOnlyDataSource + ?Sized>(ds: &D) -> CgmesResult<Option<CimArchive>> {
    match assemble(ds) {
        Ok(archive) => {
            info!(
                equipment = archive.equipment(),
                subsets = archive.subsets().len(),
                "CIM archive found"
            );
            Ok(Some(archive))
        }
        Err(CgmesError::NoValidDataset(reason)) => {
            debug!(%reason, "no CIM archive");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// [`find_cim_archive`], failing with [`CgmesError::NoValidDataset`] when no
/// archive is found.
pub fn load_cim_archive<D: ReadOnlyDataSource + ?Sized>(ds: &D) -> CgmesResult<CimArchive> {
    assemble(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::MemDataSource;
    use cgmes_core::namespace::{CIM_14_NAMESPACE, CIM_16_NAMESPACE, RDF_NAMESPACE};

    fn doc(cim: &str) -> String {
        format!(r#"<rdf:RDF xmlns:rdf="{RDF_NAMESPACE}" xmlns:cim="{cim}"/>"#)
    }

    #[test]
    fn sibling_names_swap_the_token() {
        assert_eq!(
            sibling_name("grid_EQ_v2.xml", CgmesSubset::SteadyStateHypothesis).as_deref(),
            Some("grid_SSH_v2.xml")
        );
        assert_eq!(sibling_name("grid_EQ.xml", CgmesSubset::Unknown), None);
    }

    #[test]
    fn siblings_and_boundaries_are_collected() {
        let ds = MemDataSource::new("grid")
            .with_entry("grid_EQ.xml", doc(CIM_16_NAMESPACE))
            .with_entry("grid_TP.xml", doc(CIM_16_NAMESPACE))
            .with_entry("grid_SV.xml", doc(CIM_16_NAMESPACE))
            .with_entry("BD_EQ_BD.xml", doc(CIM_16_NAMESPACE))
            .with_entry("MAS_EQ_BOUNDARY.xml", doc(CIM_16_NAMESPACE))
            .with_entry("BD_TP_BD.xml", doc(CIM_16_NAMESPACE));
        let archive = find_cim_archive(&ds).unwrap().unwrap();
        assert_eq!(archive.equipment(), "grid_EQ.xml");
        assert_eq!(archive.files(CgmesSubset::Topology), ["grid_TP.xml"]);
        assert_eq!(archive.files(CgmesSubset::StateVariables), ["grid_SV.xml"]);
        assert!(!archive.contains(CgmesSubset::SteadyStateHypothesis));
        assert_eq!(
            archive.files(CgmesSubset::EquipmentBoundary),
            ["BD_EQ_BD.xml", "MAS_EQ_BOUNDARY.xml"]
        );
        assert_eq!(archive.files(CgmesSubset::TopologyBoundary), ["BD_TP_BD.xml"]);
        assert_eq!(archive.cim_version(), Some(16));
    }

    #[test]
    fn ambiguous_equipment_is_soft_failure() {
        let ds = MemDataSource::new("grid")
            .with_entry("a_EQ.xml", doc(CIM_16_NAMESPACE))
            .with_entry("b_EQ.xml", doc(CIM_16_NAMESPACE));
        assert_eq!(find_cim_archive(&ds).unwrap(), None);
        let err = load_cim_archive(&ds).unwrap_err();
        assert!(err.to_string().contains("2 candidate equipment files"));

        let ds = MemDataSource::new("grid").with_entry("grid_TP.xml", doc(CIM_16_NAMESPACE));
        assert_eq!(find_cim_archive(&ds).unwrap(), None);
        assert!(matches!(
            load_cim_archive(&ds),
            Err(CgmesError::NoValidDataset(_))
        ));
    }

    #[test]
    fn main_file_overrides_scan() {
        let ds = MemDataSource::new("grid")
            .with_entry("a_EQ.xml", doc(CIM_14_NAMESPACE))
            .with_entry("b_EQ.xml", doc(CIM_16_NAMESPACE))
            .with_main_file("a_EQ.xml");
        let archive = load_cim_archive(&ds).unwrap();
        assert_eq!(archive.equipment(), "a_EQ.xml");
        assert_eq!(archive.cim_namespace(), CIM_14_NAMESPACE);

        let ds = MemDataSource::new("grid")
            .with_entry("a_TP.xml", doc(CIM_16_NAMESPACE))
            .with_main_file("a_TP.xml");
        assert_eq!(find_cim_archive(&ds).unwrap(), None);
    }

    #[test]
    fn equipment_without_cim_namespace_is_rejected() {
        let ds = MemDataSource::new("grid").with_entry(
            "grid_EQ.xml",
            doc("http://iec.ch/TC57/2011/CIM-schema-cim15#"),
        );
        assert_eq!(find_cim_archive(&ds).unwrap(), None);
    }

    #[test]
    fn archive_serializes_subset_keys() {
        let ds = MemDataSource::new("grid").with_entry("grid_EQ.xml", doc(CIM_16_NAMESPACE));
        let archive = load_cim_archive(&ds).unwrap();
        let json = serde_json::to_value(&archive).unwrap();
        assert_eq!(json["subsets"]["EQ"][0], "grid_EQ.xml");
    }
}
