//! CIM schema generations and their namespaces.
//!
//! Three incompatible generations are recognised:
//!
//! | CIM version | Namespace | Validity test |
//! |-------------|-----------|---------------|
//! | 14 | `http://iec.ch/TC57/2009/CIM-schema-cim14#` | exact match |
//! | 16 | `http://iec.ch/TC57/2013/CIM-schema-cim16#` | exact match |
//! | 100 | `http://iec.ch/TC57/CIM100#` | suffix pattern `.../CIMnnn#` |
//!
//! Only CIM 16 and CIM 100 define named profiles.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CgmesError, CgmesResult};
use crate::subset::CgmesSubset;

pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const MD_NAMESPACE: &str = "http://iec.ch/TC57/61970-552/ModelDescription/1#";

pub const CIM_14_NAMESPACE: &str = "http://iec.ch/TC57/2009/CIM-schema-cim14#";
pub const CIM_16_NAMESPACE: &str = "http://iec.ch/TC57/2013/CIM-schema-cim16#";
pub const CIM_100_NAMESPACE: &str = "http://iec.ch/TC57/CIM100#";

/// Known CIM versions, oldest first.
pub const CIM_VERSIONS: &[u32] = &[14, 16, 100];

const CIM_16_EQ_PROFILE: &str = "http://entsoe.eu/CIM/EquipmentCore/3/1";
const CIM_100_EQ_PROFILE: &str = "http://iec.ch/TC57/ns/CIM/CoreEquipment-EU/3.0";
const CGMES_EQ_3_OR_GREATER_PREFIX: &str = "http://iec.ch/TC57/ns/CIM/CoreEquipment-EU/";

const CIM_16_PROFILES: &[(&str, &str)] = &[
    ("EQ", CIM_16_EQ_PROFILE),
    ("EQ_OP", "http://entsoe.eu/CIM/EquipmentOperation/3/1"),
    ("SC", "http://entsoe.eu/CIM/EquipmentShortCircuit/3/1"),
    ("SSH", "http://entsoe.eu/CIM/SteadyStateHypothesis/1/1"),
    ("TP", "http://entsoe.eu/CIM/Topology/4/1"),
    ("SV", "http://entsoe.eu/CIM/StateVariables/4/1"),
    ("DY", "http://entsoe.eu/CIM/Dynamics/3/1"),
    ("DL", "http://entsoe.eu/CIM/DiagramLayout/3/1"),
    ("GL", "http://entsoe.eu/CIM/GeographicalLocation/2/1"),
    ("EQ_BD", "http://entsoe.eu/CIM/EquipmentBoundary/3/1"),
    ("TP_BD", "http://entsoe.eu/CIM/TopologyBoundary/3/1"),
];

const CIM_100_PROFILES: &[(&str, &str)] = &[
    ("EQ", CIM_100_EQ_PROFILE),
    ("EQ_OP", "http://iec.ch/TC57/ns/CIM/Operation-EU/3.0"),
    ("SC", "http://iec.ch/TC57/ns/CIM/ShortCircuit-EU/3.0"),
    ("SSH", "http://iec.ch/TC57/ns/CIM/SteadyStateHypothesis-EU/3.0"),
    ("TP", "http://iec.ch/TC57/ns/CIM/Topology-EU/3.0"),
    ("SV", "http://iec.ch/TC57/ns/CIM/StateVariables-EU/3.0"),
    ("DY", "http://iec.ch/TC57/ns/CIM/Dynamics-EU/1.0"),
    ("DL", "http://iec.ch/TC57/ns/CIM/DiagramLayout-EU/3.0"),
    ("GL", "http://iec.ch/TC57/ns/CIM/GeographicalLocation-EU/3.0"),
    ("EQ_BD", "http://iec.ch/TC57/ns/CIM/EquipmentBoundary-EU/3.0"),
];

static CIM_UNTIL_16: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*CIM-schema-cim(\d+)#$").expect("valid regex"));
static CIM_FROM_100: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*/CIM(\d+)#$").expect("valid regex"));

/// True for the two legacy canonical URIs, or any URI ending in `/CIMnnn#`.
pub fn is_valid_cim_namespace(uri: &str) -> bool {
    uri == CIM_14_NAMESPACE || uri == CIM_16_NAMESPACE || CIM_FROM_100.is_match(uri)
}

/// Canonical namespace for a CIM version.
pub fn cim_namespace(cim_version: u32) -> CgmesResult<&'static str> {
    match cim_version {
        14 => Ok(CIM_14_NAMESPACE),
        16 => Ok(CIM_16_NAMESPACE),
        100 => Ok(CIM_100_NAMESPACE),
        other => Err(CgmesError::UnsupportedVersion(other)),
    }
}

/// Profile URI for a short profile name (`"EQ"`, `"SSH"`, ...).
///
/// CIM 14 predates named profiles and always yields `None`.
pub fn profile_uri(cim_version: u32, profile: &str) -> CgmesResult<Option<&'static str>> {
    let table = match cim_version {
        14 => return Ok(None),
        16 => CIM_16_PROFILES,
        100 => CIM_100_PROFILES,
        other => return Err(CgmesError::UnsupportedVersion(other)),
    };
    Ok(table
        .iter()
        .find(|(name, _)| *name == profile)
        .map(|(_, uri)| *uri))
}

/// Version number encoded in a CIM namespace, if it has one of the known shapes.
pub fn cim_version_from_namespace(uri: &str) -> Option<u32> {
    CIM_UNTIL_16
        .captures(uri)
        .or_else(|| CIM_FROM_100.captures(uri))
        .and_then(|caps| caps[1].parse().ok())
}

pub fn is_equipment_core_profile(profile: &str) -> bool {
    profile.contains("/EquipmentCore/") || profile.contains("/CIM/CoreEquipment")
}

pub fn is_equipment_operation_profile(profile: &str) -> bool {
    profile.contains("/EquipmentOperation/") || profile.contains("/CIM/Operation")
}

pub fn is_equipment_boundary_profile(profile: &str) -> bool {
    profile.contains("/EquipmentBoundary/") || profile.contains("/CIM/EquipmentBoundary")
}

pub fn is_equipment_boundary_operation_profile(profile: &str) -> bool {
    profile.contains("/EquipmentBoundaryOperation/")
}

pub fn is_topology_boundary_profile(profile: &str) -> bool {
    profile.contains("/TopologyBoundary/")
}

/// Subset a known CIM 16 or CIM 100 profile URI belongs to.
pub fn subset_for_profile(profile: &str) -> Option<CgmesSubset> {
    CIM_16_PROFILES
        .iter()
        .chain(CIM_100_PROFILES)
        .find(|(_, uri)| *uri == profile)
        .and_then(|(name, _)| CgmesSubset::from_identifier(name))
}

/// Equipment core profile of CGMES 3 or a later release.
pub fn is_eq_cgmes3_or_greater(profile: &str) -> bool {
    profile.starts_with(CGMES_EQ_3_OR_GREATER_PREFIX) && profile >= CIM_100_EQ_PROFILE
}
