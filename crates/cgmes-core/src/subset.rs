//! CGMES subsets (profiles) and the file-naming conventions that identify them.

use std::fmt;

use serde::Serialize;

/// Named partition of a CGMES dataset, usually stored in its own file.
///
/// Boundary variants share a filename token with their non-boundary
/// counterpart; the two are told apart by [`looks_like_boundary`], so a name
/// is never valid for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CgmesSubset {
    #[serde(rename = "EQ")]
    Equipment,
    #[serde(rename = "TP")]
    Topology,
    #[serde(rename = "SV")]
    StateVariables,
    #[serde(rename = "SSH")]
    SteadyStateHypothesis,
    #[serde(rename = "DY")]
    Dynamic,
    #[serde(rename = "DL")]
    DiagramLayout,
    #[serde(rename = "GL")]
    GeographicalLocation,
    #[serde(rename = "EQ_BD")]
    EquipmentBoundary,
    #[serde(rename = "TP_BD")]
    TopologyBoundary,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CgmesSubset {
    pub const ALL: &'static [CgmesSubset] = &[
        CgmesSubset::Equipment,
        CgmesSubset::Topology,
        CgmesSubset::StateVariables,
        CgmesSubset::SteadyStateHypothesis,
        CgmesSubset::Dynamic,
        CgmesSubset::DiagramLayout,
        CgmesSubset::GeographicalLocation,
        CgmesSubset::EquipmentBoundary,
        CgmesSubset::TopologyBoundary,
        CgmesSubset::Unknown,
    ];

    /// Short identifier used in file names and profile URIs.
    pub fn identifier(&self) -> &'static str {
        match self {
            CgmesSubset::Equipment => "EQ",
            CgmesSubset::Topology => "TP",
            CgmesSubset::StateVariables => "SV",
            CgmesSubset::SteadyStateHypothesis => "SSH",
            CgmesSubset::Dynamic => "DY",
            CgmesSubset::DiagramLayout => "DL",
            CgmesSubset::GeographicalLocation => "GL",
            CgmesSubset::EquipmentBoundary => "EQ_BD",
            CgmesSubset::TopologyBoundary => "TP_BD",
            CgmesSubset::Unknown => "unknown",
        }
    }

    /// Token a file name carries when it holds this subset, e.g. `_EQ`.
    pub fn file_token(&self) -> Option<&'static str> {
        match self {
            CgmesSubset::Equipment | CgmesSubset::EquipmentBoundary => Some("_EQ"),
            CgmesSubset::Topology | CgmesSubset::TopologyBoundary => Some("_TP"),
            CgmesSubset::StateVariables => Some("_SV"),
            CgmesSubset::SteadyStateHypothesis => Some("_SSH"),
            CgmesSubset::Dynamic => Some("_DY"),
            CgmesSubset::DiagramLayout => Some("_DL"),
            CgmesSubset::GeographicalLocation => Some("_GL"),
            CgmesSubset::Unknown => None,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            CgmesSubset::EquipmentBoundary | CgmesSubset::TopologyBoundary
        )
    }

    /// Whether `name` (a file or context name) holds this subset by convention.
    pub fn is_valid_name(&self, name: &str) -> bool {
        match self {
            CgmesSubset::Equipment => name.contains("_EQ") && !looks_like_boundary(name),
            CgmesSubset::Topology => name.contains("_TP") && !looks_like_boundary(name),
            CgmesSubset::EquipmentBoundary => name.contains("_EQ") && looks_like_boundary(name),
            CgmesSubset::TopologyBoundary => name.contains("_TP") && looks_like_boundary(name),
            CgmesSubset::StateVariables => name.contains("_SV"),
            CgmesSubset::SteadyStateHypothesis => name.contains("_SSH"),
            CgmesSubset::Dynamic => name.contains("_DY"),
            CgmesSubset::DiagramLayout => name.contains("_DL"),
            CgmesSubset::GeographicalLocation => name.contains("_GL"),
            CgmesSubset::Unknown => false,
        }
    }

    /// First subset whose naming convention `name` satisfies, or `Unknown`.
    pub fn classify(name: &str) -> CgmesSubset {
        Self::ALL
            .iter()
            .copied()
            .find(|subset| subset.is_valid_name(name))
            .unwrap_or(CgmesSubset::Unknown)
    }

    pub fn from_identifier(identifier: &str) -> Option<CgmesSubset> {
        Self::ALL
            .iter()
            .copied()
            .find(|subset| subset.identifier() == identifier)
    }
}

impl fmt::Display for CgmesSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Boundary files are recognised by either of two case-sensitive markers.
pub fn looks_like_boundary(name: &str) -> bool {
    name.contains("_BD") || name.contains("BOUNDARY")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "grid_EQ.xml",
        "grid_EQ_BD.xml",
        "grid_TP.xml",
        "grid_TP_BD.xml",
        "20171002T0930Z_ENTSO-E_EQ_BOUNDARY_2.xml",
        "MicroGridTestConfiguration_BC_BE_EQ_V2.xml",
        "grid_SV.xml",
        "grid_SSH.xml",
        "EQ.xml",
        "",
    ];

    #[test]
    fn equipment_and_boundary_are_mutually_exclusive() {
        for name in NAMES {
            assert!(
                !(CgmesSubset::Equipment.is_valid_name(name)
                    && CgmesSubset::EquipmentBoundary.is_valid_name(name)),
                "{name} matched both equipment subsets"
            );
            assert!(
                !(CgmesSubset::Topology.is_valid_name(name)
                    && CgmesSubset::TopologyBoundary.is_valid_name(name)),
                "{name} matched both topology subsets"
            );
        }
    }

    #[test]
    fn boundary_file_is_not_equipment() {
        assert!(CgmesSubset::Equipment.is_valid_name("grid_EQ.xml"));
        assert!(!CgmesSubset::Equipment.is_valid_name("grid_EQ_BD.xml"));
        assert!(CgmesSubset::EquipmentBoundary.is_valid_name("grid_EQ_BD.xml"));
        assert!(CgmesSubset::TopologyBoundary
            .is_valid_name("20171002T0930Z_ENTSO-E_TP_BOUNDARY_2.xml"));
    }

    #[test]
    fn tokens_are_case_sensitive() {
        assert!(!CgmesSubset::Equipment.is_valid_name("grid_eq.xml"));
        assert!(!looks_like_boundary("grid_EQ_bd.xml"));
    }

    #[test]
    fn unknown_matches_nothing() {
        for name in NAMES {
            assert!(!CgmesSubset::Unknown.is_valid_name(name));
        }
        assert_eq!(CgmesSubset::classify("readme.xml"), CgmesSubset::Unknown);
    }

    #[test]
    fn classify_picks_first_matching_subset() {
        assert_eq!(CgmesSubset::classify("grid_SSH.xml"), CgmesSubset::SteadyStateHypothesis);
        assert_eq!(CgmesSubset::classify("grid_TP_BD.xml"), CgmesSubset::TopologyBoundary);
    }

    #[test]
    fn identifiers_round_trip() {
        for subset in CgmesSubset::ALL {
            assert_eq!(CgmesSubset::from_identifier(subset.identifier()), Some(*subset));
        }
    }
}
