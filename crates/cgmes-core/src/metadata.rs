//! Per-file provenance header (`md:FullModel`).

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;

use crate::error::{CgmesError, CgmesResult};
use crate::namespace;
use crate::subset::CgmesSubset;

/// Metadata describing one model file: identity, version, profiles and its
/// place in the dependency / supersession graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgmesMetadataModel {
    subset: CgmesSubset,
    id: Option<String>,
    description: Option<String>,
    version: Option<i32>,
    modeling_authority_set: Option<String>,
    scenario_time: Option<DateTime<FixedOffset>>,
    created: Option<DateTime<FixedOffset>>,
    profiles: BTreeSet<String>,
    depends_on: BTreeSet<String>,
    supersedes: BTreeSet<String>,
}

impl CgmesMetadataModel {
    pub fn new(subset: CgmesSubset, modeling_authority_set: impl Into<String>) -> Self {
        Self {
            modeling_authority_set: Some(modeling_authority_set.into()),
            ..Self::empty(subset)
        }
    }

    /// Model with no fields set, to be filled by a parser.
    pub fn empty(subset: CgmesSubset) -> Self {
        Self {
            subset,
            id: None,
            description: None,
            version: None,
            modeling_authority_set: None,
            scenario_time: None,
            created: None,
            profiles: BTreeSet::new(),
            depends_on: BTreeSet::new(),
            supersedes: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_scenario_time(mut self, scenario_time: DateTime<FixedOffset>) -> Self {
        self.scenario_time = Some(scenario_time);
        self
    }

    pub fn with_created(mut self, created: DateTime<FixedOffset>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_modeling_authority_set(mut self, mas: impl Into<String>) -> Self {
        self.modeling_authority_set = Some(mas.into());
        self
    }

    pub fn add_profile(&mut self, profile: impl Into<String>) -> &mut Self {
        self.profiles.insert(profile.into());
        self
    }

    pub fn add_depends_on(&mut self, model_id: impl Into<String>) -> &mut Self {
        self.depends_on.insert(model_id.into());
        self
    }

    pub fn add_supersedes(&mut self, model_id: impl Into<String>) -> &mut Self {
        self.supersedes.insert(model_id.into());
        self
    }

    /// Subset the model belongs to. A model built without an explicit subset
    /// takes the subset of the first profile that identifies one.
    pub fn subset(&self) -> CgmesSubset {
        if self.subset != CgmesSubset::Unknown {
            return self.subset;
        }
        self.profiles
            .iter()
            .find_map(|p| namespace::subset_for_profile(p))
            .unwrap_or(CgmesSubset::Unknown)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn modeling_authority_set(&self) -> Option<&str> {
        self.modeling_authority_set.as_deref()
    }

    pub fn scenario_time(&self) -> Option<DateTime<FixedOffset>> {
        self.scenario_time
    }

    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.created
    }

    pub fn profiles(&self) -> &BTreeSet<String> {
        &self.profiles
    }

    pub fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    pub fn supersedes(&self) -> &BTreeSet<String> {
        &self.supersedes
    }

    /// Checks the fields a parsed header must carry, naming the first one missing.
    pub fn validate(&self) -> CgmesResult<()> {
        let missing = if self.id.is_none() {
            Some("id")
        } else if self.scenario_time.is_none() {
            Some("scenarioTime")
        } else if self.created.is_none() {
            Some("created")
        } else if self.version.is_none() {
            Some("version")
        } else if self.profiles.is_empty() {
            Some("profile")
        } else if self.modeling_authority_set.is_none() {
            Some("modelingAuthoritySet")
        } else {
            None
        };
        match missing {
            Some(field) => Err(CgmesError::MissingMandatoryField { field }),
            None => Ok(()),
        }
    }
}

/// ISO-8601 date time with optional fraction and optional offset.
/// A value without offset is taken as UTC.
pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn complete() -> CgmesMetadataModel {
        let mut model = CgmesMetadataModel::new(CgmesSubset::Equipment, "http://elia.be/CGMES/2.4.15")
            .with_id("urn:uuid:1")
            .with_version(4)
            .with_scenario_time(parse_datetime("2030-01-02T09:00:00").unwrap())
            .with_created(parse_datetime("2030-01-01T12:00:00Z").unwrap());
        model.add_profile("http://entsoe.eu/CIM/EquipmentCore/3/1");
        model
    }

    #[test]
    fn complete_model_validates() {
        complete().validate().unwrap();
    }

    #[test]
    fn validation_names_missing_field() {
        let mut model = complete();
        model.version = None;
        assert!(matches!(
            model.validate(),
            Err(CgmesError::MissingMandatoryField { field: "version" })
        ));

        let mut model = complete();
        model.profiles.clear();
        assert!(matches!(
            model.validate(),
            Err(CgmesError::MissingMandatoryField { field: "profile" })
        ));
    }

    #[test]
    fn profiles_are_a_set() {
        let mut model = complete();
        model
            .add_profile("http://entsoe.eu/CIM/EquipmentOperation/3/1")
            .add_profile("http://entsoe.eu/CIM/EquipmentCore/3/1");
        assert_eq!(model.profiles().len(), 2);
    }

    #[test]
    fn subset_inferred_from_profiles() {
        let mut model = CgmesMetadataModel::empty(CgmesSubset::Unknown);
        model.add_profile("http://entsoe.eu/CIM/SteadyStateHypothesis/1/1");
        assert_eq!(model.subset(), CgmesSubset::SteadyStateHypothesis);
    }

    #[test]
    fn datetime_without_offset_is_utc() {
        let dt = parse_datetime("2021-03-01T23:00:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.hour(), 23);

        let dt = parse_datetime("2021-03-01T23:00:00.123+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!(dt.day(), 1);

        let dt = parse_datetime("2021-03-01T23:00:00+0100").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);

        assert!(parse_datetime("yesterday").is_none());
    }
}
