//! Terminals and their write-once topology assignment.
//!
//! The node, voltage level and substation of a terminal are not known when the
//! terminal record is read; they are assigned later, possibly more than once,
//! as different derived views resolve them. Once a field holds a value every
//! later assignment must agree with it. What happens on disagreement is the
//! terminal's [`ConsistencyPolicy`].

use serde::Serialize;
use tracing::warn;

use crate::error::{CgmesError, CgmesResult};
use crate::names;
use crate::power_flow::PowerFlow;
use crate::record::PropertyBag;

/// Reaction to a conflicting re-assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ConsistencyPolicy {
    /// Reject with [`CgmesError::InconsistentAssignment`]
    #[default]
    Strict,
    /// Log a warning per conflicting field, keep its previous value and
    /// still fill the fields that were unset
    Warn,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    ConnectivityNode,
    TopologicalNode,
    VoltageLevel,
    Substation,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::ConnectivityNode => "connectivityNode",
            Field::TopologicalNode => "topologicalNode",
            Field::VoltageLevel => "voltageLevel",
            Field::Substation => "substation",
        }
    }
}

/// Connection point of a piece of conducting equipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgmesTerminal {
    id: String,
    conducting_equipment: Option<String>,
    conducting_equipment_type: Option<String>,
    connected: bool,
    flow: PowerFlow,
    connectivity_node: Option<String>,
    topological_node: Option<String>,
    voltage_level: Option<String>,
    substation: Option<String>,
    #[serde(skip)]
    policy: ConsistencyPolicy,
}

impl CgmesTerminal {
    pub fn new(
        id: impl Into<String>,
        conducting_equipment: Option<String>,
        conducting_equipment_type: Option<String>,
        connected: bool,
        flow: PowerFlow,
    ) -> Self {
        Self {
            id: id.into(),
            conducting_equipment,
            conducting_equipment_type,
            connected,
            flow,
            connectivity_node: None,
            topological_node: None,
            voltage_level: None,
            substation: None,
            policy: ConsistencyPolicy::default(),
        }
    }

    /// Terminal from a `Terminal` record. Node references present in the record
    /// are assigned straight away. Returns `None` when the record has no identity.
    pub fn from_record(record: &PropertyBag, policy: ConsistencyPolicy) -> Option<Self> {
        let id = record.id(names::TERMINAL)?;
        let mut terminal = CgmesTerminal::new(
            id,
            record.id(names::CONDUCTING_EQUIPMENT),
            record.local(names::CONDUCTING_EQUIPMENT_TYPE),
            record.as_bool(names::CONNECTED).unwrap_or(true),
            PowerFlow::from_record(record),
        )
        .with_policy(policy);
        terminal.connectivity_node = record.id(names::CONNECTIVITY_NODE);
        terminal.topological_node = record.id(names::TOPOLOGICAL_NODE);
        Some(terminal)
    }

    pub fn with_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn assign_topology(
        &mut self,
        topological_node: Option<&str>,
        voltage_level: Option<&str>,
        substation: Option<&str>,
    ) -> CgmesResult<()> {
        self.check_and_set(&[
            (Field::TopologicalNode, topological_node),
            (Field::VoltageLevel, voltage_level),
            (Field::Substation, substation),
        ])
    }

    pub fn assign_connectivity(
        &mut self,
        connectivity_node: Option<&str>,
        topological_node: Option<&str>,
        voltage_level: Option<&str>,
        substation: Option<&str>,
    ) -> CgmesResult<()> {
        self.check_and_set(&[
            (Field::ConnectivityNode, connectivity_node),
            (Field::TopologicalNode, topological_node),
            (Field::VoltageLevel, voltage_level),
            (Field::Substation, substation),
        ])
    }

    // A `None` value never conflicts. Under `Strict` every field is checked
    // before any is written, so a rejected assignment leaves the terminal
    // untouched. Under `Warn` each field is checked on its own: conflicting
    // fields keep their previous value, unset fields are filled.
    fn check_and_set(&mut self, updates: &[(Field, Option<&str>)]) -> CgmesResult<()> {
        let mut conflicts = Vec::new();
        for &(field, value) in updates {
            if let (Some(previous), Some(now)) = (self.current(field), value) {
                if previous != now {
                    conflicts.push((field, previous.to_string(), now.to_string()));
                }
            }
        }
        if self.policy == ConsistencyPolicy::Strict {
            if let Some((field, previous, now)) = conflicts.into_iter().next() {
                return Err(CgmesError::InconsistentAssignment {
                    terminal: self.id.clone(),
                    attribute: field.name(),
                    previous,
                    now,
                });
            }
        } else {
            for (field, previous, now) in &conflicts {
                warn!(
                    terminal = %self.id,
                    attribute = field.name(),
                    %previous,
                    %now,
                    "inconsistent terminal assignment ignored"
                );
            }
        }
        for &(field, value) in updates {
            if let Some(now) = value {
                let slot = self.slot(field);
                if slot.is_none() {
                    *slot = Some(now.to_string());
                }
            }
        }
        Ok(())
    }

    fn current(&self, field: Field) -> Option<&str> {
        match field {
            Field::ConnectivityNode => self.connectivity_node.as_deref(),
            Field::TopologicalNode => self.topological_node.as_deref(),
            Field::VoltageLevel => self.voltage_level.as_deref(),
            Field::Substation => self.substation.as_deref(),
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::ConnectivityNode => &mut self.connectivity_node,
            Field::TopologicalNode => &mut self.topological_node,
            Field::VoltageLevel => &mut self.voltage_level,
            Field::Substation => &mut self.substation,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conducting_equipment(&self) -> Option<&str> {
        self.conducting_equipment.as_deref()
    }

    pub fn conducting_equipment_type(&self) -> Option<&str> {
        self.conducting_equipment_type.as_deref()
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn flow(&self) -> PowerFlow {
        self.flow
    }

    pub fn connectivity_node(&self) -> Option<&str> {
        self.connectivity_node.as_deref()
    }

    pub fn topological_node(&self) -> Option<&str> {
        self.topological_node.as_deref()
    }

    pub fn voltage_level(&self) -> Option<&str> {
        self.voltage_level.as_deref()
    }

    pub fn substation(&self) -> Option<&str> {
        self.substation.as_deref()
    }

    pub fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PropertyValue;

    fn terminal(policy: ConsistencyPolicy) -> CgmesTerminal {
        CgmesTerminal::new("T1", Some("L1".into()), None, true, PowerFlow::UNDEFINED)
            .with_policy(policy)
    }

    #[test]
    fn repeated_identical_assignment_succeeds() {
        let mut t = terminal(ConsistencyPolicy::Strict);
        t.assign_topology(Some("A"), Some("V1"), Some("S1")).unwrap();
        t.assign_topology(Some("A"), Some("V1"), Some("S1")).unwrap();
        assert_eq!(t.topological_node(), Some("A"));
        assert_eq!(t.voltage_level(), Some("V1"));
        assert_eq!(t.substation(), Some("S1"));
    }

    #[test]
    fn conflicting_assignment_is_rejected_without_mutation() {
        let mut t = terminal(ConsistencyPolicy::Strict);
        t.assign_topology(Some("A"), Some("V1"), Some("S1")).unwrap();
        let err = t
            .assign_topology(Some("B"), Some("V1"), Some("S1"))
            .unwrap_err();
        match err {
            CgmesError::InconsistentAssignment {
                terminal,
                attribute,
                previous,
                now,
            } => {
                assert_eq!(terminal, "T1");
                assert_eq!(attribute, "topologicalNode");
                assert_eq!(previous, "A");
                assert_eq!(now, "B");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(t.topological_node(), Some("A"));
    }

    #[test]
    fn rejection_is_atomic_across_fields() {
        let mut t = terminal(ConsistencyPolicy::Strict);
        t.assign_topology(None, Some("V1"), None).unwrap();
        assert!(t.assign_topology(Some("A"), Some("V2"), Some("S1")).is_err());
        assert_eq!(t.topological_node(), None);
        assert_eq!(t.substation(), None);
        assert_eq!(t.voltage_level(), Some("V1"));
    }

    #[test]
    fn warn_policy_keeps_old_value() {
        let mut t = terminal(ConsistencyPolicy::Warn);
        t.assign_topology(Some("A"), Some("V1"), Some("S1")).unwrap();
        t.assign_topology(Some("B"), Some("V2"), Some("S2")).unwrap();
        assert_eq!(t.topological_node(), Some("A"));
        assert_eq!(t.voltage_level(), Some("V1"));
        assert_eq!(t.substation(), Some("S1"));
    }

    #[test]
    fn warn_policy_still_fills_unset_fields() {
        let mut t = terminal(ConsistencyPolicy::Warn);
        t.assign_topology(Some("A"), None, None).unwrap();
        t.assign_topology(Some("B"), Some("V1"), Some("S1")).unwrap();
        assert_eq!(t.topological_node(), Some("A"));
        assert_eq!(t.voltage_level(), Some("V1"));
        assert_eq!(t.substation(), Some("S1"));
    }

    #[test]
    fn connectivity_assignment_shares_the_check() {
        let mut t = terminal(ConsistencyPolicy::Strict);
        t.assign_connectivity(Some("CN1"), Some("A"), None, None)
            .unwrap();
        t.assign_topology(Some("A"), Some("V1"), Some("S1")).unwrap();
        assert!(t
            .assign_connectivity(Some("CN2"), Some("A"), Some("V1"), Some("S1"))
            .is_err());
        assert_eq!(t.connectivity_node(), Some("CN1"));
    }

    #[test]
    fn missing_value_never_conflicts() {
        let mut t = terminal(ConsistencyPolicy::Strict);
        t.assign_topology(Some("A"), Some("V1"), Some("S1")).unwrap();
        t.assign_topology(None, None, None).unwrap();
        assert_eq!(t.topological_node(), Some("A"));
    }

    #[test]
    fn from_record_reads_references_and_flow() {
        let record = PropertyBag::new()
            .with("Terminal", PropertyValue::id("#T7"))
            .with("ConductingEquipment", PropertyValue::id("#LOAD1"))
            .with(
                "conductingEquipmentType",
                PropertyValue::id("http://iec.ch/TC57/2013/CIM-schema-cim16#EnergyConsumer"),
            )
            .with("connected", false)
            .with("TopologicalNode", PropertyValue::id("#TN1"))
            .with("p", 10.0)
            .with("q", 3.0);
        let t = CgmesTerminal::from_record(&record, ConsistencyPolicy::Warn).unwrap();
        assert_eq!(t.id(), "T7");
        assert_eq!(t.conducting_equipment(), Some("LOAD1"));
        assert_eq!(t.conducting_equipment_type(), Some("EnergyConsumer"));
        assert!(!t.connected());
        assert_eq!(t.topological_node(), Some("TN1"));
        assert_eq!(t.connectivity_node(), None);
        assert_eq!(t.flow(), PowerFlow::new(10.0, 3.0));
        assert_eq!(t.policy(), ConsistencyPolicy::Warn);
    }

    #[test]
    fn record_without_identity_is_skipped() {
        let record = PropertyBag::new().with("ConductingEquipment", PropertyValue::id("#L1"));
        assert!(CgmesTerminal::from_record(&record, ConsistencyPolicy::Strict).is_none());
    }
}
