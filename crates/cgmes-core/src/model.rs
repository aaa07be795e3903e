//! The CGMES model facade.
//!
//! [`CgmesModel`] owns the raw record source and exposes derived views built
//! from it: terminals, nodes, containers, grouped transformer ends and base
//! voltages. Each view is computed once, on first access, and kept for the
//! lifetime of the model. [`CgmesModel::clear`] and [`CgmesModel::add`] change
//! the underlying records and drop every view.
//!
//! ```ignore
//! use cgmes_core::{CgmesModel, InMemoryRecords, ModelConfig};
//!
//! let model = CgmesModel::new(InMemoryRecords::new(), ModelConfig::default());
//! for (id, terminal) in model.terminals()? {
//!     println!("{id}: {:?}", terminal.voltage_level());
//! }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::container::CgmesContainer;
use crate::error::CgmesResult;
use crate::metadata::CgmesMetadataModel;
use crate::names;
use crate::namespace;
use crate::record::{PropertyBag, PropertyBags, RecordQuery};
use crate::subset::CgmesSubset;
use crate::terminal::{CgmesTerminal, ConsistencyPolicy};
use crate::winding::WindingType;

/// Model-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelConfig {
    /// Applied to every terminal built by the model
    pub consistency: ConsistencyPolicy,
}

#[derive(Debug, Default)]
struct TerminalView {
    by_id: HashMap<String, CgmesTerminal>,
    by_equipment: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct TransformerEndsView {
    grouped: BTreeMap<String, PropertyBags>,
    tap_changers: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct DerivedViews {
    terminals: OnceCell<TerminalView>,
    nodes: OnceCell<HashMap<String, PropertyBag>>,
    containers: OnceCell<HashMap<String, CgmesContainer>>,
    transformer_ends: OnceCell<TransformerEndsView>,
    base_voltages: OnceCell<HashMap<String, f64>>,
    node_breaker: OnceCell<bool>,
}

pub struct CgmesModel {
    records: Box<dyn RecordQuery>,
    config: ModelConfig,
    metadata: Vec<CgmesMetadataModel>,
    views: DerivedViews,
}

impl CgmesModel {
    pub fn new(records: impl RecordQuery + 'static, config: ModelConfig) -> Self {
        Self {
            records: Box::new(records),
            config,
            metadata: Vec::new(),
            views: DerivedViews::default(),
        }
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    /// Raw records of one kind, straight from the record source.
    pub fn records(&self, kind: &str) -> PropertyBags {
        self.records.records(kind)
    }

    /// Add records to a subset. Every derived view is recomputed on next access.
    pub fn add(&mut self, subset: CgmesSubset, kind: &str, records: PropertyBags) {
        self.records.add(subset, kind, records);
        self.invalidate();
    }

    /// Drop the records of a subset. Every derived view is recomputed on next access.
    pub fn clear(&mut self, subset: CgmesSubset) {
        debug!(%subset, "clearing subset");
        self.records.clear(subset);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.views = DerivedViews::default();
    }

    // Terminals

    /// Terminals by identity. The first record seen for an identity wins.
    pub fn terminals(&self) -> CgmesResult<&HashMap<String, CgmesTerminal>> {
        Ok(&self.terminal_view()?.by_id)
    }

    pub fn terminal(&self, id: &str) -> CgmesResult<Option<&CgmesTerminal>> {
        Ok(self.terminals()?.get(id))
    }

    /// Representative terminal of a piece of equipment: the first one seen.
    pub fn terminal_for_equipment(&self, equipment: &str) -> CgmesResult<Option<&CgmesTerminal>> {
        let view = self.terminal_view()?;
        Ok(view
            .by_equipment
            .get(equipment)
            .and_then(|id| view.by_id.get(id)))
    }

    fn terminal_view(&self) -> CgmesResult<&TerminalView> {
        self.views
            .terminals
            .get_or_try_init(|| self.compute_terminals())
    }

    fn compute_terminals(&self) -> CgmesResult<TerminalView> {
        let mut view = TerminalView::default();
        for record in self.records(names::TERMINAL) {
            let Some(mut terminal) = CgmesTerminal::from_record(&record, self.config.consistency)
            else {
                continue;
            };
            if view.by_id.contains_key(terminal.id()) {
                continue;
            }
            if let Some(container) = self.container_of(&terminal) {
                let cn = terminal.connectivity_node().map(str::to_string);
                let tn = terminal.topological_node().map(str::to_string);
                match cn {
                    Some(cn) => terminal.assign_connectivity(
                        Some(&cn),
                        tn.as_deref(),
                        container.voltage_level(),
                        container.substation(),
                    )?,
                    None => terminal.assign_topology(
                        tn.as_deref(),
                        container.voltage_level(),
                        container.substation(),
                    )?,
                }
            }
            if let Some(equipment) = terminal.conducting_equipment() {
                view.by_equipment
                    .entry(equipment.to_string())
                    .or_insert_with(|| terminal.id().to_string());
            }
            view.by_id.insert(terminal.id().to_string(), terminal);
        }
        debug!(count = view.by_id.len(), "terminals computed");
        Ok(view)
    }

    // Nodes and containers

    /// Connectivity and topological node records by identity.
    pub fn nodes(&self) -> &HashMap<String, PropertyBag> {
        self.views.nodes.get_or_init(|| {
            let mut nodes = HashMap::new();
            let kinds = [names::CONNECTIVITY_NODE, names::TOPOLOGICAL_NODE];
            for kind in kinds {
                for record in self.records(kind) {
                    if let Some(id) = record.id(kind) {
                        nodes.entry(id).or_insert(record);
                    }
                }
            }
            debug!(count = nodes.len(), "nodes computed");
            nodes
        })
    }

    pub fn node(&self, id: &str) -> Option<&PropertyBag> {
        self.nodes().get(id)
    }

    pub fn containers(&self) -> &HashMap<String, CgmesContainer> {
        self.views.containers.get_or_init(|| {
            let containers: HashMap<_, _> = self
                .records(names::CONNECTIVITY_NODE_CONTAINER)
                .iter()
                .filter_map(|record| {
                    record
                        .id(names::CONNECTIVITY_NODE_CONTAINER)
                        .map(|id| (id, CgmesContainer::from_record(record)))
                })
                .collect();
            debug!(count = containers.len(), "containers computed");
            containers
        })
    }

    pub fn container(&self, id: &str) -> Option<&CgmesContainer> {
        self.containers().get(id)
    }

    /// Container holding the node a terminal is attached to. The connectivity
    /// node is preferred over the topological node when both are known.
    pub fn container_of(&self, terminal: &CgmesTerminal) -> Option<&CgmesContainer> {
        let node_id = terminal
            .connectivity_node()
            .or_else(|| terminal.topological_node())?;
        let Some(node) = self.node(node_id) else {
            warn!(
                terminal = terminal.id(),
                node = node_id,
                "terminal references a node that is not in the model"
            );
            return None;
        };
        let container_id = node.id(names::CONNECTIVITY_NODE_CONTAINER)?;
        self.container(&container_id)
    }

    // Transformer ends

    /// Transformer ends grouped by transformer, ordered by winding type then end number.
    pub fn grouped_transformer_ends(&self) -> &BTreeMap<String, PropertyBags> {
        &self.transformer_ends_view().grouped
    }

    pub fn transformer_ends_of(&self, transformer: &str) -> Option<&PropertyBags> {
        self.grouped_transformer_ends().get(transformer)
    }

    /// Tap changer of a transformer. A phase tap changer is preferred over a
    /// ratio tap changer whatever the order of the ends declaring them.
    pub fn tap_changer_for_transformer(&self, transformer: &str) -> Option<&str> {
        self.transformer_ends_view()
            .tap_changers
            .get(transformer)
            .map(String::as_str)
    }

    fn transformer_ends_view(&self) -> &TransformerEndsView {
        self.views.transformer_ends.get_or_init(|| {
            let view = group_transformer_ends(&self.records(names::TRANSFORMER_END));
            debug!(transformers = view.grouped.len(), "transformer ends grouped");
            view
        })
    }

    // Base voltages

    /// Nominal voltage (kV) by base voltage identity.
    pub fn base_voltages(&self) -> &HashMap<String, f64> {
        self.views.base_voltages.get_or_init(|| {
            let mut voltages = HashMap::new();
            for record in self.records(names::BASE_VOLTAGE) {
                let Some(id) = record.id(names::BASE_VOLTAGE) else {
                    continue;
                };
                match record.as_f64(names::NOMINAL_VOLTAGE) {
                    Some(v) => {
                        voltages.insert(id, v);
                    }
                    None => debug!(base_voltage = %id, "base voltage without nominal voltage"),
                }
            }
            voltages
        })
    }

    pub fn nominal_voltage(&self, base_voltage: &str) -> Option<f64> {
        self.base_voltages().get(base_voltage).copied()
    }

    // Metadata

    /// Attach the header of one model file.
    pub fn add_metadata(&mut self, metadata: CgmesMetadataModel) {
        self.metadata.push(metadata);
        self.views.node_breaker = OnceCell::new();
    }

    pub fn metadata_models(&self) -> &[CgmesMetadataModel] {
        &self.metadata
    }

    /// Header used for model-level identity: the first equipment header, else the first one.
    fn main_metadata(&self) -> Option<&CgmesMetadataModel> {
        self.metadata
            .iter()
            .find(|m| m.subset() == CgmesSubset::Equipment)
            .or_else(|| self.metadata.first())
    }

    pub fn model_id(&self) -> &str {
        self.main_metadata()
            .and_then(CgmesMetadataModel::id)
            .unwrap_or("unknown")
    }

    pub fn version(&self) -> Option<i32> {
        self.main_metadata().and_then(CgmesMetadataModel::version)
    }

    pub fn scenario_time(&self) -> Option<DateTime<FixedOffset>> {
        self.main_metadata()
            .and_then(CgmesMetadataModel::scenario_time)
    }

    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.main_metadata().and_then(CgmesMetadataModel::created)
    }

    fn profiles(&self) -> impl Iterator<Item = (&CgmesMetadataModel, &str)> {
        self.metadata
            .iter()
            .flat_map(|m| m.profiles().iter().map(move |p| (m, p.as_str())))
    }

    /// Without any header (CIM14 data) equipment core is assumed present.
    pub fn has_equipment_core(&self) -> bool {
        self.metadata.is_empty()
            || self
                .profiles()
                .any(|(_, p)| namespace::is_equipment_core_profile(p))
    }

    /// Both equipment and topology boundary profiles are present.
    pub fn has_boundary(&self) -> bool {
        self.profiles()
            .any(|(_, p)| namespace::is_equipment_boundary_profile(p))
            && self
                .profiles()
                .any(|(_, p)| namespace::is_topology_boundary_profile(p))
    }

    /// Node-breaker data: CGMES 3 equipment with connectivity nodes, or every
    /// equipment model shipping its operation profile too.
    pub fn is_node_breaker(&self) -> bool {
        *self
            .views
            .node_breaker
            .get_or_init(|| self.compute_is_node_breaker())
    }

    fn compute_is_node_breaker(&self) -> bool {
        let eq_profiles: Vec<&str> = self
            .profiles()
            .map(|(_, p)| p)
            .filter(|p| namespace::is_equipment_core_profile(p))
            .collect();
        if !eq_profiles.is_empty()
            && eq_profiles
                .iter()
                .all(|p| namespace::is_eq_cgmes3_or_greater(p))
            && !self.records(names::CONNECTIVITY_NODE).is_empty()
        {
            return true;
        }

        let mut has_operation: BTreeMap<String, bool> = BTreeMap::new();
        let mut has_boundary_operation: BTreeMap<String, bool> = BTreeMap::new();
        for (model, profile) in self.profiles() {
            let key = model.id().unwrap_or_default().to_string();
            if namespace::is_equipment_core_profile(profile) {
                has_operation.entry(key.clone()).or_insert(false);
            }
            if namespace::is_equipment_operation_profile(profile) {
                has_operation.insert(key.clone(), true);
            }
            if namespace::is_equipment_boundary_profile(profile) {
                has_boundary_operation.entry(key.clone()).or_insert(false);
            }
            if namespace::is_equipment_boundary_operation_profile(profile) {
                has_boundary_operation.insert(key, true);
            }
        }
        for (model, value) in has_boundary_operation {
            has_operation
                .entry(model)
                .and_modify(|v| *v = *v && value)
                .or_insert(value);
        }
        let node_breaker = !has_operation.is_empty() && has_operation.values().all(|v| *v);
        for (model, value) in &has_operation {
            if !value {
                debug!(%model, "model has no equipment operation profile");
            }
        }
        node_breaker
    }
}

fn group_transformer_ends(ends: &[PropertyBag]) -> TransformerEndsView {
    let mut grouped: BTreeMap<String, PropertyBags> = BTreeMap::new();
    for end in ends {
        if let Some(transformer) = end.id(names::POWER_TRANSFORMER) {
            grouped.entry(transformer).or_default().push(end.clone());
        }
    }

    let mut tap_changers = HashMap::new();
    for (transformer, ends) in grouped.iter_mut() {
        ends.sort_by(compare_ends);
        let phase = ends.iter().find_map(|e| e.id(names::PHASE_TAP_CHANGER));
        let ratio = ends.iter().find_map(|e| e.id(names::RATIO_TAP_CHANGER));
        if let Some(tc) = phase.or(ratio) {
            tap_changers.insert(transformer.clone(), tc);
        }
    }
    TransformerEndsView {
        grouped,
        tap_changers,
    }
}

// Missing end numbers sort last.
fn compare_ends(a: &PropertyBag, b: &PropertyBag) -> Ordering {
    let end_number = |e: &PropertyBag| e.as_i64(names::END_NUMBER).unwrap_or(i64::MAX);
    WindingType::of(a)
        .cmp(&WindingType::of(b))
        .then_with(|| end_number(a).cmp(&end_number(b)))
}
