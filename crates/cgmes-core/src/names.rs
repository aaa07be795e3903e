//! Record kinds and attribute names shared by the query seam and the model facade.

// Record kinds (CIM class names)
pub const TERMINAL: &str = "Terminal";
pub const CONNECTIVITY_NODE: &str = "ConnectivityNode";
pub const TOPOLOGICAL_NODE: &str = "TopologicalNode";
pub const CONNECTIVITY_NODE_CONTAINER: &str = "ConnectivityNodeContainer";
pub const TRANSFORMER_END: &str = "TransformerEnd";
pub const BASE_VOLTAGE: &str = "BaseVoltage";
pub const FULL_MODEL: &str = "FullModel";

// Attributes
pub const CONDUCTING_EQUIPMENT: &str = "ConductingEquipment";
pub const CONDUCTING_EQUIPMENT_TYPE: &str = "conductingEquipmentType";
pub const CONNECTED: &str = "connected";
pub const P: &str = "p";
pub const Q: &str = "q";
pub const VOLTAGE_LEVEL: &str = "VoltageLevel";
pub const SUBSTATION: &str = "Substation";
pub const POWER_TRANSFORMER: &str = "PowerTransformer";
pub const WINDING_TYPE: &str = "windingType";
pub const TERMINAL_SEQUENCE_NUMBER: &str = "terminalSequenceNumber";
pub const END_NUMBER: &str = "endNumber";
pub const RATIO_TAP_CHANGER: &str = "RatioTapChanger";
pub const PHASE_TAP_CHANGER: &str = "PhaseTapChanger";
pub const NOMINAL_VOLTAGE: &str = "nominalVoltage";
