use serde::Serialize;

use crate::names;
use crate::record::PropertyBag;

/// Electrical container of a node: voltage level and the substation holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CgmesContainer {
    voltage_level: Option<String>,
    substation: Option<String>,
}

impl CgmesContainer {
    pub fn new(voltage_level: Option<String>, substation: Option<String>) -> Self {
        Self {
            voltage_level,
            substation,
        }
    }

    pub fn from_record(record: &PropertyBag) -> Self {
        Self::new(
            record.id(names::VOLTAGE_LEVEL),
            record.id(names::SUBSTATION),
        )
    }

    pub fn voltage_level(&self) -> Option<&str> {
        self.voltage_level.as_deref()
    }

    pub fn substation(&self) -> Option<&str> {
        self.substation.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PropertyValue;

    #[test]
    fn container_from_record() {
        let record = PropertyBag::new()
            .with("ConnectivityNodeContainer", PropertyValue::id("#VL1"))
            .with("VoltageLevel", PropertyValue::id("#VL1"))
            .with("Substation", PropertyValue::id("#S1"));
        let container = CgmesContainer::from_record(&record);
        assert_eq!(container.voltage_level(), Some("VL1"));
        assert_eq!(container.substation(), Some("S1"));
    }

    #[test]
    fn bay_without_voltage_level() {
        let record = PropertyBag::new().with("Substation", PropertyValue::id("#S1"));
        let container = CgmesContainer::from_record(&record);
        assert_eq!(container.voltage_level(), None);
        assert_eq!(container.substation(), Some("S1"));
    }
}
