use serde::Serialize;

use crate::names;
use crate::record::PropertyBag;

/// Role of a transformer end within its transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WindingType {
    Primary,
    Secondary,
    Tertiary,
}

impl WindingType {
    const BY_SEQUENCE: [WindingType; 3] = [
        WindingType::Primary,
        WindingType::Secondary,
        WindingType::Tertiary,
    ];

    /// Winding type of a transformer-end record.
    ///
    /// CIM14 ends carry an explicit `windingType` literal; later versions only
    /// give the terminal sequence number, which counts from 1.
    /// A sequence number outside `1..=3` falls back to `Primary`.
    pub fn of(end: &PropertyBag) -> WindingType {
        if let Some(wtype) = end.local(names::WINDING_TYPE) {
            if wtype.ends_with("WindingType.primary") {
                WindingType::Primary
            } else if wtype.ends_with("WindingType.secondary") {
                WindingType::Secondary
            } else if wtype.ends_with("WindingType.tertiary") {
                WindingType::Tertiary
            } else {
                WindingType::Primary
            }
        } else if let Some(seq) = end.as_i64(names::TERMINAL_SEQUENCE_NUMBER) {
            usize::try_from(seq - 1)
                .ok()
                .and_then(|i| Self::BY_SEQUENCE.get(i))
                .copied()
                .unwrap_or(WindingType::Primary)
        } else {
            WindingType::Primary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PropertyValue;

    #[test]
    fn explicit_winding_type_suffix() {
        let end = PropertyBag::new().with(
            "windingType",
            PropertyValue::id("http://iec.ch/TC57/2009/CIM-schema-cim14#WindingType.primary"),
        );
        assert_eq!(WindingType::of(&end), WindingType::Primary);

        let end = PropertyBag::new().with(
            "windingType",
            PropertyValue::id("http://iec.ch/TC57/2009/CIM-schema-cim14#WindingType.tertiary"),
        );
        assert_eq!(WindingType::of(&end), WindingType::Tertiary);
    }

    #[test]
    fn unknown_suffix_falls_back_to_primary() {
        let end = PropertyBag::new().with("windingType", PropertyValue::id("#WindingType.quaternary"));
        assert_eq!(WindingType::of(&end), WindingType::Primary);
    }

    #[test]
    fn sequence_number_is_one_based() {
        let end = PropertyBag::new().with("terminalSequenceNumber", 2i64);
        assert_eq!(WindingType::of(&end), WindingType::Secondary);
        let end = PropertyBag::new().with("terminalSequenceNumber", "3");
        assert_eq!(WindingType::of(&end), WindingType::Tertiary);
    }

    #[test]
    fn out_of_range_sequence_number_means_primary() {
        for seq in [0i64, -1, 4] {
            let end = PropertyBag::new().with("terminalSequenceNumber", seq);
            assert_eq!(WindingType::of(&end), WindingType::Primary);
        }
    }

    #[test]
    fn explicit_type_wins_over_sequence_number() {
        let end = PropertyBag::new()
            .with("windingType", PropertyValue::id("#WindingType.secondary"))
            .with("terminalSequenceNumber", 1i64);
        assert_eq!(WindingType::of(&end), WindingType::Secondary);
    }

    #[test]
    fn neither_attribute_means_primary() {
        assert_eq!(WindingType::of(&PropertyBag::new()), WindingType::Primary);
    }

    #[test]
    fn ordering_follows_role() {
        assert!(WindingType::Primary < WindingType::Secondary);
        assert!(WindingType::Secondary < WindingType::Tertiary);
    }
}
