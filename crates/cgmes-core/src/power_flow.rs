use serde::Serialize;

use crate::error::{CgmesError, CgmesResult};
use crate::names;
use crate::record::PropertyBag;

/// Active/reactive power pair attached to a terminal.
///
/// A flow read from a record that carries no `p`/`q` values is undefined;
/// undefined flows cannot take part in a sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerFlow {
    p: f64,
    q: f64,
    defined: bool,
}

impl PowerFlow {
    pub const UNDEFINED: PowerFlow = PowerFlow {
        p: f64::NAN,
        q: f64::NAN,
        defined: false,
    };

    pub fn new(p: f64, q: f64) -> Self {
        Self {
            p,
            q,
            defined: true,
        }
    }

    /// Flow from a record's `p` and `q` attributes; undefined unless both are present.
    pub fn from_record(record: &PropertyBag) -> Self {
        match (record.as_f64(names::P), record.as_f64(names::Q)) {
            (Some(p), Some(q)) => PowerFlow::new(p, q),
            _ => PowerFlow::UNDEFINED,
        }
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn sum(&self, other: &PowerFlow) -> CgmesResult<PowerFlow> {
        if !self.defined || !other.defined {
            return Err(CgmesError::UndefinedPowerFlow);
        }
        Ok(PowerFlow::new(self.p + other.p, self.q + other.q))
    }
}

impl Default for PowerFlow {
    fn default() -> Self {
        PowerFlow::UNDEFINED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_defined_flows() {
        let total = PowerFlow::new(10.0, 2.0)
            .sum(&PowerFlow::new(-4.0, 1.5))
            .unwrap();
        assert_eq!(total.p(), 6.0);
        assert_eq!(total.q(), 3.5);
        assert!(total.is_defined());
    }

    #[test]
    fn sum_rejects_undefined_operand() {
        let defined = PowerFlow::new(1.0, 1.0);
        assert!(matches!(
            defined.sum(&PowerFlow::UNDEFINED),
            Err(CgmesError::UndefinedPowerFlow)
        ));
        assert!(PowerFlow::UNDEFINED.sum(&defined).is_err());
    }

    #[test]
    fn record_needs_both_components() {
        let full = PropertyBag::new().with("p", 5.0).with("q", "-1.0");
        assert_eq!(PowerFlow::from_record(&full), PowerFlow::new(5.0, -1.0));

        let partial = PropertyBag::new().with("p", 5.0);
        assert!(!PowerFlow::from_record(&partial).is_defined());
    }
}
