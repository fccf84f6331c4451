use crate::errors::{ensure_unit_ratio, TrafficError, TrafficResult};
use crate::units::FloatValue;
use serde::{Deserialize, Serialize};

/// Tolerance on the sum of composition shares
pub const COMPOSITION_TOLERANCE: FloatValue = 1e-6;

/// Shares of human-driven, ACC and CACC vehicles in a traffic stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficComposition {
    pub human_ratio: FloatValue,
    pub acc_ratio: FloatValue,
    pub cacc_ratio: FloatValue,
}

impl TrafficComposition {
    /// Build a validated composition
    pub fn new(
        human_ratio: FloatValue,
        acc_ratio: FloatValue,
        cacc_ratio: FloatValue,
    ) -> TrafficResult<Self> {
        let composition = Self {
            human_ratio,
            acc_ratio,
            cacc_ratio,
        };
        composition.validate()?;
        Ok(composition)
    }

    /// All vehicles human-driven
    pub fn all_human() -> Self {
        Self {
            human_ratio: 1.0,
            acc_ratio: 0.0,
            cacc_ratio: 0.0,
        }
    }

    pub fn smart_ratio(&self) -> FloatValue {
        self.acc_ratio + self.cacc_ratio
    }

    pub fn total(&self) -> FloatValue {
        self.human_ratio + self.acc_ratio + self.cacc_ratio
    }

    pub fn validate(&self) -> TrafficResult<()> {
        ensure_unit_ratio("human_ratio", self.human_ratio)?;
        ensure_unit_ratio("acc_ratio", self.acc_ratio)?;
        ensure_unit_ratio("cacc_ratio", self.cacc_ratio)?;
        if (self.total() - 1.0).abs() > COMPOSITION_TOLERANCE {
            return Err(TrafficError::invalid(format!(
                "composition shares sum to {}, expected 1",
                self.total()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_composition() {
        let c = TrafficComposition::new(0.5, 0.25, 0.25).unwrap();
        assert_eq!(c.smart_ratio(), 0.5);
        assert!(TrafficComposition::all_human().validate().is_ok());
    }

    #[test]
    fn test_invalid_composition() {
        assert!(TrafficComposition::new(0.5, 0.5, 0.5).is_err());
        assert!(TrafficComposition::new(1.2, -0.2, 0.0).is_err());
    }
}
