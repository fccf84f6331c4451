use crate::errors::{ensure_unit_ratio, TrafficError, TrafficResult};
use crate::units::FloatValue;
use crate::vehicle::VehicleRecord;
use serde::{Deserialize, Serialize};

/// Smallest group of vehicles that counts as a platoon
pub const MIN_PLATOON_SIZE: usize = 2;

/// A group of vehicles travelling together, head first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatoonConfiguration {
    pub platoon_size: usize,
    pub vehicles: Vec<VehicleRecord>,
    /// Share of fuel vehicles in the platoon
    #[serde(default)]
    pub fuel_ratio: FloatValue,
}

/// Whether a configuration actually forms a platoon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatoonRegime {
    /// Fewer than two vehicles: each is treated on its own
    Independent,
    /// Head plus at least one follower
    Platoon,
}

impl PlatoonConfiguration {
    pub fn new(vehicles: Vec<VehicleRecord>, fuel_ratio: FloatValue) -> TrafficResult<Self> {
        let config = Self {
            platoon_size: vehicles.len(),
            vehicles,
            fuel_ratio,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn regime(&self) -> PlatoonRegime {
        if self.platoon_size < MIN_PLATOON_SIZE {
            PlatoonRegime::Independent
        } else {
            PlatoonRegime::Platoon
        }
    }

    pub fn head(&self) -> Option<&VehicleRecord> {
        self.vehicles.first()
    }

    pub fn validate(&self) -> TrafficResult<()> {
        ensure_unit_ratio("fuel_ratio", self.fuel_ratio)?;
        if self.platoon_size > self.vehicles.len() {
            return Err(TrafficError::invalid(format!(
                "platoon_size {} exceeds the {} vehicles supplied",
                self.platoon_size,
                self.vehicles.len()
            )));
        }
        self.vehicles.iter().try_for_each(|v| v.validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::KinematicTrace;
    use crate::vehicle::{Lane, VehicleType};

    fn vehicle(id: &str) -> VehicleRecord {
        VehicleRecord::new(
            id,
            VehicleType::SmartElectric,
            Lane::Inner,
            KinematicTrace::constant_speed(20.0, 1.0, 2).unwrap(),
        )
        .with_spacing(10.0, 10.0)
    }

    #[test]
    fn test_regime() {
        let single = PlatoonConfiguration::new(vec![vehicle("a")], 0.0).unwrap();
        assert_eq!(single.regime(), PlatoonRegime::Independent);

        let empty = PlatoonConfiguration::new(vec![], 0.0).unwrap();
        assert_eq!(empty.regime(), PlatoonRegime::Independent);

        let pair = PlatoonConfiguration::new(vec![vehicle("a"), vehicle("b")], 0.5).unwrap();
        assert_eq!(pair.regime(), PlatoonRegime::Platoon);
        assert_eq!(pair.head().unwrap().id, "a");
    }

    #[test]
    fn test_validation() {
        assert!(PlatoonConfiguration::new(vec![vehicle("a")], 1.5).is_err());

        let mut config = PlatoonConfiguration::new(vec![vehicle("a")], 0.0).unwrap();
        config.platoon_size = 3;
        assert!(config.validate().is_err());
    }
}
