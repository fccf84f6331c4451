//! Scenario descriptions exchanged with display front-ends
//!
//! Two kinds of scenario live here:
//! - [`OperationScenario`]: the highway operation classes the emission
//!   models are organised around (manual driving, smart-vehicle mixing,
//!   platooning), each with its automation levels and vehicle types.
//! - [`ScenarioRecord`]: a snapshot consumed by a lane-guidance display,
//!   carrying a lane recommendation and the surrounding vehicles.

use crate::errors::{TrafficError, TrafficResult};
use crate::units::FloatValue;
use crate::vehicle::{Lane, VehicleType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// SAE driving automation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AutomationLevel {
    L0,
    L1,
    L2,
    L3,
    L4,
    L5,
}

/// Highway operation scenario class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationScenario {
    ManualDriving,
    SmartVehicleMixing,
    VehiclePlatooning,
}

/// Parameters describing an [`OperationScenario`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioParameters {
    pub levels: Vec<AutomationLevel>,
    pub vehicle_types: Vec<VehicleType>,
    /// Whether vehicles of this class travel in platoons
    pub platooning: bool,
}

impl OperationScenario {
    pub const ALL: [OperationScenario; 3] = [
        OperationScenario::ManualDriving,
        OperationScenario::SmartVehicleMixing,
        OperationScenario::VehiclePlatooning,
    ];

    pub fn parameters(&self) -> ScenarioParameters {
        use AutomationLevel::*;
        match self {
            OperationScenario::ManualDriving => ScenarioParameters {
                levels: vec![L0, L1],
                vehicle_types: vec![VehicleType::Fuel, VehicleType::Electric],
                platooning: false,
            },
            OperationScenario::SmartVehicleMixing => ScenarioParameters {
                levels: vec![L2, L3],
                vehicle_types: vec![VehicleType::SmartFuel, VehicleType::SmartElectric],
                platooning: false,
            },
            OperationScenario::VehiclePlatooning => ScenarioParameters {
                levels: vec![L4, L5],
                vehicle_types: vec![VehicleType::SmartFuel, VehicleType::SmartElectric],
                platooning: true,
            },
        }
    }

    /// Scenario class covering an automation level
    pub fn for_level(level: AutomationLevel) -> Self {
        match level {
            AutomationLevel::L0 | AutomationLevel::L1 => OperationScenario::ManualDriving,
            AutomationLevel::L2 | AutomationLevel::L3 => OperationScenario::SmartVehicleMixing,
            AutomationLevel::L4 | AutomationLevel::L5 => OperationScenario::VehiclePlatooning,
        }
    }
}

impl FromStr for OperationScenario {
    type Err = TrafficError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual_driving" => Ok(OperationScenario::ManualDriving),
            "smart_vehicle_mixing" => Ok(OperationScenario::SmartVehicleMixing),
            "vehicle_platooning" => Ok(OperationScenario::VehiclePlatooning),
            other => Err(TrafficError::invalid(format!(
                "unknown operation scenario '{other}'"
            ))),
        }
    }
}

/// Lane guidance shown to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Keep,
    Left,
    Right,
}

impl RecommendationKind {
    /// Direction of a move between lanes
    ///
    /// Lanes are numbered from the inside (left), so moving to a smaller
    /// index is a move to the left.
    pub fn from_lane_move(current: Lane, target: Lane) -> Self {
        match target.index().cmp(&current.index()) {
            std::cmp::Ordering::Less => RecommendationKind::Left,
            std::cmp::Ordering::Greater => RecommendationKind::Right,
            std::cmp::Ordering::Equal => RecommendationKind::Keep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub text: String,
    pub distance_hint: String,
    pub icon: String,
}

/// Collision risk shown for a surrounding vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl TryFrom<u8> for RiskLevel {
    type Error = TrafficError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RiskLevel::Safe),
            1 => Ok(RiskLevel::Warning),
            2 => Ok(RiskLevel::Danger),
            other => Err(TrafficError::invalid(format!(
                "risk level {other} outside 0..=2"
            ))),
        }
    }
}

impl From<RiskLevel> for u8 {
    fn from(value: RiskLevel) -> Self {
        match value {
            RiskLevel::Safe => 0,
            RiskLevel::Warning => 1,
            RiskLevel::Danger => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioVehicle {
    /// Lane index, 0 being the inner lane
    pub lane: usize,
    /// Relative position in the view, 0 at the bottom and 1 at the top
    pub position: FloatValue,
    /// unit: km / h
    pub speed: FloatValue,
    pub risk_level: RiskLevel,
    /// Marks the vehicle occupying the recommended target gap
    #[serde(default)]
    pub target_lane: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub name: String,
    pub recommendation: Recommendation,
    pub vehicles: Vec<ScenarioVehicle>,
}

impl ScenarioRecord {
    pub fn validate(&self) -> TrafficResult<()> {
        for vehicle in &self.vehicles {
            Lane::from_index(vehicle.lane)?;
            if !(0.0..=1.0).contains(&vehicle.position) {
                return Err(TrafficError::invalid(format!(
                    "scenario '{}' has a vehicle at position {} outside [0, 1]",
                    self.name, vehicle.position
                )));
            }
            if !(vehicle.speed >= 0.0) {
                return Err(TrafficError::invalid(format!(
                    "scenario '{}' has a vehicle with speed {}",
                    self.name, vehicle.speed
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(content: &str) -> TrafficResult<Self> {
        let record: ScenarioRecord = serde_json::from_str(content)
            .map_err(|e| TrafficError::Config(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }
}
