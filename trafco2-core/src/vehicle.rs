//! Vehicle records and their enumerated tags

use crate::errors::{TrafficError, TrafficResult};
use crate::trace::KinematicTrace;
use crate::units::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Drag coefficient assumed when a record does not specify one
pub const DEFAULT_DRAG_COEFFICIENT: FloatValue = 0.3;

/// Kind of vehicle
///
/// Mixes control tags (`Human`, `Acc`, `Cacc`) with powertrain tags as the
/// scenario data does. [`VehicleType::powertrain`] resolves which emission
/// engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Human,
    Acc,
    Cacc,
    Fuel,
    Electric,
    SmartFuel,
    SmartElectric,
}

/// Energy source, selecting the emission engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Powertrain {
    Fuel,
    Electric,
}

impl VehicleType {
    pub fn powertrain(&self) -> Powertrain {
        match self {
            VehicleType::Electric | VehicleType::SmartElectric => Powertrain::Electric,
            VehicleType::Human
            | VehicleType::Acc
            | VehicleType::Cacc
            | VehicleType::Fuel
            | VehicleType::SmartFuel => Powertrain::Fuel,
        }
    }

    /// Whether the vehicle carries an automated cruise system
    pub fn is_smart(&self) -> bool {
        match self {
            VehicleType::Acc
            | VehicleType::Cacc
            | VehicleType::SmartFuel
            | VehicleType::SmartElectric => true,
            VehicleType::Human | VehicleType::Fuel | VehicleType::Electric => false,
        }
    }

    /// The smart counterpart with the same powertrain
    pub fn to_smart(&self) -> VehicleType {
        match self.powertrain() {
            Powertrain::Fuel => VehicleType::SmartFuel,
            Powertrain::Electric => VehicleType::SmartElectric,
        }
    }

    /// The human-driven counterpart with the same powertrain
    pub fn to_manual(&self) -> VehicleType {
        match self {
            VehicleType::Acc | VehicleType::Cacc => VehicleType::Human,
            VehicleType::SmartFuel => VehicleType::Fuel,
            VehicleType::SmartElectric => VehicleType::Electric,
            other => *other,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleType::Human => "human",
            VehicleType::Acc => "acc",
            VehicleType::Cacc => "cacc",
            VehicleType::Fuel => "fuel",
            VehicleType::Electric => "electric",
            VehicleType::SmartFuel => "smart_fuel",
            VehicleType::SmartElectric => "smart_electric",
        };
        write!(f, "{}", name)
    }
}

/// Highway lane
///
/// Scenario data numbers lanes from the inside: 0 is the inner (fast) lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Inner,
    Middle,
    Outer,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Inner, Lane::Middle, Lane::Outer];

    pub fn from_index(index: usize) -> TrafficResult<Self> {
        Lane::ALL
            .get(index)
            .copied()
            .ok_or_else(|| TrafficError::invalid(format!("lane index {index} outside 0..3")))
    }

    pub fn index(&self) -> usize {
        match self {
            Lane::Inner => 0,
            Lane::Middle => 1,
            Lane::Outer => 2,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lane::Inner => "inner",
            Lane::Middle => "middle",
            Lane::Outer => "outer",
        };
        write!(f, "{}", name)
    }
}

/// State of a single vehicle for one scenario or time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    /// Gap to the vehicle ahead
    /// unit: m
    #[serde(default)]
    pub spacing_to_leader: FloatValue,
    /// Gap to the vehicle behind
    /// unit: m
    #[serde(default)]
    pub spacing_to_follower: FloatValue,
    #[serde(default = "default_drag")]
    pub base_drag_coefficient: FloatValue,
    /// Drag coefficient after platoon correction, if one has been applied
    #[serde(default)]
    pub corrected_drag_coefficient: Option<FloatValue>,
    pub lane: Lane,
    /// Longitudinal position along the road
    /// unit: m
    #[serde(default)]
    pub position: FloatValue,
    pub trace: KinematicTrace,
}

fn default_drag() -> FloatValue {
    DEFAULT_DRAG_COEFFICIENT
}

impl VehicleRecord {
    pub fn new(
        id: impl Into<String>,
        vehicle_type: VehicleType,
        lane: Lane,
        trace: KinematicTrace,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_type,
            spacing_to_leader: 0.0,
            spacing_to_follower: 0.0,
            base_drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            corrected_drag_coefficient: None,
            lane,
            position: 0.0,
            trace,
        }
    }

    pub fn with_spacing(mut self, to_leader: FloatValue, to_follower: FloatValue) -> Self {
        self.spacing_to_leader = to_leader;
        self.spacing_to_follower = to_follower;
        self
    }

    pub fn with_position(mut self, position: FloatValue) -> Self {
        self.position = position;
        self
    }

    /// Drag coefficient to use for emission estimates
    pub fn effective_drag_coefficient(&self) -> FloatValue {
        self.corrected_drag_coefficient
            .unwrap_or(self.base_drag_coefficient)
    }

    /// Ratio of effective to base drag, 1.0 when uncorrected
    pub fn drag_correction(&self) -> FloatValue {
        match self.corrected_drag_coefficient {
            Some(corrected) if self.base_drag_coefficient > 0.0 => {
                corrected / self.base_drag_coefficient
            }
            _ => 1.0,
        }
    }

    pub fn validate(&self) -> TrafficResult<()> {
        if self.spacing_to_leader < 0.0 || self.spacing_to_follower < 0.0 {
            return Err(TrafficError::invalid(format!(
                "vehicle {} has negative spacing",
                self.id
            )));
        }
        if !(self.base_drag_coefficient >= 0.0) {
            return Err(TrafficError::invalid(format!(
                "vehicle {} has invalid drag coefficient {}",
                self.id, self.base_drag_coefficient
            )));
        }
        Ok(())
    }
}
