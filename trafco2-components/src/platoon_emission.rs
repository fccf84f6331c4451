//! Platoon & Mixing Emission Models
//!
//! Scenario-level CO2 totals built on the per-vehicle engines:
//!
//! - **Smart-vehicle mixing**: whole-stream and per-lane totals, and the
//!   dedicated smart-lane case where platoon drag correction applies
//! - **Platooning**: electric platoons, platoons with a given share of fuel
//!   vehicles, and followers driving at the desired headway of their
//!   degradation scenario

use crate::air_resistance::AirResistanceCorrection;
use crate::car_following::{AccController, CaccController, Controller, FollowerSimulator};
use crate::config::ModelConfig;
use crate::emission::EmissionEngines;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trafco2_core::errors::{ensure_unit_ratio, TrafficResult};
use trafco2_core::platoon::{PlatoonConfiguration, PlatoonRegime};
use trafco2_core::trace::KinematicTrace;
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::{Lane, Powertrain, VehicleRecord, VehicleType};

/// Why a smart vehicle is driving at a given headway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationScenario {
    /// Human leader: degraded to ACC
    HumanVehicleAhead,
    /// Platoon ahead is full: degraded to ACC as a new head
    MaxPlatoonAhead,
    /// CACC follower inside a platoon
    Normal,
}

impl DegradationScenario {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, DegradationScenario::Normal)
    }
}

/// Emission of a follower simulated at a scenario's desired headway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadwayEmission {
    pub scenario: DegradationScenario,
    /// unit: s
    pub desired_headway: FloatValue,
    /// unit: g
    pub emission: FloatValue,
    pub follower: KinematicTrace,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatoonEmissionModel {
    engines: EmissionEngines,
    air_resistance: AirResistanceCorrection,
    acc: AccController,
    cacc: CaccController,
    follower: FollowerSimulator,
}

impl PlatoonEmissionModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            engines: EmissionEngines::from_config(config),
            air_resistance: AirResistanceCorrection::from_parameters(config.air_resistance.clone()),
            acc: AccController::from_parameters(config.acc.clone()),
            cacc: CaccController::from_parameters(config.cacc.clone()),
            follower: FollowerSimulator::from_parameters(config.follower.clone()),
        }
    }

    pub fn engines(&self) -> &EmissionEngines {
        &self.engines
    }

    pub fn air_resistance(&self) -> &AirResistanceCorrection {
        &self.air_resistance
    }

    /// Total over every vehicle, each scored by its powertrain's engine
    ///
    /// unit: g
    pub fn mixed_traffic_emission(&self, vehicles: &[VehicleRecord]) -> TrafficResult<FloatValue> {
        vehicles
            .iter()
            .map(|v| self.engines.vehicle_emission(v))
            .sum()
    }

    /// Totals per lane, every lane present
    pub fn lane_specific_emission(
        &self,
        vehicles: &[VehicleRecord],
    ) -> TrafficResult<IndexMap<Lane, FloatValue>> {
        let mut by_lane: IndexMap<Lane, FloatValue> = Lane::ALL.iter().map(|&l| (l, 0.0)).collect();
        for vehicle in vehicles {
            *by_lane.entry(vehicle.lane).or_insert(0.0) += self.engines.vehicle_emission(vehicle)?;
        }
        Ok(by_lane)
    }

    /// Emission of a smart-vehicle group, drag-corrected when it drives on a
    /// dedicated lane
    ///
    /// Smart vehicles use their own engine with the (possibly) corrected
    /// drag; every other vehicle is scored as a fuel vehicle with base drag.
    pub fn smart_lane_emission(
        &self,
        platoon: &PlatoonConfiguration,
        dedicated_lane: bool,
    ) -> TrafficResult<FloatValue> {
        let corrected;
        let platoon = if dedicated_lane {
            corrected = self.air_resistance.apply_platoon_correction(platoon)?;
            &corrected
        } else {
            platoon
        };

        platoon
            .vehicles
            .iter()
            .map(|v| match v.vehicle_type {
                VehicleType::SmartElectric => self
                    .engines
                    .electric
                    .corrected_emission(&v.trace, v.drag_correction()),
                VehicleType::SmartFuel => self
                    .engines
                    .fuel
                    .corrected_emission(&v.trace, v.drag_correction()),
                _ => self.engines.fuel.total_emission(&v.trace),
            })
            .sum()
    }

    /// Emission of a platoon, or of its vehicles on their own when it is too
    /// small to form one
    pub fn electric_platoon_emission(&self, platoon: &PlatoonConfiguration) -> TrafficResult<FloatValue> {
        match platoon.regime() {
            PlatoonRegime::Independent => self.independent_emission(platoon),
            PlatoonRegime::Platoon => self.corrected_platoon_emission(platoon),
        }
    }

    fn independent_emission(&self, platoon: &PlatoonConfiguration) -> TrafficResult<FloatValue> {
        platoon
            .vehicles
            .iter()
            .map(|v| self.engines.independent_emission(v))
            .sum()
    }

    fn corrected_platoon_emission(&self, platoon: &PlatoonConfiguration) -> TrafficResult<FloatValue> {
        let corrected = self.air_resistance.apply_platoon_correction(platoon)?;
        let total = self.mixed_traffic_emission(&corrected.vehicles)?;
        debug!(
            platoon_size = platoon.platoon_size,
            total, "Computed corrected platoon emission"
        );
        Ok(total)
    }

    /// Emission of platoons whose leading `round(fuel_ratio * len)` vehicles
    /// run on fuel and the rest on electricity
    pub fn mixed_fuel_ratio_emission(
        &self,
        platoons: &[PlatoonConfiguration],
        fuel_ratio: FloatValue,
    ) -> TrafficResult<FloatValue> {
        ensure_unit_ratio("fuel_ratio", fuel_ratio)?;

        platoons
            .iter()
            .map(|platoon| {
                let mut mixed = platoon.clone();
                let fuel_count = (fuel_ratio * mixed.vehicles.len() as FloatValue).round() as usize;
                for (i, vehicle) in mixed.vehicles.iter_mut().enumerate() {
                    vehicle.vehicle_type = if i < fuel_count {
                        VehicleType::SmartFuel
                    } else {
                        VehicleType::SmartElectric
                    };
                }
                mixed.fuel_ratio = fuel_ratio;
                self.electric_platoon_emission(&mixed)
            })
            .sum()
    }

    /// The controller a follower uses in a degradation scenario
    pub fn controller_for(&self, scenario: DegradationScenario) -> Controller {
        match scenario {
            DegradationScenario::HumanVehicleAhead | DegradationScenario::MaxPlatoonAhead => {
                Controller::acc(self.acc.clone())
            }
            DegradationScenario::Normal => Controller::cacc(self.cacc.clone()),
        }
    }

    /// Simulate a follower behind `leader` at the scenario's desired headway
    /// and score its trace
    pub fn desired_headway_emission(
        &self,
        leader: &KinematicTrace,
        scenario: DegradationScenario,
        powertrain: Powertrain,
    ) -> TrafficResult<HeadwayEmission> {
        let controller = self.controller_for(scenario);
        let follower = self.follower.follow(leader, &controller)?;
        let emission = self
            .engines
            .for_powertrain(powertrain)
            .total_emission(&follower)?;

        Ok(HeadwayEmission {
            scenario,
            desired_headway: controller.desired_headway(),
            emission,
            follower,
        })
    }
}
