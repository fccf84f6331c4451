//! Traffic Emission Analyzer
//!
//! Sweeps a traffic dataset over a sequence of ratios and reports the CO2
//! emitted at each one.
//!
//! # Smart-vehicle mixing
//!
//! For every mixing ratio, each lane is walked front to back and an evenly
//! spread share `ratio` of its vehicles is made smart. A smart vehicle
//! following a human (or leading the lane) degrades to ACC, one following a
//! full platoon starts a new platoon as its ACC head, and any other joins the
//! platoon ahead under CACC. Platoons of two or more vehicles receive the
//! air-resistance correction.
//!
//! # Off-ramp share
//!
//! For every ramp ratio, an evenly spread share of the vehicles leaves the
//! highway at the end of the diverge segment. Traces are split along the road
//! segments by distance travelled; once a vehicle has left, its speed is
//! capped at the ramp speed and its emission is booked to [`OFF_RAMP_SEGMENT`].

use crate::air_resistance::AirResistanceCorrection;
use crate::config::ModelConfig;
use crate::degradation::CruiseSystemDegradation;
use crate::emission::EmissionEngines;
use crate::parameters::AnalyzerParameters;
use crate::platoon_emission::PlatoonEmissionModel;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use trafco2_core::composition::TrafficComposition;
use trafco2_core::errors::{ensure_unit_ratio, TrafficError, TrafficResult};
use trafco2_core::platoon::PlatoonConfiguration;
use trafco2_core::trace::KinematicTrace;
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::{Lane, Powertrain, VehicleRecord};

/// Segment receiving the emission of vehicles after they leave the highway
pub const OFF_RAMP_SEGMENT: &str = "off_ramp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub name: String,
    /// unit: m
    pub length: FloatValue,
}

/// Vehicles on a stretch of highway, and the stretch itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficDataset {
    pub vehicles: Vec<VehicleRecord>,
    /// Consecutive segments from the start of the stretch
    #[serde(default)]
    pub segments: Vec<RoadSegment>,
    /// Index of the segment at whose end the off-ramp leaves
    #[serde(default)]
    pub diverge_segment: Option<usize>,
}

impl TrafficDataset {
    pub fn validate(&self) -> TrafficResult<()> {
        self.vehicles.iter().try_for_each(|v| v.validate())?;

        let mut names = HashSet::new();
        for segment in &self.segments {
            if !(segment.length > 0.0) {
                return Err(TrafficError::invalid(format!(
                    "segment '{}' must have a positive length, got {}",
                    segment.name, segment.length
                )));
            }
            if segment.name == OFF_RAMP_SEGMENT || !names.insert(segment.name.as_str()) {
                return Err(TrafficError::invalid(format!(
                    "segment name '{}' is reserved or repeated",
                    segment.name
                )));
            }
        }
        if let Some(index) = self.diverge_segment {
            if index >= self.segments.len() {
                return Err(TrafficError::invalid(format!(
                    "diverge segment {index} outside the {} segments",
                    self.segments.len()
                )));
            }
        }
        Ok(())
    }

    /// Cumulative end position (m) of every segment
    fn segment_ends(&self) -> Vec<FloatValue> {
        self.segments
            .iter()
            .scan(0.0 as FloatValue, |end, segment| {
                *end += segment.length;
                Some(*end)
            })
            .collect()
    }
}

/// Realised number of vehicles in each role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCounts {
    pub human: usize,
    pub acc: usize,
    pub cacc: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartVehicleImpact {
    pub ratio: FloatValue,
    /// unit: g
    pub total: FloatValue,
    pub by_lane: IndexMap<Lane, FloatValue>,
    /// Expected shares from the degradation model
    pub composition: TrafficComposition,
    /// Roles actually assigned in the dataset
    pub counts: VehicleCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampVehicleImpact {
    pub ratio: FloatValue,
    /// unit: g
    pub total: FloatValue,
    /// Per-segment totals in road order, then the off-ramp
    pub segments: IndexMap<String, FloatValue>,
    pub exiting_vehicles: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Human,
    AccHead,
    Cacc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficEmissionAnalyzer {
    parameters: AnalyzerParameters,
    emissions: PlatoonEmissionModel,
    air_resistance: AirResistanceCorrection,
    degradation: CruiseSystemDegradation,
}

impl TrafficEmissionAnalyzer {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            parameters: config.analyzer.clone(),
            emissions: PlatoonEmissionModel::from_config(config),
            air_resistance: AirResistanceCorrection::from_parameters(config.air_resistance.clone()),
            degradation: CruiseSystemDegradation::from_parameters(config.degradation.clone()),
        }
    }

    pub fn parameters(&self) -> &AnalyzerParameters {
        &self.parameters
    }

    fn engines(&self) -> &EmissionEngines {
        self.emissions.engines()
    }

    pub fn analyze_smart_vehicle_impact(
        &self,
        mixing_ratios: &[FloatValue],
        dataset: &TrafficDataset,
    ) -> TrafficResult<Vec<SmartVehicleImpact>> {
        validate_ratios("mixing_ratio", mixing_ratios)?;
        dataset.validate()?;
        self.evaluate(mixing_ratios, |ratio| self.smart_vehicle_impact(ratio, dataset))
    }

    pub fn analyze_ramp_vehicle_impact(
        &self,
        ramp_ratios: &[FloatValue],
        dataset: &TrafficDataset,
    ) -> TrafficResult<Vec<RampVehicleImpact>> {
        validate_ratios("ramp_ratio", ramp_ratios)?;
        dataset.validate()?;
        let diverge = dataset.diverge_segment.ok_or_else(|| {
            TrafficError::invalid("ramp analysis needs a diverge segment")
        })?;
        self.evaluate(ramp_ratios, |ratio| {
            self.ramp_vehicle_impact(ratio, dataset, diverge)
        })
    }

    fn evaluate<T, F>(&self, ratios: &[FloatValue], f: F) -> TrafficResult<Vec<T>>
    where
        T: Send,
        F: Fn(FloatValue) -> TrafficResult<T> + Sync,
    {
        if self.parameters.parallel {
            ratios.par_iter().map(|&r| f(r)).collect()
        } else {
            ratios.iter().map(|&r| f(r)).collect()
        }
    }

    /// The dataset with roles assigned for one mixing ratio
    pub fn adjust_traffic_composition(
        &self,
        ratio: FloatValue,
        dataset: &TrafficDataset,
    ) -> TrafficResult<(Vec<VehicleRecord>, VehicleCounts)> {
        ensure_unit_ratio("mixing_ratio", ratio)?;
        let max_platoon_size = self.parameters.max_platoon_size;
        let mut counts = VehicleCounts::default();
        let mut adjusted = Vec::with_capacity(dataset.vehicles.len());

        for lane in Lane::ALL {
            let mut in_lane: Vec<&VehicleRecord> =
                dataset.vehicles.iter().filter(|v| v.lane == lane).collect();
            // Front of the lane first
            in_lane.sort_by(|a, b| b.position.total_cmp(&a.position));

            let mut platoon: Vec<VehicleRecord> = Vec::new();
            for (k, original) in in_lane.into_iter().enumerate() {
                let mut vehicle = original.clone();
                vehicle.corrected_drag_coefficient = None;

                let role = if evenly_selected(k, ratio) {
                    vehicle.vehicle_type = vehicle.vehicle_type.to_smart();
                    if platoon.is_empty() || platoon.len() >= max_platoon_size {
                        Role::AccHead
                    } else {
                        Role::Cacc
                    }
                } else {
                    vehicle.vehicle_type = vehicle.vehicle_type.to_manual();
                    Role::Human
                };

                match role {
                    Role::Human => {
                        counts.human += 1;
                        adjusted.extend(self.close_platoon(&mut platoon)?);
                        adjusted.push(vehicle);
                    }
                    Role::AccHead => {
                        counts.acc += 1;
                        adjusted.extend(self.close_platoon(&mut platoon)?);
                        platoon.push(vehicle);
                    }
                    Role::Cacc => {
                        counts.cacc += 1;
                        platoon.push(vehicle);
                    }
                }
            }
            adjusted.extend(self.close_platoon(&mut platoon)?);
        }
        Ok((adjusted, counts))
    }

    /// Drain the current platoon, drag-correcting it when it has followers
    fn close_platoon(&self, platoon: &mut Vec<VehicleRecord>) -> TrafficResult<Vec<VehicleRecord>> {
        let members = std::mem::take(platoon);
        if members.len() < 2 {
            return Ok(members);
        }
        let fuel = members
            .iter()
            .filter(|v| v.vehicle_type.powertrain() == Powertrain::Fuel)
            .count();
        let fuel_ratio = fuel as FloatValue / members.len() as FloatValue;
        let config = PlatoonConfiguration::new(members, fuel_ratio)?;
        Ok(self.air_resistance.apply_platoon_correction(&config)?.vehicles)
    }

    fn smart_vehicle_impact(
        &self,
        ratio: FloatValue,
        dataset: &TrafficDataset,
    ) -> TrafficResult<SmartVehicleImpact> {
        let (vehicles, counts) = self.adjust_traffic_composition(ratio, dataset)?;
        let by_lane = self.emissions.lane_specific_emission(&vehicles)?;
        let total = by_lane.values().sum();
        let composition = self
            .degradation
            .composition(ratio, self.parameters.max_platoon_size)?;

        debug!(
            ratio,
            total,
            acc = counts.acc,
            cacc = counts.cacc,
            "Evaluated smart vehicle mixing ratio"
        );
        Ok(SmartVehicleImpact {
            ratio,
            total,
            by_lane,
            composition,
            counts,
        })
    }

    fn ramp_vehicle_impact(
        &self,
        ratio: FloatValue,
        dataset: &TrafficDataset,
        diverge: usize,
    ) -> TrafficResult<RampVehicleImpact> {
        let ends = dataset.segment_ends();
        let mut segments: IndexMap<String, FloatValue> = dataset
            .segments
            .iter()
            .map(|s| (s.name.clone(), 0.0))
            .chain(std::iter::once((OFF_RAMP_SEGMENT.to_string(), 0.0)))
            .collect();
        let ramp_speed = self.parameters.ramp_speed;
        let mut exiting_vehicles = 0;

        for (k, vehicle) in dataset.vehicles.iter().enumerate() {
            let engine = self.engines().for_powertrain(vehicle.vehicle_type.powertrain());
            let correction = vehicle.drag_correction();
            // Boundaries are measured from where the vehicle starts
            let relative = |end: &FloatValue| end - vehicle.position;

            if evenly_selected(k, ratio) {
                exiting_vehicles += 1;
                let boundaries: Vec<FloatValue> = ends[..=diverge].iter().map(relative).collect();
                let mut pieces = vehicle.trace.split_by_distance(&boundaries);
                let after_exit = pieces.pop().unwrap_or_else(KinematicTrace::empty);

                for (segment, piece) in dataset.segments.iter().zip(&pieces) {
                    segments[segment.name.as_str()] += engine.corrected_emission(piece, correction)?;
                }
                let on_ramp = after_exit.map_steps(|_, step| {
                    if step.velocity > ramp_speed {
                        (ramp_speed, 0.0)
                    } else {
                        (step.velocity, step.acceleration)
                    }
                })?;
                segments[OFF_RAMP_SEGMENT] += engine.corrected_emission(&on_ramp, correction)?;
            } else {
                // The last segment also takes anything driven past the stretch
                let boundaries: Vec<FloatValue> = ends
                    .iter()
                    .take(ends.len().saturating_sub(1))
                    .map(relative)
                    .collect();
                let pieces = vehicle.trace.split_by_distance(&boundaries);
                for (segment, piece) in dataset.segments.iter().zip(&pieces) {
                    segments[segment.name.as_str()] += engine.corrected_emission(piece, correction)?;
                }
            }
        }

        let total = segments.values().sum();
        debug!(ratio, total, exiting_vehicles, "Evaluated off-ramp ratio");
        Ok(RampVehicleImpact {
            ratio,
            total,
            segments,
            exiting_vehicles,
        })
    }
}

/// Whether the `k`-th vehicle belongs to an evenly spread share `ratio`
///
/// Selects exactly `floor(m * ratio)` of the first `m` vehicles for any `m`.
fn evenly_selected(k: usize, ratio: FloatValue) -> bool {
    ((k + 1) as FloatValue * ratio).floor() > (k as FloatValue * ratio).floor()
}

fn validate_ratios(name: &str, ratios: &[FloatValue]) -> TrafficResult<()> {
    ratios.iter().try_for_each(|&r| ensure_unit_ratio(name, r))
}
