//! VSP Emission Engine
//!
//! Estimates the CO2 emitted by a fuel vehicle from its kinematic trace using
//! Vehicle Specific Power (VSP) binning.
//!
//! # What This Engine Does
//!
//! 1. Computes VSP (kW/t) for every step of the trace:
//!    $$VSP = v a + v g \sin\theta + v C_r g \cos\theta + \frac{0.5 \rho C_d A (v + w)^2 v}{\epsilon \cdot 1000}$$
//! 2. Classifies the VSP into one of 13 bins.
//! 3. Looks up the bin's emission rate (g/s) in the injected
//!    [`EmissionRateTable`] and multiplies it by the step duration.
//!
//! The rate table is shared behind an `Arc` and never mutated, so one table
//! can back any number of engines evaluated in parallel.

use super::{ensure_drag_correction, EmissionModel};
use crate::parameters::FuelEmissionParameters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trafco2_core::errors::TrafficResult;
use trafco2_core::rates::{EmissionRateTable, EmissionRates, VspBin};
use trafco2_core::trace::{validate_profiles, KinematicTrace};
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::Powertrain;

/// Classify a VSP value into its bin
///
/// Thin wrapper over [`VspBin::classify`].
pub fn classify_vsp_bin(vsp: FloatValue) -> VspBin {
    VspBin::classify(vsp)
}

/// Fuel vehicle CO2 engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelEmissionModel {
    parameters: FuelEmissionParameters,
    rates: Arc<EmissionRateTable>,
}

impl FuelEmissionModel {
    /// Create an engine with default parameters and the placeholder rate table
    pub fn new() -> Self {
        Self::from_parameters(
            FuelEmissionParameters::default(),
            Arc::new(EmissionRateTable::default()),
        )
    }

    pub fn from_parameters(
        parameters: FuelEmissionParameters,
        rates: Arc<EmissionRateTable>,
    ) -> Self {
        Self { parameters, rates }
    }

    pub fn parameters(&self) -> &FuelEmissionParameters {
        &self.parameters
    }

    pub fn rates(&self) -> &EmissionRateTable {
        &self.rates
    }

    /// Vehicle Specific Power
    ///
    /// `road_angle` is in radians and `wind_speed` (m/s) adds to the
    /// vehicle's airspeed.
    ///
    /// unit: kW / t
    pub fn compute_vsp(
        &self,
        velocity: FloatValue,
        acceleration: FloatValue,
        road_angle: FloatValue,
        wind_speed: FloatValue,
    ) -> FloatValue {
        self.compute_vsp_with_drag(
            velocity,
            acceleration,
            road_angle,
            wind_speed,
            self.parameters.drag_coefficient,
        )
    }

    fn compute_vsp_with_drag(
        &self,
        velocity: FloatValue,
        acceleration: FloatValue,
        road_angle: FloatValue,
        wind_speed: FloatValue,
        drag_coefficient: FloatValue,
    ) -> FloatValue {
        let p = &self.parameters;

        let kinetic = velocity * acceleration;
        let potential = velocity * p.gravity * road_angle.sin();
        let rolling = velocity * p.rolling_resistance * p.gravity * road_angle.cos();
        let air_force =
            0.5 * p.air_density * drag_coefficient * p.frontal_area * (velocity + wind_speed).powi(2);
        let air = velocity * air_force / (p.mass_factor * 1000.0);

        kinetic + potential + rolling + air
    }

    /// Total CO2 over a trace on a flat road in still air
    ///
    /// unit: g
    pub fn compute_co2(&self, trace: &KinematicTrace) -> TrafficResult<FloatValue> {
        self.corrected_emission(trace, 1.0)
    }

    /// Total CO2 from raw, unvalidated profiles
    ///
    /// Fails with a length mismatch if the three profiles differ in length.
    pub fn compute_co2_from_profiles(
        &self,
        velocity: &[FloatValue],
        acceleration: &[FloatValue],
        duration: &[FloatValue],
    ) -> TrafficResult<FloatValue> {
        validate_profiles(velocity, acceleration, duration)?;
        let drag = self.parameters.drag_coefficient;
        Ok(velocity
            .iter()
            .zip(acceleration)
            .zip(duration)
            .map(|((&v, &a), &dt)| self.step_emission(v, a, dt, drag))
            .sum())
    }

    fn step_emission(
        &self,
        velocity: FloatValue,
        acceleration: FloatValue,
        duration: FloatValue,
        drag_coefficient: FloatValue,
    ) -> FloatValue {
        let vsp = self.compute_vsp_with_drag(velocity, acceleration, 0.0, 0.0, drag_coefficient);
        self.rates.rate_for_bin(classify_vsp_bin(vsp)) * duration
    }
}

impl Default for FuelEmissionModel {
    fn default() -> Self {
        Self::new()
    }
}

#[typetag::serde]
impl EmissionModel for FuelEmissionModel {
    fn powertrain(&self) -> Powertrain {
        Powertrain::Fuel
    }

    fn corrected_emission(
        &self,
        trace: &KinematicTrace,
        drag_correction: FloatValue,
    ) -> TrafficResult<FloatValue> {
        ensure_drag_correction(drag_correction)?;
        let drag = self.parameters.drag_coefficient * drag_correction;
        Ok(trace
            .steps()
            .map(|s| self.step_emission(s.velocity, s.acceleration, s.duration, drag))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use trafco2_core::errors::TrafficError;

    #[test]
    fn test_vsp_zero_at_rest() {
        let model = FuelEmissionModel::new();
        assert_eq!(model.compute_vsp(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_vsp_terms() {
        let model = FuelEmissionModel::new();
        let p = model.parameters().clone();
        let (v, a) = (20.0, 0.5);

        let expected = v * a
            + v * p.rolling_resistance * p.gravity
            + v * 0.5 * p.air_density * p.drag_coefficient * p.frontal_area * v * v
                / (p.mass_factor * 1000.0);
        assert_relative_eq!(model.compute_vsp(v, a, 0.0, 0.0), expected, epsilon = 1e-12);

        // Climbing adds load, a headwind adds drag
        assert!(model.compute_vsp(v, a, 0.05, 0.0) > expected);
        assert!(model.compute_vsp(v, a, 0.0, 5.0) > expected);
    }

    #[test]
    fn test_co2_zero_trace() {
        let model = FuelEmissionModel::new();
        let trace = KinematicTrace::new(vec![0.0; 4], vec![0.0; 4], vec![1.0, 2.0, 0.5, 1.5]).unwrap();

        let rate_at_rest = model.rates().rate_for_bin(classify_vsp_bin(0.0));
        assert_relative_eq!(model.compute_co2(&trace).unwrap(), rate_at_rest * 5.0);
    }

    #[test]
    fn test_co2_accumulates_by_bin() {
        // One rate per bin makes the bin visible in the result
        let rates: Vec<FloatValue> = (0..13).map(|i| i as FloatValue).collect();
        let model = FuelEmissionModel::from_parameters(
            FuelEmissionParameters::default(),
            Arc::new(EmissionRateTable::new(&rates).unwrap()),
        );

        let v = 10.0;
        let vsp = model.compute_vsp(v, 1.0, 0.0, 0.0);
        let trace = KinematicTrace::new(vec![v], vec![1.0], vec![2.0]).unwrap();
        assert_relative_eq!(
            model.compute_co2(&trace).unwrap(),
            classify_vsp_bin(vsp).index() as FloatValue * 2.0
        );
    }

    #[test]
    fn test_mismatched_profiles() {
        let model = FuelEmissionModel::new();
        let res = model.compute_co2_from_profiles(&[1.0, 2.0], &[0.0, 0.0], &[1.0]);
        assert!(matches!(res, Err(TrafficError::LengthMismatch { .. })));
    }

    #[test]
    fn test_profiles_match_trace() {
        let model = FuelEmissionModel::new();
        let v = vec![10.0, 15.0, 22.0];
        let a = vec![0.5, 1.0, -0.5];
        let d = vec![1.0, 1.0, 1.0];
        let trace = KinematicTrace::new(v.clone(), a.clone(), d.clone()).unwrap();
        assert_eq!(
            model.compute_co2_from_profiles(&v, &a, &d).unwrap(),
            model.compute_co2(&trace).unwrap()
        );
    }

    #[test]
    fn test_drag_correction_never_raises_emission() {
        let model = FuelEmissionModel::new();
        let trace = KinematicTrace::constant_speed(33.0, 1.0, 10).unwrap();
        let base = model.total_emission(&trace).unwrap();
        let corrected = model.corrected_emission(&trace, 0.4).unwrap();
        assert!(corrected <= base);
    }

    #[test]
    fn test_negative_drag_correction_rejected() {
        let model = FuelEmissionModel::new();
        let trace = KinematicTrace::constant_speed(33.0, 1.0, 10).unwrap();
        assert!(matches!(
            model.corrected_emission(&trace, -0.5),
            Err(TrafficError::InvalidInput(_))
        ));
        assert!(model.corrected_emission(&trace, FloatValue::NAN).is_err());
        assert!(model.corrected_emission(&trace, 0.0).is_ok());
    }
}
