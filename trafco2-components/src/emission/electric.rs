//! Electric Power/Emission Engine
//!
//! Estimates the grid-side CO2 equivalent of an electric vehicle's trace.
//!
//! Instantaneous power is the sum of rolling, aerodynamic and acceleration
//! power divided by the drivetrain efficiency. Negative net power
//! (regenerative braking) is not modelled: it is clamped to zero, so
//! deceleration never credits energy back. The integrated energy is then
//! converted to CO2 through grid losses, the thermal generation share and the
//! plant emission factor.

use super::{ensure_drag_correction, EmissionModel};
use crate::parameters::ElectricEmissionParameters;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trafco2_core::errors::{TrafficError, TrafficResult};
use trafco2_core::trace::KinematicTrace;
use trafco2_core::units::{watt_seconds_to_kwh, FloatValue, SECONDS_PER_HOUR};
use trafco2_core::vehicle::Powertrain;

/// Electric vehicle CO2 engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricEmissionModel {
    parameters: ElectricEmissionParameters,
}

impl ElectricEmissionModel {
    pub fn new() -> Self {
        Self::from_parameters(ElectricEmissionParameters::default())
    }

    pub fn from_parameters(parameters: ElectricEmissionParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &ElectricEmissionParameters {
        &self.parameters
    }

    /// Instantaneous power draw, floored at zero
    ///
    /// unit: W
    pub fn compute_instant_power(&self, velocity: FloatValue, acceleration: FloatValue) -> FloatValue {
        self.instant_power_with_drag(velocity, acceleration, self.parameters.drag_coefficient)
    }

    fn instant_power_with_drag(
        &self,
        velocity: FloatValue,
        acceleration: FloatValue,
        drag_coefficient: FloatValue,
    ) -> FloatValue {
        let p = &self.parameters;
        let rolling = p.rolling_resistance * velocity;
        let aerodynamic = 0.5 * drag_coefficient * p.frontal_area * velocity.powi(3);
        let inertial = p.rotational_mass_factor * velocity * acceleration;

        ((rolling + aerodynamic + inertial) / p.transmission_efficiency).max(0.0)
    }

    /// CO2 equivalent of the energy drawn by the vehicle
    ///
    /// `duration_hours` only feeds the diagnostic average-power figure.
    ///
    /// unit: g
    pub fn compute_co2_equivalent(
        &self,
        energy_kwh: FloatValue,
        duration_hours: FloatValue,
    ) -> TrafficResult<FloatValue> {
        if !(energy_kwh >= 0.0) || !(duration_hours >= 0.0) {
            return Err(TrafficError::invalid(format!(
                "energy ({energy_kwh} kWh) and duration ({duration_hours} h) must be non-negative"
            )));
        }
        let p = &self.parameters;
        let drawn_from_grid = energy_kwh / (1.0 - p.grid_loss_rate);
        let thermal = drawn_from_grid * p.thermal_share;

        if duration_hours > 0.0 {
            debug!(
                energy_kwh,
                average_kw = energy_kwh / duration_hours,
                "Electric energy converted to CO2 equivalent"
            );
        }
        Ok(thermal * p.plant_emission_factor)
    }

    /// Total CO2 equivalent from raw, unvalidated profiles
    pub fn compute_total_emission_from_profiles(
        &self,
        velocity: &[FloatValue],
        acceleration: &[FloatValue],
        duration: &[FloatValue],
    ) -> TrafficResult<FloatValue> {
        let trace = KinematicTrace::new(velocity.to_vec(), acceleration.to_vec(), duration.to_vec())?;
        self.compute_total_emission(&trace)
    }

    /// Total CO2 equivalent over a trace
    ///
    /// unit: g
    pub fn compute_total_emission(&self, trace: &KinematicTrace) -> TrafficResult<FloatValue> {
        self.corrected_emission(trace, 1.0)
    }

    /// Energy drawn over a trace
    ///
    /// unit: kWh
    pub fn compute_energy(&self, trace: &KinematicTrace, drag_correction: FloatValue) -> FloatValue {
        let drag = self.parameters.drag_coefficient * drag_correction;
        trace
            .steps()
            .map(|s| {
                watt_seconds_to_kwh(
                    self.instant_power_with_drag(s.velocity, s.acceleration, drag) * s.duration,
                )
            })
            .sum()
    }
}

impl Default for ElectricEmissionModel {
    fn default() -> Self {
        Self::new()
    }
}

#[typetag::serde]
impl EmissionModel for ElectricEmissionModel {
    fn powertrain(&self) -> Powertrain {
        Powertrain::Electric
    }

    fn corrected_emission(
        &self,
        trace: &KinematicTrace,
        drag_correction: FloatValue,
    ) -> TrafficResult<FloatValue> {
        ensure_drag_correction(drag_correction)?;
        let energy = self.compute_energy(trace, drag_correction);
        self.compute_co2_equivalent(energy, trace.total_duration() / SECONDS_PER_HOUR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_instant_power_terms() {
        let model = ElectricEmissionModel::new();
        let p = model.parameters().clone();
        let (v, a): (FloatValue, FloatValue) = (20.0, 0.3);
        let expected = (p.rolling_resistance * v
            + 0.5 * p.drag_coefficient * p.frontal_area * v.powi(3)
            + p.rotational_mass_factor * v * a)
            / p.transmission_efficiency;
        assert_relative_eq!(model.compute_instant_power(v, a), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_instant_power_clamped() {
        let model = ElectricEmissionModel::new();
        // Hard braking at low speed gives negative raw power
        assert_eq!(model.compute_instant_power(2.0, -8.0), 0.0);
        assert_eq!(model.compute_instant_power(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_co2_equivalent() {
        let model = ElectricEmissionModel::new();
        let co2 = model.compute_co2_equivalent(1.0, 1.0).unwrap();
        assert_relative_eq!(co2, 1.0 / (1.0 - 0.07) * 0.7 * 293.4, epsilon = 1e-9);
        assert!(model.compute_co2_equivalent(-1.0, 1.0).is_err());
    }

    #[test]
    fn test_deceleration_trace_equals_zero_power_trace() {
        let model = ElectricEmissionModel::new();
        let braking = KinematicTrace::new(vec![3.0, 2.0, 1.0], vec![-9.0; 3], vec![1.0; 3]).unwrap();
        let idle = KinematicTrace::new(vec![0.0; 3], vec![0.0; 3], vec![1.0; 3]).unwrap();

        assert_eq!(
            model.compute_total_emission(&braking).unwrap(),
            model.compute_total_emission(&idle).unwrap()
        );
        assert_eq!(model.compute_total_emission(&idle).unwrap(), 0.0);
    }

    #[test]
    fn test_total_emission_integrates_energy() {
        let model = ElectricEmissionModel::new();
        let trace = KinematicTrace::constant_speed(20.0, 1.0, 10).unwrap();
        let power = model.compute_instant_power(20.0, 0.0);
        let energy = power * 10.0 / 3600.0 / 1000.0;

        assert_relative_eq!(
            model.compute_total_emission(&trace).unwrap(),
            model.compute_co2_equivalent(energy, 10.0 / 3600.0).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_mismatched_profiles() {
        let model = ElectricEmissionModel::new();
        assert!(model
            .compute_total_emission_from_profiles(&[1.0], &[0.0, 0.0], &[1.0])
            .is_err());
    }

    #[test]
    fn test_negative_drag_correction_rejected() {
        let model = ElectricEmissionModel::new();
        let trace = KinematicTrace::constant_speed(25.0, 1.0, 10).unwrap();
        assert!(model.corrected_emission(&trace, -0.5).is_err());
        assert!(model.corrected_emission(&trace, 0.6).is_ok());
    }
}
