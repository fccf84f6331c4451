//! Electric vehicle emission parameters

use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Parameters for the electric power and grid-emission engine.
///
/// Instantaneous battery power draw:
///
/// $$P = \max\left(0, \frac{\mu v + 0.5 C_d A v^3 + \delta v a}{\eta}\right)$$
///
/// Energy drawn from the grid is inflated by transmission losses and only the
/// thermally generated share of it emits CO2:
///
/// $$CO_2 = \frac{E}{1 - loss} \cdot share_{thermal} \cdot EF_{plant}$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricEmissionParameters {
    /// Drivetrain transmission efficiency (eta)
    /// default: 0.9
    pub transmission_efficiency: FloatValue,

    /// Rolling resistance coefficient (mu)
    /// default: 0.015
    pub rolling_resistance: FloatValue,

    /// Aerodynamic drag coefficient before any platoon correction
    /// default: 0.3
    pub drag_coefficient: FloatValue,

    /// Frontal area
    /// unit: m^2
    /// default: 2.0
    pub frontal_area: FloatValue,

    /// Rotating mass conversion factor (delta)
    /// default: 1.05
    pub rotational_mass_factor: FloatValue,

    /// CO2 emitted per kWh of thermal generation
    /// unit: g / kWh
    /// default: 293.4
    pub plant_emission_factor: FloatValue,

    /// Fraction of energy lost in grid transmission
    /// default: 0.07
    pub grid_loss_rate: FloatValue,

    /// Share of grid electricity produced by thermal plants
    /// default: 0.7
    pub thermal_share: FloatValue,
}

impl Default for ElectricEmissionParameters {
    fn default() -> Self {
        Self {
            transmission_efficiency: 0.9,
            rolling_resistance: 0.015,
            drag_coefficient: 0.3,
            frontal_area: 2.0,
            rotational_mass_factor: 1.05,
            plant_emission_factor: 293.4,
            grid_loss_rate: 0.07,
            thermal_share: 0.7,
        }
    }
}
