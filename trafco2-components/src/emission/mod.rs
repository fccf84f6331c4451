//! Per-vehicle CO2 engines
//!
//! Two engines turn a [`KinematicTrace`] into grams of CO2:
//! - [`FuelEmissionModel`]: VSP binning against an injected rate table
//! - [`ElectricEmissionModel`]: battery power draw converted through the grid mix
//!
//! Both implement [`EmissionModel`], which is registered with `typetag` so a
//! configured pair of engines can be serialised and restored as trait objects.

mod electric;
mod vsp;

pub use electric::ElectricEmissionModel;
pub use vsp::{classify_vsp_bin, FuelEmissionModel};

use crate::config::ModelConfig;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use trafco2_core::errors::{TrafficError, TrafficResult};
use trafco2_core::trace::KinematicTrace;
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::{Powertrain, VehicleRecord};

/// A model estimating the CO2 emitted over a kinematic trace
#[typetag::serde(tag = "engine")]
pub trait EmissionModel: Debug + Send + Sync {
    /// Powertrain this engine models
    fn powertrain(&self) -> Powertrain;

    /// Total CO2 over the trace with the drag coefficient scaled by `drag_correction`
    ///
    /// unit: g
    fn corrected_emission(
        &self,
        trace: &KinematicTrace,
        drag_correction: FloatValue,
    ) -> TrafficResult<FloatValue>;

    /// Total CO2 over the trace with the uncorrected drag coefficient
    ///
    /// unit: g
    fn total_emission(&self, trace: &KinematicTrace) -> TrafficResult<FloatValue> {
        self.corrected_emission(trace, 1.0)
    }
}

/// Reject a drag correction factor that is negative or not finite
pub fn ensure_drag_correction(drag_correction: FloatValue) -> TrafficResult<()> {
    if drag_correction >= 0.0 && drag_correction.is_finite() {
        Ok(())
    } else {
        Err(TrafficError::invalid(format!(
            "drag correction must be a non-negative factor, got {drag_correction}"
        )))
    }
}

/// The fuel and electric engines used to score a mixed fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionEngines {
    pub fuel: Arc<dyn EmissionModel>,
    pub electric: Arc<dyn EmissionModel>,
}

impl EmissionEngines {
    pub fn new(fuel: Arc<dyn EmissionModel>, electric: Arc<dyn EmissionModel>) -> Self {
        Self { fuel, electric }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            fuel: Arc::new(FuelEmissionModel::from_parameters(
                config.fuel.clone(),
                Arc::clone(&config.emission_rates),
            )),
            electric: Arc::new(ElectricEmissionModel::from_parameters(
                config.electric.clone(),
            )),
        }
    }

    pub fn for_powertrain(&self, powertrain: Powertrain) -> &dyn EmissionModel {
        match powertrain {
            Powertrain::Fuel => self.fuel.as_ref(),
            Powertrain::Electric => self.electric.as_ref(),
        }
    }

    /// Emission of a vehicle, honouring any corrected drag coefficient it carries
    pub fn vehicle_emission(&self, vehicle: &VehicleRecord) -> TrafficResult<FloatValue> {
        self.for_powertrain(vehicle.vehicle_type.powertrain())
            .corrected_emission(&vehicle.trace, vehicle.drag_correction())
    }

    /// Emission of a vehicle with its base drag, ignoring any correction
    pub fn independent_emission(&self, vehicle: &VehicleRecord) -> TrafficResult<FloatValue> {
        self.for_powertrain(vehicle.vehicle_type.powertrain())
            .total_emission(&vehicle.trace)
    }
}

impl Default for EmissionEngines {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}
