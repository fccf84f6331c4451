//! Model parameters
//!
//! This module contains the parameter structures for every model in the
//! crate. Each struct is `#[serde(default)]` so configuration files only need
//! to list the values they override, and each `Default` impl carries the
//! reference values documented on its fields.

mod air_resistance;
mod analyzer;
mod car_following;
mod degradation;
mod electric;
mod flow;
mod fuel;
mod lane_change;

pub use air_resistance::AirResistanceParameters;
pub use analyzer::AnalyzerParameters;
pub use car_following::{AccParameters, CaccParameters, FollowerSimulationParameters};
pub use degradation::{DegradationParameters, DEFAULT_MAX_SERIES_TERMS};
pub use electric::ElectricEmissionParameters;
pub use flow::{FundamentalDiagramParameters, HeadwayMix};
pub use fuel::FuelEmissionParameters;
pub use lane_change::{LaneChangeParameters, LaneUtilityParameters};
