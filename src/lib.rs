//! trafco2: CO2 emission and heterogeneous traffic-flow modelling
//!
//! Estimates the CO2 emitted by mixed highway traffic (human-driven, ACC and
//! CACC vehicles with fuel or electric powertrains) and how automated-driving
//! penetration and platoon degradation reshape traffic flow.
//!
//! The data model lives in [`trafco2_core`] and the models in
//! [`trafco2_components`].

pub use trafco2_components;
pub use trafco2_core;

pub use trafco2_components::config::ModelConfig;
pub use trafco2_core::{TrafficError, TrafficResult};
