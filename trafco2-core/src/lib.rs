//! Core data model for highway CO2 and traffic-flow modelling
//!
//! This crate holds the value types shared by every model in
//! `trafco2-components`: kinematic traces, vehicle records, traffic
//! compositions, platoon configurations, the VSP emission-rate table and the
//! scenario records exchanged with display front-ends.

pub mod composition;
pub mod errors;
pub mod platoon;
pub mod rates;
pub mod scenario;
pub mod trace;
pub mod units;
pub mod vehicle;

pub use errors::{TrafficError, TrafficResult};
pub use units::FloatValue;
