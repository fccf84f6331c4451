//! Emission and traffic-flow models for trafco2
//!
//! This crate provides the models that turn the data types of `trafco2-core`
//! into CO2 estimates and macroscopic flow curves for mixed human, ACC and
//! CACC highway traffic.
//!
//! # Module Organisation
//!
//! Models are organised by domain:
//! - `emission`: per-vehicle CO2 engines (VSP binning for fuel, grid mix for electric)
//! - `air_resistance`: platoon drag reduction as a function of spacing
//! - `car_following`: ACC and CACC control laws and a follower simulator
//! - `degradation`: traffic composition from penetration and platoon size
//! - `lane_change`: lane utility, single-vehicle and cooperative lane changes
//! - `fundamental_diagram`: density, speed and flow curves
//! - `platoon_emission`: mixing and platoon emission scenarios
//! - `analyzer`: aggregation of emissions across mixing and ramp ratios
//!
//! # Parameters
//!
//! Each model has an associated parameters struct in the `parameters` module
//! with reference defaults. [`config::ModelConfig`] collects them all and
//! loads overrides from TOML.

pub mod air_resistance;
pub mod analyzer;
pub mod car_following;
pub mod config;
pub mod degradation;
pub mod emission;
pub mod fundamental_diagram;
pub mod lane_change;
pub mod parameters;
pub mod platoon_emission;
