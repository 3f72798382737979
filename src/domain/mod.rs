//! Domain layer for the drover bot runtime.
//!
//! This module contains core business models and the ports the engine
//! consumes (store, reasoning provider, skill catalog).

pub mod models;
pub mod ports;
