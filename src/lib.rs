//! This crate implements the regulation screens of a bench power supply's front panel.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! A power supply offers two output functions which share one implementation:
//! * Constant voltage (CV) - regulate voltage, limit current.
//! * Constant current (CC) - regulate current, limit voltage.
//!
//! Each screen holds a voltage and a current setpoint, mirrors the measured
//! output, programs the power stage when the output is switched on and
//! whenever a setpoint changes, and stores its setpoints across power cycles.
//!
//! Setpoints can be edited on the panel or remotely by name through the
//! parameter gateway, in SI milli-units:
//! * `voltage` / `u` - millivolts.
//! * `current` / `i` - milliamperes.
//!
//! The power stage, ADC, display and flash store are supplied by the firmware
//! through the traits in [`hw`] and [`past`]. [`app::App`] ties them together.

#![cfg_attr(feature = "no-std", no_std)]

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hw;
pub mod past;
pub mod scaling;
pub mod screen;
pub mod setpoint;
pub mod types;

#[cfg(test)]
mod mock;
