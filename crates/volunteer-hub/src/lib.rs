//! Core library for the volunteer hub: event registration and eligibility
//! plus the configuration, telemetry, and error plumbing shared by the API
//! binary.

pub mod config;
pub mod error;
pub mod registration;
pub mod telemetry;
