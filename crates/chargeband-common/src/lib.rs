//! Shared types for the chargeband controller.
//!
//! This crate contains:
//! - **Data models** — battery readings, power actions, the uniform
//!   `OperationResult` every control operation returns
//! - **Error taxonomy** — per-component failure kinds for telemetry,
//!   cloud commands, and notification delivery

pub mod error;
pub mod models;
