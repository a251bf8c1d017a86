//! Chargeband agent library.
//!
//! The agent keeps a battery-backed modem inside its safe charge band:
//! - `telemetry` reads the battery level from the modem's own web UI
//! - `decision` maps a reading to a relay action
//! - `device` commands the cloud-controlled smart plug
//! - `reachability` + `notify` implement the gated turn-on with escalation
//! - `automation` ties the above into the operations the scheduler and the
//!   HTTP surface both invoke
//! - `scheduler` drives the recurring jobs from one background loop

pub mod api;
pub mod automation;
pub mod config;
pub mod decision;
pub mod device;
pub mod notify;
pub mod reachability;
pub mod scheduler;
pub mod telemetry;
