//! Simulated measurement device.
//!
//! Stands in for the real hardware during development and tests. The
//! in-process [`SimulatedDevice`] implements the measurement interface
//! directly; with the `sim_device` feature the same response model is also
//! served over HTTP so the real client can be exercised end to end.

mod response;
#[cfg(feature = "sim_device")]
pub mod server;

pub use response::{SimulatedDevice, SimulatedResponse};
