//! Application core — boot decision and menu orchestration.
//!
//! All interaction with the display, keys, partitions and kernel loader
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable against the simulation board.

pub mod events;
pub mod ports;
pub mod service;
