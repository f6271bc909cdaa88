//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements          | Connects to                    |
//! |------------|---------------------|--------------------------------|
//! | `log_sink` | EventSink           | `log` facade / debug console   |
//! | `msc`      | (uses PartitionPort)| Boot command record on `MSC`   |
//! | `sim`      | every hardware port | In-memory simulation board     |
//!
//! `sim` is compiled for unit tests and with the `sim` feature only.

pub mod log_sink;
pub mod msc;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
