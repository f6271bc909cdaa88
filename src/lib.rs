//! Boot menu library for the resident mobile-device bootloader.
//!
//! Decides how each boot proceeds (normal, recovery, factory reset,
//! fastboot or the interactive menu) from a persisted one-shot command and
//! the volume keys, and drives the text-mode menu.  All platform access
//! goes through the port traits in [`app::ports`]; the `sim` feature adds
//! `adapters::sim`, an in-memory board for host runs and tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod command;
pub mod config;
pub mod decision;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod menu;
pub mod pins;

pub use app::service::{BootMenuApp, bootmenu_main};
pub use fsm::Termination;
