//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the in-memory simulation board.  All tests run on the host with
//! no real hardware required.

mod boot_decision_tests;
mod menu_flow_tests;
mod mock_board;
