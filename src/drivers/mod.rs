//! Input drivers built on the GPIO port.

pub mod keys;
