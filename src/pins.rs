//! GPIO key assignments for the tablet's physical buttons.
//!
//! Single source of truth — the key sampler and the simulation board
//! reference this module rather than hard-coding row/column pairs.
//!
//! The GPIO service addresses a pin by `(row, column)`.  The volume rocker
//! and the rotation-lock slider pull their line low when engaged; the power
//! key drives its line high.

use serde::{Deserialize, Serialize};

/// One physical key line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioPin {
    pub row: u8,
    pub column: u8,
    /// `true` when the key reads as level 0 while pressed.
    pub active_low: bool,
}

impl GpioPin {
    pub const fn new(row: u8, column: u8, active_low: bool) -> Self {
        Self {
            row,
            column,
            active_low,
        }
    }

    /// Translate a raw pin level into "key engaged".
    pub const fn is_active_level(&self, level: bool) -> bool {
        level != self.active_low
    }
}

// ---------------------------------------------------------------------------
// Volume rocker
// ---------------------------------------------------------------------------

pub const VOLUME_UP: GpioPin = GpioPin::new(16, 4, true);
pub const VOLUME_DOWN: GpioPin = GpioPin::new(16, 5, true);

// ---------------------------------------------------------------------------
// Side switches
// ---------------------------------------------------------------------------

/// Sampled only; it never produces a menu event.
pub const ROTATION_LOCK: GpioPin = GpioPin::new(16, 2, true);
pub const POWER: GpioPin = GpioPin::new(8, 3, false);

/// Complete key map handed to the key sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMap {
    pub volume_up: GpioPin,
    pub volume_down: GpioPin,
    pub rotation_lock: GpioPin,
    pub power: GpioPin,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            volume_up: VOLUME_UP,
            volume_down: VOLUME_DOWN,
            rotation_lock: ROTATION_LOCK,
            power: POWER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_keys_engage_on_zero() {
        assert!(VOLUME_UP.is_active_level(false));
        assert!(!VOLUME_UP.is_active_level(true));
    }

    #[test]
    fn power_key_engages_on_one() {
        assert!(POWER.is_active_level(true));
        assert!(!POWER.is_active_level(false));
    }

    #[test]
    fn default_map_has_distinct_lines() {
        let m = KeyMap::default();
        let pins = [m.volume_up, m.volume_down, m.rotation_lock, m.power];
        for (i, a) in pins.iter().enumerate() {
            for b in &pins[i + 1..] {
                assert!((a.row, a.column) != (b.row, b.column));
            }
        }
    }
}
