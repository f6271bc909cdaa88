//! Polled, debounced key sampler for the volume rocker and power key.
//!
//! ## Hardware
//!
//! Keys are plain GPIO lines read through [`GpioPort`]; there are no
//! interrupts this early in boot.  Each key has its own polarity (see
//! [`crate::pins`]).
//!
//! ## Debounce
//!
//! A key counts as active only if it reads active and keeps reading active
//! at every 1 ms step of the settle window.  A release anywhere inside the
//! window rejects the sample.
//!
//! ## Event rules
//!
//! | Step | Rule                                                     |
//! |------|----------------------------------------------------------|
//! | 1    | Wait for VolumeUp, VolumeDown and Power to be released   |
//! | 2    | Poll VolumeDown, then VolumeUp, then Power               |
//! | 3    | Volume keys fire on press                                |
//! | 4    | Power fires on release                                   |

use embedded_hal::delay::DelayNs;

use crate::app::ports::GpioPort;
use crate::config::BootMenuConfig;
use crate::pins::{GpioPin, KeyMap};

/// Physical keys the sampler knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    VolumeUp,
    VolumeDown,
    RotationLock,
    Power,
}

/// Discrete key events consumed by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    VolumeUp,
    VolumeDown,
    Power,
    None,
}

pub struct KeySampler {
    keys: KeyMap,
    poll_interval_ms: u32,
    settle_ms: u32,
}

impl KeySampler {
    pub fn new(keys: KeyMap, poll_interval_ms: u32, settle_ms: u32) -> Self {
        Self {
            keys,
            poll_interval_ms,
            settle_ms,
        }
    }

    pub fn from_config(cfg: &BootMenuConfig) -> Self {
        Self::new(cfg.keys, cfg.key_poll_interval_ms, cfg.key_settle_ms)
    }

    /// The GPIO line a key is wired to.
    pub fn pin(&self, key: Key) -> GpioPin {
        match key {
            Key::VolumeUp => self.keys.volume_up,
            Key::VolumeDown => self.keys.volume_down,
            Key::RotationLock => self.keys.rotation_lock,
            Key::Power => self.keys.power,
        }
    }

    /// Debounced key state: active on the first read and on every 1 ms
    /// re-read across the settle window.
    pub fn is_active<H>(&self, hw: &mut H, key: Key) -> bool
    where
        H: GpioPort + DelayNs,
    {
        if !self.sample(hw, key) {
            return false;
        }
        for _ in 0..self.settle_ms {
            hw.delay_ms(1);
            if !self.sample(hw, key) {
                return false;
            }
        }
        true
    }

    /// Block until exactly one recognised key event occurs.
    ///
    /// A key held on entry is ignored until it has been released.  There is
    /// no timeout.
    pub fn wait_for_event<H>(&self, hw: &mut H) -> KeyEvent
    where
        H: GpioPort + DelayNs,
    {
        self.wait_release(hw, Key::VolumeUp);
        self.wait_release(hw, Key::VolumeDown);
        self.wait_release(hw, Key::Power);

        loop {
            if self.is_active(hw, Key::VolumeDown) {
                return KeyEvent::VolumeDown;
            }
            if self.is_active(hw, Key::VolumeUp) {
                return KeyEvent::VolumeUp;
            }
            if self.is_active(hw, Key::Power) {
                // Act on release so a held key cannot repeat the action.
                self.wait_release(hw, Key::Power);
                return KeyEvent::Power;
            }
            hw.delay_ms(self.poll_interval_ms);
        }
    }

    // ── Internal ──────────────────────────────────────────────────

    fn sample(&self, hw: &mut impl GpioPort, key: Key) -> bool {
        let pin = self.pin(key);
        pin.is_active_level(hw.level(pin.row, pin.column))
    }

    fn wait_release<H>(&self, hw: &mut H, key: Key)
    where
        H: GpioPort + DelayNs,
    {
        while self.is_active(hw, key) {
            hw.delay_ms(self.poll_interval_ms);
        }
    }
}
