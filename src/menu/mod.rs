//! Boot menu model: the eight items and the cursor.
//!
//! Drawing lives in [`render`]; the key-driven state machine that ties the
//! two together lives in [`crate::fsm`].

pub mod render;

use core::fmt::Write;

use crate::command::BootCommand;
use crate::dispatch::Label;

/// Number of menu items.
pub const N_ITEMS: usize = 8;

/// Longest item label is "Set Boot Secondary Kernel Image".
pub const ITEM_LABEL_LEN: usize = 40;

pub type ItemLabel = heapless::String<ITEM_LABEL_LEN>;

/// Menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MenuItem {
    Reboot = 0,
    FastbootMode = 1,
    BootPrimary = 2,
    BootSecondary = 3,
    BootRecovery = 4,
    ToggleBootImage = 5,
    ToggleDebugMode = 6,
    WipeCache = 7,
}

impl MenuItem {
    pub const ALL: [MenuItem; N_ITEMS] = [
        Self::Reboot,
        Self::FastbootMode,
        Self::BootPrimary,
        Self::BootSecondary,
        Self::BootRecovery,
        Self::ToggleBootImage,
        Self::ToggleDebugMode,
        Self::WipeCache,
    ];

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Text shown for this item.  The two toggles name the value they
    /// switch *to*.
    pub fn label(self, cmd: &BootCommand) -> ItemLabel {
        let mut s = ItemLabel::new();
        let _ = match self {
            Self::Reboot => s.push_str("Reboot"),
            Self::FastbootMode => s.push_str("Fastboot Mode"),
            Self::BootPrimary => s.push_str("Boot Primary Kernel Image"),
            Self::BootSecondary => s.push_str("Boot Secondary Kernel Image"),
            Self::BootRecovery => s.push_str("Boot Recovery"),
            Self::ToggleBootImage => {
                let _ = write!(s, "Set Boot {} Kernel Image", cmd.boot_slot().other().name());
                Ok(())
            }
            Self::ToggleDebugMode => {
                let _ = write!(s, "Set Debug Mode {}", on_off(!cmd.debug_enabled()));
                Ok(())
            }
            Self::WipeCache => s.push_str("Wipe Cache"),
        };
        s
    }
}

pub fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}

// ---------------------------------------------------------------------------
// Menu state
// ---------------------------------------------------------------------------

/// Cursor position plus the banner left by the last failed boot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuState {
    selected: usize,
    last_boot_failure: Option<Label>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Menu entered because a boot attempt came back.
    pub fn after_failure(label: Label) -> Self {
        Self {
            selected: 0,
            last_boot_failure: Some(label),
        }
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % N_ITEMS;
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + N_ITEMS - 1) % N_ITEMS;
    }

    pub fn reset_selection(&mut self) {
        self.selected = 0;
    }

    pub fn set_failure(&mut self, label: Label) {
        self.last_boot_failure = Some(label);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> MenuItem {
        // `selected` is always reduced modulo N_ITEMS.
        MenuItem::from_index(self.selected).unwrap_or(MenuItem::Reboot)
    }

    pub fn last_boot_failure(&self) -> Option<&str> {
        self.last_boot_failure.as_deref()
    }
}
