//! Outbound boot events.
//!
//! The decision engine and the menu emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them: the log adapter prints them, tests record
//! them.

use crate::command::BootMode;
use crate::dispatch::BootTarget;
use crate::error::{BootFailure, FatalError};
use crate::menu::MenuItem;

/// Partitions the boot menu may erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErasablePartition {
    UserData,
    Cache,
}

/// Persisted settings the menu can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    BootImage,
    DebugMode,
}

/// Structured events emitted by the boot core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootEvent {
    /// Startup finished; the decision engine runs next.
    Started,

    /// The persisted command and the keys were evaluated.
    ModeResolved { requested: BootMode, resolved: BootMode },

    /// A kernel image is about to be loaded.
    BootAttempt(BootTarget),

    /// A kernel image boot came back.
    BootFailed(BootFailure),

    /// A partition erase finished.
    PartitionErased { partition: ErasablePartition, ok: bool },

    /// The interactive menu took over.
    MenuEntered,

    /// The power key confirmed a menu item.
    ItemSelected(MenuItem),

    /// A persisted setting was flipped (carries the new raw value).
    SettingToggled { setting: Setting, value: u32 },

    /// Control is handed back to the resident fastboot handler.
    Fastboot,

    /// The boot menu cannot continue.
    Fatal(FatalError),
}
