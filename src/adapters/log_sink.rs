//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured boot events to the
//! `log` facade, which the resident bootloader routes to its debug console.

use log::{error, info, warn};

use crate::app::events::BootEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BootEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BootEvent) {
        match event {
            BootEvent::Started => {
                info!("START | boot menu up");
            }
            BootEvent::ModeResolved { requested, resolved } => {
                info!("MODE  | requested={:?} resolved={:?}", requested, resolved);
            }
            BootEvent::BootAttempt(target) => {
                info!("BOOT  | attempting {} kernel image", target.description());
            }
            BootEvent::BootFailed(failure) => {
                warn!("BOOT  | {}", failure);
            }
            BootEvent::PartitionErased { partition, ok } => {
                if *ok {
                    info!("STORE | erased {:?}", partition);
                } else {
                    warn!("STORE | erase of {:?} failed", partition);
                }
            }
            BootEvent::MenuEntered => {
                info!("MENU  | entered");
            }
            BootEvent::ItemSelected(item) => {
                info!("MENU  | selected {:?}", item);
            }
            BootEvent::SettingToggled { setting, value } => {
                info!("MENU  | {:?} -> {}", setting, value);
            }
            BootEvent::Fastboot => {
                info!("MODE  | returning to fastboot");
            }
            BootEvent::Fatal(e) => {
                error!("FATAL | {}", e);
            }
        }
    }
}
