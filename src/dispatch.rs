//! Boot dispatcher: hand control to a kernel image.
//!
//! A successful boot never comes back.  Everything that does come back is a
//! [`BootFailure`] the caller turns into a menu banner.

use core::convert::Infallible;
use core::fmt::Write;

use log::{error, info};

use crate::app::ports::{BootArg, DisplayPort, ImagePort, PlatformPort};
use crate::command::BootSlot;
use crate::config::PartitionMap;
use crate::error::{BootFailure, BootFailureReason, FatalError};
use crate::menu::render;

/// Room for "secondary (XXXXXXXX)".
pub const LABEL_LEN: usize = 32;

/// Short human label for a boot target, e.g. `primary (LNX)`.
pub type Label = heapless::String<LABEL_LEN>;

/// A bootable kernel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootTarget {
    Primary,
    Secondary,
    Recovery,
}

impl BootTarget {
    pub fn from_slot(slot: BootSlot) -> Self {
        match slot {
            BootSlot::Primary => Self::Primary,
            BootSlot::Secondary => Self::Secondary,
        }
    }

    /// Partition holding this target's image.
    pub fn partition(self, map: &PartitionMap) -> &str {
        match self {
            Self::Primary => &map.primary,
            Self::Secondary => &map.secondary,
            Self::Recovery => &map.recovery,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Recovery => "recovery",
        }
    }

    /// Status line shown while the image loads.
    pub fn status_line(self) -> &'static str {
        match self {
            Self::Primary => "Booting primary kernel image",
            Self::Secondary => "Booting secondary kernel image",
            Self::Recovery => "Booting recovery kernel image",
        }
    }

    pub fn label(self, map: &PartitionMap) -> Label {
        let mut label = Label::new();
        // Partition names are bounded, so this always fits.
        let _ = write!(label, "{} ({})", self.description(), self.partition(map));
        label
    }
}

/// Load and jump into `target`.  Returns only on failure.
pub fn attempt<B>(
    board: &mut B,
    partitions: &PartitionMap,
    target: BootTarget,
    boot_arg: BootArg,
) -> Result<Infallible, BootFailure>
where
    B: DisplayPort + ImagePort,
{
    let fail = |reason| BootFailure { target, reason };

    render::basic_frame(board);
    board.set_status(target.status_line());
    board.refresh();

    let partition = target.partition(partitions);
    info!("Dispatch: loading {} from {}", target.description(), partition);

    let image = board
        .load_image(partition)
        .map_err(|e| {
            error!("Dispatch: {} load failed: {}", partition, e);
            fail(BootFailureReason::LoadFailed)
        })?;
    if !image.non_empty {
        error!("Dispatch: {} holds an empty image", partition);
        return Err(fail(BootFailureReason::EmptyImage));
    }

    info!("Dispatch: jumping to {:#010x}", image.entry_point);
    board.boot_image(&image, boot_arg);

    error!("Dispatch: {} kernel image returned", target.description());
    Err(fail(BootFailureReason::ImageReturned))
}

/// Ask the platform for a full reset.  Returns only if the reset did not
/// happen.
pub fn reboot<B: PlatformPort>(board: &mut B) -> FatalError {
    info!("Dispatch: rebooting");
    board.reboot();
    error!("Dispatch: reboot returned");
    FatalError::RebootReturned
}
