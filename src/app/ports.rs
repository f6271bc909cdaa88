//! Port traits — the boundary between boot logic and the platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ BootMenuApp (domain)
//! ```
//!
//! The framebuffer, GPIO controller, partition layer, kernel loader and
//! platform reset are provided by the resident bootloader.  The boot menu
//! consumes them through these traits only, so the whole decision and menu
//! logic runs unchanged against the in-memory simulation board.
//!
//! Pauses and poll sleeps come from [`embedded_hal::delay::DelayNs`].

use embedded_hal::delay::DelayNs;

use crate::config::Rgb;
use crate::error::{ImageError, StorageError};

use super::events::BootEvent;

/// Upper bound on the length of a colour escape code.
pub const COLOR_CODE_MAX: usize = 4;

/// Opaque escape sequence the display interprets inline.
pub type ColorCode = heapless::String<COLOR_CODE_MAX>;

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Text-mode framebuffer.
pub trait DisplayPort {
    /// Bring up the framebuffer.  Called once at startup.
    fn init(&mut self);

    /// Set the window / device title line.
    fn set_title(&mut self, title: &str);

    /// Clear the text area and home the cursor.
    fn clear(&mut self);

    /// Replace the persistent status line.
    fn set_status(&mut self, status: &str);

    /// Print text at the cursor, interpreting embedded colour codes.
    fn print(&mut self, text: &str);

    /// Escape code that switches the foreground colour.
    fn text_color_code(&self, color: Rgb) -> ColorCode;

    /// Escape code that switches the background colour.
    fn background_color_code(&self, color: Rgb) -> ColorCode;

    /// Push the drawn frame to the panel.
    fn refresh(&mut self);
}

// ───────────────────────────────────────────────────────────────
// GPIO port
// ───────────────────────────────────────────────────────────────

pub trait GpioPort {
    /// Raw level of the pin at `(row, column)`.
    fn level(&mut self, row: u8, column: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Partition port
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

/// Handle to an open partition.  Must be closed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionHandle(pub u32);

/// Named raw partitions.
pub trait PartitionPort {
    /// Open a partition.  Fails with [`StorageError::NotFound`] or
    /// [`StorageError::Busy`].
    fn open(&mut self, name: &str, mode: OpenMode) -> Result<PartitionHandle, StorageError>;

    /// Read from the start of the partition.  Returns the byte count read.
    fn read(&mut self, handle: PartitionHandle, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write at the start of the partition.  Returns the byte count written.
    fn write(&mut self, handle: PartitionHandle, data: &[u8]) -> Result<usize, StorageError>;

    fn close(&mut self, handle: PartitionHandle);

    /// Erase a whole partition by name.
    fn format(&mut self, name: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Image port
// ───────────────────────────────────────────────────────────────

/// Platform-specific argument handed through to the booted kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootArg(pub u32);

/// A kernel image staged in memory by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    pub entry_point: u32,
    /// `false` when the loader produced an empty code buffer.
    pub non_empty: bool,
}

pub trait ImagePort {
    /// Stage the kernel image stored in `partition`.
    fn load_image(&mut self, partition: &str) -> Result<LoadedImage, ImageError>;

    /// Jump into a staged image.  Does not return on success.
    fn boot_image(&mut self, image: &LoadedImage, boot_arg: BootArg);
}

// ───────────────────────────────────────────────────────────────
// Platform port
// ───────────────────────────────────────────────────────────────

/// Platform services bound to the resident bootloader's context handle.
pub trait PlatformPort {
    /// Version string of the resident bootloader.
    fn bootloader_version(&self) -> &str;

    /// Apply a pending bootloader update, if any.  Called once at startup.
    fn check_bootloader_update(&mut self);

    /// Full device reset.  Returning from this call is an error.
    fn reboot(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port
// ───────────────────────────────────────────────────────────────

/// The boot core emits structured [`BootEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &BootEvent);
}

// ───────────────────────────────────────────────────────────────
// Combined board
// ───────────────────────────────────────────────────────────────

/// Every hardware-facing port in one value.  Implemented automatically
/// for any type that provides all of them.
pub trait BootPlatform:
    DisplayPort + GpioPort + PartitionPort + ImagePort + PlatformPort + DelayNs
{
}

impl<T> BootPlatform for T where
    T: DisplayPort + GpioPort + PartitionPort + ImagePort + PlatformPort + DelayNs
{
}
