//! Unified error types for the boot menu.
//!
//! `Error` covers the fallible library calls (configuration and storage).
//! The boot-flow outcomes have their own types: [`BootFailure`] becomes menu
//! state and [`FatalError`] travels up inside a `Termination`.  All of them
//! are `Copy` so they can be stored in the boot context without allocation.
//!
//! None of these errors unwind past the component that detected them:
//! storage errors become defaults, boot failures become a menu banner, and
//! only a fatal error reaches the top of the application.

use core::fmt;

use crate::dispatch::BootTarget;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A partition could not be opened, read, written or formatted.
    Storage(StorageError),
    /// Configuration is invalid or could not be decoded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The partition does not exist.
    NotFound,
    /// The partition exists but is held open elsewhere.
    Busy,
    /// Fewer bytes than a whole record were read.
    ShortRead { expected: usize, actual: usize },
    /// Fewer bytes than a whole record were written.
    ShortWrite { expected: usize, actual: usize },
    /// Generic I/O error from the partition service.
    IoError,
    /// Erasing the partition failed.
    FormatFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "partition not found"),
            Self::Busy => write!(f, "partition busy"),
            Self::ShortRead { expected, actual } => {
                write!(f, "short read ({actual} of {expected} bytes)")
            }
            Self::ShortWrite { expected, actual } => {
                write!(f, "short write ({actual} of {expected} bytes)")
            }
            Self::IoError => write!(f, "I/O error"),
            Self::FormatFailed => write!(f, "format failed"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Image errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    /// No image partition with that name.
    NotFound,
    /// The loader rejected the partition contents.
    LoadFailed,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "image partition not found"),
            Self::LoadFailed => write!(f, "image load failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Boot failures
// ---------------------------------------------------------------------------

/// Why a boot attempt returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootFailureReason {
    /// The image service could not load the partition.
    LoadFailed,
    /// The load succeeded but produced an empty image.
    EmptyImage,
    /// Control came back from the image's entry point.
    ImageReturned,
}

impl fmt::Display for BootFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed => write!(f, "load failed"),
            Self::EmptyImage => write!(f, "empty image"),
            Self::ImageReturned => write!(f, "image returned"),
        }
    }
}

/// A boot attempt that came back.  Always recoverable: it is turned into
/// an error banner on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootFailure {
    pub target: BootTarget,
    pub reason: BootFailureReason,
}

impl fmt::Display for BootFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kernel image: {}", self.target.description(), self.reason)
    }
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

/// Conditions after which the boot menu refuses to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    /// The platform reboot call returned instead of resetting the device.
    RebootReturned,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RebootReturned => write!(f, "reboot request returned"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
