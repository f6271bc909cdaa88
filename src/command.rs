//! The persisted boot command record and boot mode classification.
//!
//! ## Wire layout
//!
//! The record lives at offset 0 of the command partition and is always
//! read and written whole.  There is no version field.
//!
//! | Offset | Size | Field            | Encoding                         |
//! |--------|------|------------------|----------------------------------|
//! | 0      | 32   | `command_tag`    | text, NUL padded                 |
//! | 32     | 4    | `boot_partition` | u32 LE, 0 = primary, else second |
//! | 36     | 4    | `debug_mode`     | u32 LE, 0 = off, else on         |

use core::fmt;

use crate::error::StorageError;

pub const COMMAND_TAG_LEN: usize = 32;
pub const RECORD_LEN: usize = COMMAND_TAG_LEN + 4 + 4;

// ---------------------------------------------------------------------------
// One-shot command literals (compared as byte prefixes, case-sensitive)
// ---------------------------------------------------------------------------

pub const CMD_RECOVERY: &str = "recovery";
pub const CMD_FACTORY_RESET: &str = "factory-reset";
pub const CMD_FASTBOOT: &str = "fastboot";
pub const CMD_BOOTMENU: &str = "bootmenu";

// ---------------------------------------------------------------------------
// Command tag
// ---------------------------------------------------------------------------

/// Fixed-size command text.  Arbitrary bytes are preserved as read.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandTag([u8; COMMAND_TAG_LEN]);

impl CommandTag {
    /// Build a tag from text, truncating at [`COMMAND_TAG_LEN`] bytes.
    pub fn new(text: &str) -> Self {
        let mut buf = [0u8; COMMAND_TAG_LEN];
        let len = text.len().min(COMMAND_TAG_LEN);
        buf[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self(buf)
    }

    pub fn from_bytes(bytes: [u8; COMMAND_TAG_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMMAND_TAG_LEN] {
        &self.0
    }

    /// Zero the whole buffer.
    pub fn clear(&mut self) {
        self.0 = [0u8; COMMAND_TAG_LEN];
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Case-sensitive prefix match against a command literal.
    pub fn matches(&self, literal: &str) -> bool {
        self.0.starts_with(literal.as_bytes())
    }
}

impl fmt::Debug for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(COMMAND_TAG_LEN);
        match core::str::from_utf8(&self.0[..end]) {
            Ok(s) => write!(f, "CommandTag({s:?})"),
            Err(_) => write!(f, "CommandTag({:02x?})", &self.0[..end]),
        }
    }
}

// ---------------------------------------------------------------------------
// Boot slot
// ---------------------------------------------------------------------------

/// Which kernel image a normal boot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSlot {
    Primary,
    Secondary,
}

impl BootSlot {
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    /// Capitalised name used on the menu.
    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
        }
    }
}

// ---------------------------------------------------------------------------
// Boot command record
// ---------------------------------------------------------------------------

/// In-memory copy of the persisted record.
///
/// `boot_partition` and `debug_mode` keep their raw stored values so a
/// load/save cycle never rewrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootCommand {
    pub tag: CommandTag,
    pub boot_partition: u32,
    pub debug_mode: u32,
}

impl BootCommand {
    /// Decode a whole record.  Anything other than exactly [`RECORD_LEN`]
    /// bytes is rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        if bytes.len() != RECORD_LEN {
            return Err(StorageError::ShortRead {
                expected: RECORD_LEN,
                actual: bytes.len(),
            });
        }
        let mut tag = [0u8; COMMAND_TAG_LEN];
        tag.copy_from_slice(&bytes[..COMMAND_TAG_LEN]);
        let word = |at: usize| {
            let mut w = [0u8; 4];
            w.copy_from_slice(&bytes[at..at + 4]);
            u32::from_le_bytes(w)
        };
        Ok(Self {
            tag: CommandTag(tag),
            boot_partition: word(COMMAND_TAG_LEN),
            debug_mode: word(COMMAND_TAG_LEN + 4),
        })
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[..COMMAND_TAG_LEN].copy_from_slice(&self.tag.0);
        out[COMMAND_TAG_LEN..COMMAND_TAG_LEN + 4].copy_from_slice(&self.boot_partition.to_le_bytes());
        out[COMMAND_TAG_LEN + 4..].copy_from_slice(&self.debug_mode.to_le_bytes());
        out
    }

    pub fn boot_slot(&self) -> BootSlot {
        if self.boot_partition == 0 {
            BootSlot::Primary
        } else {
            BootSlot::Secondary
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_mode != 0
    }

    /// Flip between primary (0) and secondary (1).
    pub fn toggle_boot_slot(&mut self) {
        self.boot_partition = u32::from(self.boot_partition == 0);
    }

    /// Flip debug mode between off (0) and on (1).
    pub fn toggle_debug_mode(&mut self) {
        self.debug_mode = u32::from(self.debug_mode == 0);
    }
}

// ---------------------------------------------------------------------------
// Boot mode
// ---------------------------------------------------------------------------

/// How this boot cycle proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootMode {
    #[default]
    Normal,
    Recovery,
    FactoryReset,
    Fastboot,
    Menu,
}

impl BootMode {
    /// Map a command tag onto the mode it requests.  Literals are tried in
    /// a fixed order; anything unrecognised boots normally.
    pub fn classify(tag: &CommandTag) -> Self {
        if tag.matches(CMD_RECOVERY) {
            Self::Recovery
        } else if tag.matches(CMD_FACTORY_RESET) {
            Self::FactoryReset
        } else if tag.matches(CMD_FASTBOOT) {
            Self::Fastboot
        } else if tag.matches(CMD_BOOTMENU) {
            Self::Menu
        } else {
            Self::Normal
        }
    }
}
