//! Boot menu configuration.
//!
//! All tunable parameters for the boot menu: partition names, key lines,
//! timing and colours.  Board integrators can ship an encoded blob
//! (postcard) that overrides the defaults; a blob that fails to decode or
//! validate is ignored, because a bad configuration must never keep the
//! device from booting.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins::KeyMap;

/// Maximum length of a partition name (the platform uses three letters).
pub const PARTITION_NAME_LEN: usize = 8;
/// Maximum length of the bootloader identification string.
pub const BOOTLOADER_ID_LEN: usize = 64;

pub type PartitionName = heapless::String<PARTITION_NAME_LEN>;

/// 24-bit display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Names of every partition the boot menu touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionMap {
    /// Persisted boot command record.
    pub command: PartitionName,
    /// Primary kernel image.
    pub primary: PartitionName,
    /// Secondary kernel image.
    pub secondary: PartitionName,
    /// Recovery kernel image.
    pub recovery: PartitionName,
    /// User data, erased on factory reset.
    pub user_data: PartitionName,
    /// Cache, erased on factory reset and from the menu.
    pub cache: PartitionName,
}

impl Default for PartitionMap {
    fn default() -> Self {
        Self {
            command: name("MSC"),
            primary: name("LNX"),
            secondary: name("AKB"),
            recovery: name("SOS"),
            user_data: name("UDA"),
            cache: name("CAC"),
        }
    }
}

fn name(s: &str) -> PartitionName {
    let mut n = PartitionName::new();
    let _ = n.push_str(s);
    n
}

/// Core boot menu configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootMenuConfig {
    /// Shown in the window title, followed by the platform version.
    pub bootloader_id: heapless::String<BOOTLOADER_ID_LEN>,

    // --- Storage ---
    pub partitions: PartitionMap,

    // --- Keys ---
    pub keys: KeyMap,
    /// Sleep between key polls (milliseconds).
    pub key_poll_interval_ms: u32,
    /// A key must read active on both sides of this delay (milliseconds).
    pub key_settle_ms: u32,

    // --- Pauses ---
    /// Pause after a factory reset before rebooting (milliseconds).
    pub factory_reset_pause_ms: u32,
    /// Pause after wiping the cache from the menu (milliseconds).
    pub wipe_cache_pause_ms: u32,
    /// Sleep per iteration of the unrecoverable-error idle loop (milliseconds).
    pub fatal_idle_interval_ms: u32,

    // --- Colours ---
    pub text_color: Rgb,
    pub highlight_color: Rgb,
    pub error_color: Rgb,
}

impl Default for BootMenuConfig {
    fn default() -> Self {
        let mut bootloader_id = heapless::String::new();
        let _ = bootloader_id.push_str("Skrilax_CZ's bootloader");
        Self {
            bootloader_id,
            partitions: PartitionMap::default(),
            keys: KeyMap::default(),

            // Keys
            key_poll_interval_ms: 30,
            key_settle_ms: 10,

            // Pauses
            factory_reset_pause_ms: 5000,
            wipe_cache_pause_ms: 2000,
            fatal_idle_interval_ms: 1000,

            // Colours
            text_color: Rgb::new(0xFF, 0xFF, 0xFF),
            highlight_color: Rgb::new(0x00, 0x00, 0x80),
            error_color: Rgb::new(0xFF, 0xFF, 0x01),
        }
    }
}

/// Range- and consistency-check a configuration.
pub fn validate_config(cfg: &BootMenuConfig) -> Result<()> {
    if !(1..=1000).contains(&cfg.key_poll_interval_ms) {
        return Err(Error::Config("key_poll_interval_ms must be 1–1000"));
    }
    if cfg.key_settle_ms > 100 {
        return Err(Error::Config("key_settle_ms must be 0–100"));
    }
    if cfg.fatal_idle_interval_ms == 0 {
        return Err(Error::Config("fatal_idle_interval_ms must be non-zero"));
    }
    let p = &cfg.partitions;
    for part in [
        &p.command,
        &p.primary,
        &p.secondary,
        &p.recovery,
        &p.user_data,
        &p.cache,
    ] {
        if part.is_empty() {
            return Err(Error::Config("partition names must be non-empty"));
        }
    }
    if p.user_data == p.cache {
        return Err(Error::Config("user_data and cache must be distinct"));
    }
    if p.command == p.cache || p.command == p.user_data {
        return Err(Error::Config(
            "command partition must not be an erasable partition",
        ));
    }
    if cfg.highlight_color == cfg.text_color {
        return Err(Error::Config("highlight_color must differ from text_color"));
    }
    Ok(())
}

/// Encode a configuration as a postcard blob.
pub fn encode_config(cfg: &BootMenuConfig) -> Result<Vec<u8>> {
    postcard::to_allocvec(cfg).map_err(|_| Error::Config("encode failed"))
}

/// Decode and validate a postcard blob.
pub fn decode_config(bytes: &[u8]) -> Result<BootMenuConfig> {
    let cfg: BootMenuConfig =
        postcard::from_bytes(bytes).map_err(|_| Error::Config("blob corrupted"))?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Decode a blob, falling back to defaults on any problem.
pub fn load_config_or_default(bytes: Option<&[u8]>) -> BootMenuConfig {
    match bytes {
        None => {
            info!("Config: no blob supplied, using defaults");
            BootMenuConfig::default()
        }
        Some(b) => match decode_config(b) {
            Ok(cfg) => {
                info!("Config: loaded {} byte blob", b.len());
                cfg
            }
            Err(e) => {
                warn!("Config: {}, using defaults", e);
                BootMenuConfig::default()
            }
        },
    }
}
