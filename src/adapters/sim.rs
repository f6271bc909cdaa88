//! In-memory simulation board.
//!
//! Implements every hardware port plus [`DelayNs`] against plain host
//! memory so the full boot flow runs on a development machine and in
//! tests.  Time is virtual: delays advance a nanosecond counter and never
//! sleep.
//!
//! ## Key model
//!
//! Keys are either *held* (pressed for a fixed time, from t=0 or from the
//! current virtual time) or *scripted* (queued presses of [`PRESS_MS`]
//! each).  The next scripted press starts only at the end of a poll delay:
//! a delay preceded by a read of all three menu keys with none of them
//! held.  Pauses taken elsewhere (wipe, factory reset) never start a press.
//! A queue that runs dry while the caller keeps waiting panics after
//! [`IDLE_LIMIT_MS`] of virtual time instead of spinning forever.
//!
//! The simulated jump into a kernel image always returns; the simulated
//! reboot does too.

use std::collections::{HashMap, VecDeque};

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::ports::{
    BootArg, ColorCode, DisplayPort, GpioPort, ImagePort, LoadedImage, OpenMode,
    PartitionHandle, PartitionPort, PlatformPort,
};
use crate::command::{BootCommand, RECORD_LEN};
use crate::config::{PartitionMap, Rgb};
use crate::drivers::keys::Key;
use crate::error::{ImageError, StorageError};
use crate::pins::KeyMap;

/// How long a scripted key press stays down.
pub const PRESS_MS: u64 = 60;
/// Virtual idle time after which an exhausted key script panics.
pub const IDLE_LIMIT_MS: u64 = 10 * 60 * 1000;

const NS_PER_MS: u64 = 1_000_000;
const PARTITION_SIZE: usize = 512;
const MENU_KEYS_SAMPLED: u8 = 0b111;

/// One refreshed screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub status: String,
    pub text: String,
}

pub struct SimBoard {
    // --- Clock ---
    now_ns: u64,
    idle_ns: u64,

    // --- Keys ---
    keys: KeyMap,
    held: Vec<(Key, u64)>,
    script: VecDeque<Key>,
    /// Menu keys read since the last delay, one bit per key.
    sampled: u8,

    // --- Partitions ---
    /// Partition `set_record` and `record` operate on.
    command_partition: String,
    partitions: HashMap<String, Vec<u8>>,
    handles: HashMap<u32, (String, OpenMode)>,
    next_handle: u32,
    open_failures: HashMap<String, StorageError>,
    format_failures: Vec<String>,
    formatted: Vec<String>,

    // --- Images ---
    images: HashMap<String, LoadedImage>,
    loads: Vec<String>,
    boots: Vec<(LoadedImage, BootArg)>,

    // --- Display ---
    initialized: bool,
    title: String,
    status: String,
    screen: String,
    frames: Vec<Frame>,

    // --- Platform ---
    version: String,
    update_checks: u32,
    reboots: u32,
}

impl SimBoard {
    /// A bare board: no partitions, no images, no keys pressed.
    pub fn new() -> Self {
        Self {
            now_ns: 0,
            idle_ns: 0,
            keys: KeyMap::default(),
            held: Vec::new(),
            script: VecDeque::new(),
            sampled: 0,
            command_partition: PartitionMap::default().command.as_str().to_owned(),
            partitions: HashMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
            open_failures: HashMap::new(),
            format_failures: Vec::new(),
            formatted: Vec::new(),
            images: HashMap::new(),
            loads: Vec::new(),
            boots: Vec::new(),
            initialized: false,
            title: String::new(),
            status: String::new(),
            screen: String::new(),
            frames: Vec::new(),
            version: String::from("sim-1.0"),
            update_checks: 0,
            reboots: 0,
        }
    }

    /// A board with every partition in `map` present, a zeroed command
    /// record and a bootable image in each kernel partition.
    pub fn with_layout(map: &PartitionMap) -> Self {
        let mut board = Self::new();
        board.command_partition = map.command.as_str().to_owned();
        for name in [&map.command, &map.user_data, &map.cache] {
            board.set_partition(name, vec![0xA5; PARTITION_SIZE]);
        }
        board.set_record(&BootCommand::default());
        for (i, name) in [&map.primary, &map.secondary, &map.recovery].into_iter().enumerate() {
            board.set_partition(name, vec![0x7F; PARTITION_SIZE]);
            board.set_image(
                name,
                LoadedImage {
                    entry_point: 0x1000_8000 + (i as u32) * 0x0100_0000,
                    non_empty: true,
                },
            );
        }
        board
    }

    // ── Key scripting ─────────────────────────────────────────────

    /// Hold `key` from t=0 for `ms` milliseconds.
    pub fn hold_at_boot(&mut self, key: Key, ms: u64) {
        self.held.push((key, ms * NS_PER_MS));
    }

    /// Hold `key` from the current virtual time for `ms` milliseconds.
    pub fn hold(&mut self, key: Key, ms: u64) {
        self.held.push((key, self.now_ns + ms * NS_PER_MS));
    }

    /// Queue presses, each released before the next one starts.
    pub fn press_keys(&mut self, keys: &[Key]) {
        self.script.extend(keys.iter().copied());
    }

    pub fn pending_presses(&self) -> usize {
        self.script.len()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.now_ns / NS_PER_MS
    }

    // ── Partition setup and inspection ────────────────────────────

    pub fn set_partition(&mut self, name: &str, data: Vec<u8>) {
        self.partitions.insert(name.to_owned(), data);
    }

    pub fn partition(&self, name: &str) -> Option<&[u8]> {
        self.partitions.get(name).map(Vec::as_slice)
    }

    /// Write a record at offset 0 of the command partition, creating the
    /// partition if needed.
    pub fn set_record(&mut self, cmd: &BootCommand) {
        let data = self
            .partitions
            .entry(self.command_partition.clone())
            .or_insert_with(|| vec![0; PARTITION_SIZE]);
        if data.len() < RECORD_LEN {
            data.resize(RECORD_LEN, 0);
        }
        data[..RECORD_LEN].copy_from_slice(&cmd.encode());
    }

    /// The record currently stored in the command partition, if it holds one.
    pub fn record(&self) -> Option<BootCommand> {
        let data = self.partitions.get(&self.command_partition)?;
        BootCommand::decode(data.get(..RECORD_LEN)?).ok()
    }

    pub fn fail_open(&mut self, name: &str, err: StorageError) {
        self.open_failures.insert(name.to_owned(), err);
    }

    pub fn fail_format(&mut self, name: &str) {
        self.format_failures.push(name.to_owned());
    }

    /// Partitions erased so far, in order.
    pub fn formatted(&self) -> &[String] {
        &self.formatted
    }

    /// Handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    // ── Image setup and inspection ────────────────────────────────

    pub fn set_image(&mut self, partition: &str, image: LoadedImage) {
        self.images.insert(partition.to_owned(), image);
    }

    pub fn remove_image(&mut self, partition: &str) {
        self.images.remove(partition);
    }

    /// Partitions the loader was asked for, in order.
    pub fn loads(&self) -> &[String] {
        &self.loads
    }

    /// Images jumped into, in order.
    pub fn boots(&self) -> &[(LoadedImage, BootArg)] {
        &self.boots
    }

    // ── Display inspection ────────────────────────────────────────

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    // ── Platform inspection ───────────────────────────────────────

    pub fn set_version(&mut self, version: &str) {
        self.version = version.to_owned();
    }

    pub fn update_checks(&self) -> u32 {
        self.update_checks
    }

    pub fn reboots(&self) -> u32 {
        self.reboots
    }

    // ── Internal ──────────────────────────────────────────────────

    fn is_held(&self, key: Key) -> bool {
        self.held.iter().any(|&(k, _)| k == key)
    }

    fn menu_key_held(&self) -> bool {
        self.held
            .iter()
            .any(|&(k, _)| matches!(k, Key::VolumeUp | Key::VolumeDown | Key::Power))
    }

    fn menu_key_bit(key: Key) -> u8 {
        match key {
            Key::VolumeUp => 0b001,
            Key::VolumeDown => 0b010,
            Key::Power => 0b100,
            Key::RotationLock => 0,
        }
    }

    fn advance(&mut self, ns: u64) {
        let poll = self.sampled == MENU_KEYS_SAMPLED;
        self.sampled = 0;
        self.now_ns += ns;
        let now = self.now_ns;

        let before = self.held.len();
        self.held.retain(|&(_, until)| until > now);
        if self.held.len() != before {
            self.idle_ns = 0;
            return;
        }
        if self.menu_key_held() {
            return;
        }

        match self.script.front() {
            Some(&key) if poll => {
                self.script.pop_front();
                debug!("SimBoard: press {:?} at {} ms", key, self.elapsed_ms());
                self.held.push((key, now + PRESS_MS * NS_PER_MS));
                self.idle_ns = 0;
            }
            Some(_) => {}
            None => {
                self.idle_ns += ns;
                if self.idle_ns > IDLE_LIMIT_MS * NS_PER_MS {
                    panic!("SimBoard: key script exhausted while waiting for input");
                }
            }
        }
    }

    fn color_code(prefix: &str, color: Rgb) -> ColorCode {
        let index = ((color.r >> 7) << 2) | ((color.g >> 7) << 1) | (color.b >> 7);
        let mut code = ColorCode::new();
        let _ = code.push_str(prefix);
        let _ = code.push(char::from(b'0' + index));
        code
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

// ── Ports ─────────────────────────────────────────────────────────

impl DelayNs for SimBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * NS_PER_MS);
    }
}

impl GpioPort for SimBoard {
    fn level(&mut self, row: u8, column: u8) -> bool {
        let keys = [Key::VolumeUp, Key::VolumeDown, Key::RotationLock, Key::Power];
        let pins = [
            self.keys.volume_up,
            self.keys.volume_down,
            self.keys.rotation_lock,
            self.keys.power,
        ];
        match keys
            .into_iter()
            .zip(pins)
            .find(|(_, pin)| pin.row == row && pin.column == column)
        {
            Some((key, pin)) => {
                self.sampled |= Self::menu_key_bit(key);
                self.is_held(key) != pin.active_low
            }
            None => false,
        }
    }
}

impl PartitionPort for SimBoard {
    fn open(&mut self, name: &str, mode: OpenMode) -> Result<PartitionHandle, StorageError> {
        if let Some(&err) = self.open_failures.get(name) {
            return Err(err);
        }
        if !self.partitions.contains_key(name) {
            return Err(StorageError::NotFound);
        }
        if self.handles.values().any(|(open, _)| open == name) {
            return Err(StorageError::Busy);
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, (name.to_owned(), mode));
        Ok(PartitionHandle(handle))
    }

    fn read(&mut self, handle: PartitionHandle, buf: &mut [u8]) -> Result<usize, StorageError> {
        let (name, _) = self.handles.get(&handle.0).ok_or(StorageError::IoError)?;
        let data = self.partitions.get(name).ok_or(StorageError::IoError)?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write(&mut self, handle: PartitionHandle, data: &[u8]) -> Result<usize, StorageError> {
        let (name, mode) = self.handles.get(&handle.0).ok_or(StorageError::IoError)?;
        if *mode != OpenMode::Write {
            return Err(StorageError::IoError);
        }
        let stored = self.partitions.get_mut(name).ok_or(StorageError::IoError)?;
        if stored.len() < data.len() {
            stored.resize(data.len(), 0);
        }
        stored[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self, handle: PartitionHandle) {
        self.handles.remove(&handle.0);
    }

    fn format(&mut self, name: &str) -> Result<(), StorageError> {
        if self.format_failures.iter().any(|n| n == name) {
            return Err(StorageError::FormatFailed);
        }
        let data = self.partitions.get_mut(name).ok_or(StorageError::NotFound)?;
        data.fill(0);
        self.formatted.push(name.to_owned());
        Ok(())
    }
}

impl ImagePort for SimBoard {
    fn load_image(&mut self, partition: &str) -> Result<LoadedImage, ImageError> {
        self.loads.push(partition.to_owned());
        self.images.get(partition).copied().ok_or(ImageError::NotFound)
    }

    fn boot_image(&mut self, image: &LoadedImage, boot_arg: BootArg) {
        info!("SimBoard: jump to {:#010x} (simulated, returns)", image.entry_point);
        self.boots.push((*image, boot_arg));
    }
}

impl PlatformPort for SimBoard {
    fn bootloader_version(&self) -> &str {
        &self.version
    }

    fn check_bootloader_update(&mut self) {
        self.update_checks += 1;
    }

    fn reboot(&mut self) {
        info!("SimBoard: reboot requested (simulated, returns)");
        self.reboots += 1;
    }
}

impl DisplayPort for SimBoard {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn clear(&mut self) {
        self.screen.clear();
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_owned();
    }

    fn print(&mut self, text: &str) {
        self.screen.push_str(text);
    }

    fn text_color_code(&self, color: Rgb) -> ColorCode {
        Self::color_code("^F", color)
    }

    fn background_color_code(&self, color: Rgb) -> ColorCode {
        Self::color_code("^B", color)
    }

    fn refresh(&mut self) {
        self.frames.push(Frame {
            status: self.status.clone(),
            text: self.screen.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(board: &mut SimBoard, key: Key) -> bool {
        let pin = match key {
            Key::VolumeUp => board.keys.volume_up,
            Key::VolumeDown => board.keys.volume_down,
            Key::RotationLock => board.keys.rotation_lock,
            Key::Power => board.keys.power,
        };
        board.level(pin.row, pin.column) != pin.active_low
    }

    fn poll_all(board: &mut SimBoard) {
        for key in [Key::VolumeDown, Key::VolumeUp, Key::Power] {
            read(board, key);
        }
    }

    #[test]
    fn scripted_press_starts_after_a_poll_delay() {
        let mut board = SimBoard::new();
        board.press_keys(&[Key::VolumeUp]);
        board.delay_ms(100);
        assert_eq!(board.pending_presses(), 1);

        poll_all(&mut board);
        board.delay_ms(30);
        assert_eq!(board.pending_presses(), 0);
        assert!(read(&mut board, Key::VolumeUp));

        board.delay_ms(PRESS_MS as u32);
        assert!(!read(&mut board, Key::VolumeUp));
    }

    #[test]
    fn pause_after_a_partial_read_starts_no_press() {
        let mut board = SimBoard::new();
        board.press_keys(&[Key::VolumeDown]);
        read(&mut board, Key::Power);
        board.delay_ms(2000);
        assert_eq!(board.pending_presses(), 1);
        assert!(!read(&mut board, Key::VolumeDown));
    }

    #[test]
    fn held_key_blocks_the_script_until_released() {
        let mut board = SimBoard::new();
        board.delay_ms(500);
        board.hold(Key::VolumeDown, 100);
        board.press_keys(&[Key::VolumeUp]);

        poll_all(&mut board);
        board.delay_ms(30);
        assert_eq!(board.pending_presses(), 1);
        assert!(read(&mut board, Key::VolumeDown));

        board.delay_ms(100);
        assert!(!read(&mut board, Key::VolumeDown));
        poll_all(&mut board);
        board.delay_ms(30);
        assert_eq!(board.pending_presses(), 0);
    }

    #[test]
    fn record_follows_the_configured_command_partition() {
        let mut map = PartitionMap::default();
        map.command = heapless::String::try_from("BCB").unwrap();
        let mut board = SimBoard::with_layout(&map);
        let cmd = BootCommand {
            boot_partition: 1,
            ..Default::default()
        };
        board.set_record(&cmd);
        assert_eq!(board.record(), Some(cmd));
        assert_eq!(&board.partition("BCB").unwrap()[..RECORD_LEN], &cmd.encode()[..]);
        assert!(board.partition("MSC").is_none());
    }

    #[test]
    fn power_reads_high_when_held() {
        let mut board = SimBoard::new();
        let pin = board.keys.power;
        assert!(!board.level(pin.row, pin.column));
        board.hold_at_boot(Key::Power, 50);
        assert!(board.level(pin.row, pin.column));
        board.delay_ms(60);
        assert!(!board.level(pin.row, pin.column));
    }

    #[test]
    fn second_open_of_same_partition_is_busy() {
        let mut board = SimBoard::with_layout(&PartitionMap::default());
        let h = board.open("MSC", OpenMode::Read).unwrap();
        assert_eq!(board.open("MSC", OpenMode::Read), Err(StorageError::Busy));
        board.close(h);
        assert_eq!(board.open_handles(), 0);
    }

    #[test]
    fn write_through_read_handle_is_rejected() {
        let mut board = SimBoard::with_layout(&PartitionMap::default());
        let h = board.open("MSC", OpenMode::Read).unwrap();
        assert_eq!(board.write(h, &[1, 2, 3]), Err(StorageError::IoError));
        board.close(h);
    }

    #[test]
    fn format_zeroes_and_records() {
        let mut board = SimBoard::with_layout(&PartitionMap::default());
        board.format("CAC").unwrap();
        assert!(board.partition("CAC").unwrap().iter().all(|&b| b == 0));
        assert_eq!(board.formatted(), ["CAC"]);
        assert_eq!(board.format("XYZ"), Err(StorageError::NotFound));
    }

    #[test]
    fn colour_codes_fit_and_differ() {
        let board = SimBoard::new();
        let white = board.text_color_code(Rgb::new(0xFF, 0xFF, 0xFF));
        let navy = board.background_color_code(Rgb::new(0, 0, 0x80));
        assert_eq!(white.as_str(), "^F7");
        assert_eq!(navy.as_str(), "^B1");
    }
}
