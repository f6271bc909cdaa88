//! Shared fixtures for integration tests.
//!
//! Wraps the library's `SimBoard` with a recording event sink and helpers
//! for reading the menu back out of the captured frames.

use bootmenu::adapters::sim::{Frame, SimBoard};
use bootmenu::app::events::BootEvent;
use bootmenu::app::ports::{BootArg, EventSink};
use bootmenu::command::{BootCommand, CommandTag};
use bootmenu::config::{BootMenuConfig, PartitionMap};
use bootmenu::menu::render::HINT;
use bootmenu::{BootMenuApp, Termination};

/// Colour prefix of the highlighted menu line on the simulation board
/// (white background, navy text).
pub const SELECTED_PREFIX: &str = "^B7^F1";

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<BootEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, event: &BootEvent) -> bool {
        self.events.contains(event)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BootEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub fn record(tag: &str, boot_partition: u32, debug_mode: u32) -> BootCommand {
    BootCommand {
        tag: CommandTag::new(tag),
        boot_partition,
        debug_mode,
    }
}

/// Standard partition layout with `cmd` stored in `MSC`.
pub fn board_with(cmd: &BootCommand) -> SimBoard {
    let mut board = SimBoard::with_layout(&PartitionMap::default());
    board.set_record(cmd);
    board
}

pub struct Outcome {
    pub termination: Termination,
    pub board: SimBoard,
    pub sink: RecordingSink,
}

/// Run one full boot cycle with the default configuration.
pub fn run_boot(board: SimBoard) -> Outcome {
    run_boot_with(board, BootArg(0))
}

pub fn run_boot_with(board: SimBoard, boot_arg: BootArg) -> Outcome {
    let mut app = BootMenuApp::new(board, RecordingSink::new(), BootMenuConfig::default(), boot_arg);
    let termination = app.run();
    let (board, sink) = app.into_parts();
    Outcome {
        termination,
        board,
        sink,
    }
}

// ── Frame inspection ──────────────────────────────────────────

/// Frames that show the full menu.
#[allow(dead_code)]
pub fn menu_frames(board: &SimBoard) -> Vec<&Frame> {
    board
        .frames()
        .iter()
        .filter(|f| f.text.contains(HINT))
        .collect()
}

/// Label of the highlighted item in a menu frame.
#[allow(dead_code)]
pub fn selected_label(frame: &Frame) -> Option<String> {
    frame
        .text
        .lines()
        .find_map(|line| line.strip_prefix(SELECTED_PREFIX))
        .map(|label| label.trim_end().to_owned())
}
