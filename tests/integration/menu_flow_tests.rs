//! Integration tests for the interactive menu driven by scripted keys.
//!
//! Every run enters the menu through the `bootmenu` tag and ends by
//! selecting "Fastboot Mode" or "Reboot".

use bootmenu::Termination;
use bootmenu::app::events::{BootEvent, Setting};
use bootmenu::drivers::keys::Key;
use bootmenu::error::FatalError;
use bootmenu::menu::MenuItem;

use super::mock_board::{board_with, menu_frames, record, run_boot, selected_label};

use Key::{Power, VolumeDown as Down, VolumeUp as Up};

fn run_menu(keys: &[Key]) -> super::mock_board::Outcome {
    let mut board = board_with(&record("bootmenu", 0, 0));
    board.press_keys(keys);
    run_boot(board)
}

// ── Navigation ────────────────────────────────────────────────

#[test]
fn cursor_starts_at_reboot_and_wraps_upwards() {
    let out = run_menu(&[Up, Down, Down, Power]);

    let frames = menu_frames(&out.board);
    let labels: Vec<_> = frames.iter().filter_map(|f| selected_label(f)).collect();
    assert_eq!(
        labels,
        ["Reboot", "Wipe Cache", "Reboot", "Fastboot Mode"]
    );
    assert_eq!(out.termination, Termination::Fastboot);
}

#[test]
fn every_menu_frame_lists_eight_items() {
    let out = run_menu(&[Down, Power]);

    for frame in menu_frames(&out.board) {
        assert_eq!(frame.status, "Bootmenu Mode");
        let items = frame
            .text
            .lines()
            .filter(|l| l.starts_with("^B"))
            .count();
        assert_eq!(items, 8);
    }
}

// ── Actions ───────────────────────────────────────────────────

#[test]
fn reboot_item_is_fatal_when_reboot_returns() {
    let out = run_menu(&[Power]);

    assert_eq!(
        out.termination,
        Termination::Fatal(FatalError::RebootReturned)
    );
    assert_eq!(out.board.reboots(), 1);
    assert!(out.sink.contains(&BootEvent::ItemSelected(MenuItem::Reboot)));
    assert!(
        out.sink
            .contains(&BootEvent::Fatal(FatalError::RebootReturned))
    );
}

#[test]
fn wipe_cache_formats_only_cache_and_resets_selection() {
    // Up wraps to Wipe Cache; after the wipe the cursor is back on Reboot.
    let out = run_menu(&[Up, Power, Down, Power]);

    assert_eq!(out.board.formatted(), ["CAC"]);
    assert!(out.board.elapsed_ms() >= 2000);

    let wipe_done = out
        .board
        .frames()
        .iter()
        .position(|f| f.text.ends_with("Erasing CAC partition...\n\nDone.\n"))
        .expect("wipe frame");
    let next_menu = &out.board.frames()[wipe_done + 1];
    assert_eq!(selected_label(next_menu).as_deref(), Some("Reboot"));
    assert_eq!(out.termination, Termination::Fastboot);
}

#[test]
fn toggling_boot_image_twice_restores_record() {
    // Index 5 is "Set Boot ... Kernel Image": three Ups from Reboot.
    let out = run_menu(&[Up, Up, Up, Power, Up, Up, Up, Power, Down, Power]);

    let toggles: Vec<_> = out
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            BootEvent::SettingToggled {
                setting: Setting::BootImage,
                value,
            } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(toggles, [1, 0]);
    assert_eq!(out.board.record().unwrap(), record("", 0, 0));
}

#[test]
fn toggling_debug_mode_updates_status_and_label() {
    // Index 6: two Ups from Reboot.
    let out = run_menu(&[Up, Up, Power, Down, Power]);

    assert_eq!(out.board.record().unwrap().debug_mode, 1);
    let last_menu = *menu_frames(&out.board).last().unwrap();
    assert!(last_menu.text.contains("Debug mode: ON\n"));
    assert!(last_menu.text.contains("Set Debug Mode OFF"));
}

#[test]
fn failed_boot_from_menu_keeps_selection() {
    let mut board = board_with(&record("bootmenu", 0, 0));
    board.remove_image("AKB");
    // Down x3 -> Boot Secondary, Power, then Up x2 -> Fastboot Mode.
    board.press_keys(&[Down, Down, Down, Power, Up, Up, Power]);

    let out = run_boot(board);

    assert_eq!(out.board.loads(), ["AKB"]);
    let after_failure = menu_frames(&out.board)
        .into_iter()
        .find(|f| f.text.contains("ERROR: Invalid secondary (AKB) kernel image."))
        .expect("banner frame");
    assert_eq!(
        selected_label(after_failure).as_deref(),
        Some("Boot Secondary Kernel Image")
    );
    assert_eq!(out.termination, Termination::Fastboot);
}

#[test]
fn later_failure_replaces_banner() {
    let mut board = board_with(&record("", 0, 0));
    board.remove_image("LNX");
    board.remove_image("SOS");
    // Normal boot fails on LNX; then Boot Recovery (index 4) fails too.
    board.press_keys(&[Down, Down, Down, Down, Power, Up, Up, Up, Power]);

    let out = run_boot(board);

    assert_eq!(out.board.loads(), ["LNX", "SOS"]);
    let last_menu = *menu_frames(&out.board).last().unwrap();
    assert!(last_menu.text.contains("ERROR: Invalid recovery (SOS) kernel image."));
    assert!(!last_menu.text.contains("primary (LNX)"));
}

#[test]
fn menu_run_leaves_no_open_handles() {
    let out = run_menu(&[Up, Up, Power, Up, Power, Down, Power]);

    assert_eq!(out.board.open_handles(), 0);
    assert_eq!(out.board.formatted(), ["CAC"]);
}
