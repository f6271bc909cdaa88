//! Integration tests for the startup → decision engine → dispatch path.
//!
//! Every boot that falls into the menu is finished by selecting
//! "Fastboot Mode" (VolumeDown, Power) so the cycle returns.

use bootmenu::app::events::BootEvent;
use bootmenu::app::ports::{BootArg, LoadedImage};
use bootmenu::command::BootMode;
use bootmenu::dispatch::BootTarget;
use bootmenu::drivers::keys::Key;
use bootmenu::error::{BootFailure, BootFailureReason, FatalError, StorageError};
use bootmenu::Termination;

use super::mock_board::{board_with, menu_frames, record, run_boot, run_boot_with};

const TO_FASTBOOT: [Key; 2] = [Key::VolumeDown, Key::Power];

// ── Command tags ──────────────────────────────────────────────

#[test]
fn recovery_tag_boots_recovery_then_falls_into_menu() {
    let mut board = board_with(&record("recovery", 0, 0));
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert_eq!(out.termination, Termination::Fastboot);
    assert_eq!(out.board.loads(), ["SOS"]);
    assert!(out.sink.contains(&BootEvent::ModeResolved {
        requested: BootMode::Recovery,
        resolved: BootMode::Recovery,
    }));
    let first_menu = menu_frames(&out.board)[0];
    assert!(first_menu.text.contains("ERROR: Invalid recovery (SOS) kernel image."));
    assert!(out.board.record().unwrap().tag.is_empty());
}

#[test]
fn fastboot_tag_returns_without_loading_anything() {
    let out = run_boot(board_with(&record("fastboot", 0, 0)));

    assert_eq!(out.termination, Termination::Fastboot);
    assert!(out.board.loads().is_empty());
    assert!(menu_frames(&out.board).is_empty());
    assert!(!out.sink.contains(&BootEvent::MenuEntered));
}

#[test]
fn bootmenu_tag_enters_menu_without_banner() {
    let mut board = board_with(&record("bootmenu", 0, 0));
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert!(out.board.loads().is_empty());
    assert!(out.sink.contains(&BootEvent::MenuEntered));
    assert!(!menu_frames(&out.board)[0].text.contains("ERROR"));
}

#[test]
fn factory_reset_erases_user_data_then_cache_and_is_fatal() {
    let out = run_boot(board_with(&record("factory-reset", 1, 1)));

    assert_eq!(
        out.termination,
        Termination::Fatal(FatalError::RebootReturned)
    );
    assert_eq!(out.board.formatted(), ["UDA", "CAC"]);
    assert_eq!(out.board.reboots(), 1);
    assert!(out.board.loads().is_empty());
    assert!(out.board.elapsed_ms() >= 5000);

    let last = out.board.last_frame().unwrap();
    assert_eq!(last.status, "Factory reset");
    assert_eq!(
        last.text,
        "Erasing UDA partition...\n\nErasing CAC partition...\n\nDone.\n"
    );

    // The persisted settings survive, only the tag is consumed.
    let stored = out.board.record().unwrap();
    assert!(stored.tag.is_empty());
    assert_eq!((stored.boot_partition, stored.debug_mode), (1, 1));
}

#[test]
fn factory_reset_continues_past_a_format_failure() {
    let mut board = board_with(&record("factory-reset", 0, 0));
    board.fail_format("UDA");

    let out = run_boot(board);

    assert_eq!(out.board.formatted(), ["CAC"]);
    assert!(out.sink.contains(&BootEvent::PartitionErased {
        partition: bootmenu::app::events::ErasablePartition::UserData,
        ok: false,
    }));
    assert_eq!(out.board.reboots(), 1);
}

// ── Key overrides ─────────────────────────────────────────────

#[test]
fn volume_up_with_secondary_slot_shows_menu() {
    let mut board = board_with(&record("", 1, 0));
    board.hold_at_boot(Key::VolumeUp, 200);
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert_eq!(out.termination, Termination::Fastboot);
    assert!(out.board.loads().is_empty());
    let first_menu = menu_frames(&out.board)[0];
    assert!(first_menu.text.contains("Current boot mode: Secondary kernel image\n"));
    assert!(first_menu.text.contains("Set Boot Primary Kernel Image"));
}

#[test]
fn volume_up_beats_volume_down() {
    let mut board = board_with(&record("", 0, 0));
    board.hold_at_boot(Key::VolumeUp, 200);
    board.hold_at_boot(Key::VolumeDown, 200);
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert!(out.sink.contains(&BootEvent::ModeResolved {
        requested: BootMode::Normal,
        resolved: BootMode::Menu,
    }));
    assert!(out.board.loads().is_empty());
}

#[test]
fn volume_down_overrides_fastboot_tag() {
    let mut board = board_with(&record("fastboot", 0, 0));
    board.hold_at_boot(Key::VolumeDown, 200);
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert_eq!(out.board.loads(), ["SOS"]);
    assert!(out.board.record().unwrap().tag.is_empty());
}

// ── Normal boot ───────────────────────────────────────────────

#[test]
fn empty_primary_image_shows_banner() {
    let mut board = board_with(&record("", 0, 0));
    board.set_image(
        "LNX",
        LoadedImage {
            entry_point: 0,
            non_empty: false,
        },
    );
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert!(out.board.boots().is_empty());
    assert!(out.sink.contains(&BootEvent::BootFailed(BootFailure {
        target: BootTarget::Primary,
        reason: BootFailureReason::EmptyImage,
    })));
    let banner = "^F6ERROR: Invalid primary (LNX) kernel image.\n\n";
    assert!(menu_frames(&out.board).iter().all(|f| f.text.contains(banner)));
}

#[test]
fn secondary_slot_boots_akb_with_boot_arg() {
    let mut board = board_with(&record("", 1, 0));
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot_with(board, BootArg(0xACE));

    assert_eq!(out.board.loads(), ["AKB"]);
    assert_eq!(out.board.boots().len(), 1);
    assert_eq!(out.board.boots()[0].1, BootArg(0xACE));
    assert_eq!(out.board.frames()[0].status, "Booting secondary kernel image");
}

#[test]
fn unreadable_record_still_boots() {
    let mut board = board_with(&record("recovery", 1, 0));
    board.fail_open("MSC", StorageError::Busy);
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    // The record could not be read, so the all-zero default applies.
    assert_eq!(out.board.loads(), ["LNX"]);
    assert_eq!(out.board.open_handles(), 0);
}

#[test]
fn short_record_still_boots() {
    let mut board = board_with(&record("", 0, 0));
    board.set_partition("MSC", vec![b'r'; 12]);
    board.press_keys(&TO_FASTBOOT);

    let out = run_boot(board);

    assert_eq!(out.board.loads(), ["LNX"]);
    assert_eq!(out.board.record().unwrap(), record("", 0, 0));
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_runs_before_decision() {
    let mut board = board_with(&record("fastboot", 0, 0));
    board.set_version("0.03.14-sim");

    let out = run_boot(board);

    assert!(out.board.is_initialized());
    assert_eq!(out.board.update_checks(), 1);
    assert_eq!(out.board.title(), "Skrilax_CZ's bootloader 0.03.14-sim");
    assert_eq!(out.sink.events.first(), Some(&BootEvent::Started));
}
