//! Fuzz target: persisted boot command record
//!
//! Feeds arbitrary bytes to the `MSC` partition and runs the decision
//! engine over them, verifying:
//! - No panics under arbitrary partition contents or lengths
//! - The one-shot tag is always empty in storage afterwards
//! - `boot_partition` and `debug_mode` survive the rewrite unchanged
//! - No partition handle is left open
//!
//! cargo fuzz run fuzz_command_record

#![no_main]

use libfuzzer_sys::fuzz_target;

use bootmenu::adapters::log_sink::LogEventSink;
use bootmenu::adapters::sim::SimBoard;
use bootmenu::app::ports::BootArg;
use bootmenu::command::{BootCommand, BootMode, RECORD_LEN};
use bootmenu::config::{BootMenuConfig, PartitionMap};
use bootmenu::decision;
use bootmenu::fsm::context::BootContext;

fuzz_target!(|data: &[u8]| {
    // Direct decode never panics and only accepts whole records.
    match BootCommand::decode(data) {
        Ok(cmd) => {
            assert_eq!(data.len(), RECORD_LEN);
            assert_eq!(&cmd.encode()[..], data);
            let _ = BootMode::classify(&cmd.tag);
        }
        Err(_) => assert_ne!(data.len(), RECORD_LEN),
    }

    // Through the store: whatever the partition holds, booting proceeds.
    let mut board = SimBoard::with_layout(&PartitionMap::default());
    board.set_partition("MSC", data.to_vec());
    let before = BootCommand::decode(data.get(..RECORD_LEN).unwrap_or(&[])).ok();

    let mut ctx = BootContext::new(board, LogEventSink::new(), BootMenuConfig::default(), BootArg(0));
    decision::resolve(&mut ctx);

    assert_eq!(ctx.board.open_handles(), 0);
    assert!(ctx.command.tag.is_empty());
    if let Some(stored) = ctx.board.record() {
        assert!(stored.tag.is_empty());
        if let Some(before) = before {
            assert_eq!(stored.boot_partition, before.boot_partition);
            assert_eq!(stored.debug_mode, before.debug_mode);
        }
    }
});
