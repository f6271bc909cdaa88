//! Shared mutable context threaded through the decision engine and every
//! menu state handler.
//!
//! `BootContext` owns the board, the event sink, the configuration and the
//! working copy of the persisted command.  It is built once per boot and
//! passed around by `&mut`; nothing in the boot menu lives in a global.

use log::{info, warn};

use crate::adapters::msc::MscStore;
use crate::app::events::{BootEvent, ErasablePartition};
use crate::app::ports::{BootArg, BootPlatform, EventSink};
use crate::command::{BootCommand, BootMode};
use crate::config::BootMenuConfig;
use crate::dispatch::{self, BootTarget};
use crate::drivers::keys::{KeyEvent, KeySampler};
use crate::error::BootFailure;
use crate::menu::MenuState;

use super::Termination;

pub struct BootContext<B, S> {
    // --- Ports ---
    pub board: B,
    pub sink: S,

    // --- Configuration ---
    pub config: BootMenuConfig,
    pub keys: KeySampler,
    pub store: MscStore,
    /// Passed through untouched to every booted image.
    pub boot_arg: BootArg,

    // --- Boot decision ---
    /// Working copy of the persisted record.
    pub command: BootCommand,
    /// Mode named by the persisted tag, before the key override.
    pub requested_mode: BootMode,
    /// Mode actually taken this boot.
    pub boot_mode: BootMode,

    // --- Menu ---
    pub menu: MenuState,
    /// Last event returned by the key sampler.
    pub last_key: KeyEvent,
    /// Set by a handler to stop the menu loop.
    pub termination: Option<Termination>,
}

impl<B: BootPlatform, S: EventSink> BootContext<B, S> {
    pub fn new(board: B, sink: S, config: BootMenuConfig, boot_arg: BootArg) -> Self {
        Self {
            keys: KeySampler::from_config(&config),
            store: MscStore::new(config.partitions.command.clone()),
            board,
            sink,
            config,
            boot_arg,
            command: BootCommand::default(),
            requested_mode: BootMode::Normal,
            boot_mode: BootMode::Normal,
            menu: MenuState::new(),
            last_key: KeyEvent::None,
            termination: None,
        }
    }

    pub fn emit(&mut self, event: BootEvent) {
        self.sink.emit(&event);
    }

    /// Write the working record back to storage (best effort).
    pub fn persist_command(&mut self) {
        self.store.save(&mut self.board, &self.command);
    }

    /// Print the progress line, refresh, then format one partition.
    /// A format failure is logged and reported, never fatal.
    pub fn erase_partition(&mut self, which: ErasablePartition) -> bool {
        let name = match which {
            ErasablePartition::UserData => self.config.partitions.user_data.clone(),
            ErasablePartition::Cache => self.config.partitions.cache.clone(),
        };

        let mut line = heapless::String::<32>::new();
        let _ = line.push_str("Erasing ");
        let _ = line.push_str(&name);
        let _ = line.push_str(" partition...\n\n");
        self.board.print(&line);
        self.board.refresh();

        let ok = match self.board.format(&name) {
            Ok(()) => {
                info!("Erased {}", name);
                true
            }
            Err(e) => {
                warn!("Erasing {} failed: {}", name, e);
                false
            }
        };
        self.emit(BootEvent::PartitionErased { partition: which, ok });
        ok
    }

    /// Try to boot `target`.  Only a failure comes back.
    pub fn attempt_boot(&mut self, target: BootTarget) -> BootFailure {
        self.emit(BootEvent::BootAttempt(target));
        let failure = match dispatch::attempt(
            &mut self.board,
            &self.config.partitions,
            target,
            self.boot_arg,
        ) {
            Ok(never) => match never {},
            Err(failure) => failure,
        };
        self.emit(BootEvent::BootFailed(failure));
        failure
    }

    /// Record why the boot menu stops.  The first termination wins.
    pub fn terminate(&mut self, termination: Termination) {
        if self.termination.is_none() {
            match termination {
                Termination::Fastboot => self.emit(BootEvent::Fastboot),
                Termination::Fatal(e) => self.emit(BootEvent::Fatal(e)),
            }
            self.termination = Some(termination);
        }
    }

    /// Pause for `ms` milliseconds.
    pub fn pause_ms(&mut self, ms: u32) {
        self.board.delay_ms(ms);
    }
}
