//! Application service — the boot menu entry point.
//!
//! [`BootMenuApp`] owns the boot context and runs the whole boot cycle:
//! startup, the decision engine and, when needed, the menu state machine.
//! All I/O flows through the board and sink handed to the constructor,
//! so the entire cycle runs against the simulation board in tests.
//!
//! ```text
//!  BootPlatform ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!                   │        BootMenuApp         │
//!                   │ decision · MenuMachine     │
//!                   └───────────────────────────┘
//! ```

use log::{error, info, warn};

use crate::config::{BootMenuConfig, validate_config};
use crate::decision::{self, Decision};
use crate::error::FatalError;
use crate::fsm::context::BootContext;
use crate::fsm::{MenuMachine, Termination};
use crate::menu::render;

use super::events::BootEvent;
use super::ports::{BootArg, BootPlatform, EventSink};

// ───────────────────────────────────────────────────────────────
// BootMenuApp
// ───────────────────────────────────────────────────────────────

pub struct BootMenuApp<B, S> {
    ctx: BootContext<B, S>,
}

impl<B: BootPlatform, S: EventSink> BootMenuApp<B, S> {
    /// Build the app.  An invalid configuration is replaced by defaults.
    pub fn new(board: B, sink: S, config: BootMenuConfig, boot_arg: BootArg) -> Self {
        let config = match validate_config(&config) {
            Ok(()) => config,
            Err(e) => {
                warn!("BootMenuApp: {}, using default configuration", e);
                BootMenuConfig::default()
            }
        };
        Self {
            ctx: BootContext::new(board, sink, config, boot_arg),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run one boot cycle.
    ///
    /// Returns only when no image was booted: either a fastboot hand-off
    /// or a fatal condition the caller must [`halt`](Self::halt) on.
    pub fn run(&mut self) -> Termination {
        self.startup();

        let termination = match decision::run(&mut self.ctx) {
            Decision::Terminate(t) => t,
            Decision::EnterMenu => MenuMachine::standard().run(&mut self.ctx),
        };
        info!("BootMenuApp: boot cycle ended with {:?}", termination);
        termination
    }

    /// Show the unrecoverable error screen and idle forever.
    pub fn halt(&mut self, fatal: FatalError) -> ! {
        error!("BootMenuApp: halting ({})", fatal);
        render::draw_fatal(&mut self.ctx.board, &self.ctx.config);
        let idle = self.ctx.config.fatal_idle_interval_ms;
        loop {
            self.ctx.board.delay_ms(idle);
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn context(&self) -> &BootContext<B, S> {
        &self.ctx
    }

    /// Take back the board and sink, e.g. to inspect them after a run.
    pub fn into_parts(self) -> (B, S) {
        (self.ctx.board, self.ctx.sink)
    }

    // ── Internal ──────────────────────────────────────────────

    fn startup(&mut self) {
        let board = &mut self.ctx.board;
        board.init();
        let title = render::title(&self.ctx.config.bootloader_id, board.bootloader_version());
        board.set_title(&title);
        board.check_bootloader_update();
        info!("BootMenuApp: started ({})", title);
        self.ctx.emit(BootEvent::Started);
    }
}

/// Boot menu entry point.
///
/// Returns only to hand control to fastboot; a fatal condition halts here.
pub fn bootmenu_main<B: BootPlatform, S: EventSink>(
    board: B,
    sink: S,
    config: BootMenuConfig,
    boot_arg: BootArg,
) {
    let mut app = BootMenuApp::new(board, sink, config, boot_arg);
    match app.run() {
        Termination::Fastboot => {}
        Termination::Fatal(e) => app.halt(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::log_sink::LogEventSink;
    use crate::adapters::sim::SimBoard;
    use crate::config::PartitionMap;

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let bad = BootMenuConfig {
            key_poll_interval_ms: 0,
            ..Default::default()
        };
        let app = BootMenuApp::new(SimBoard::new(), LogEventSink::new(), bad, BootArg(0));
        assert_eq!(app.context().config, BootMenuConfig::default());
    }

    #[test]
    fn startup_sets_title_and_checks_update_once() {
        let mut board = SimBoard::with_layout(&PartitionMap::default());
        board.set_version("0.03.14");
        board.set_record(&crate::command::BootCommand {
            tag: crate::command::CommandTag::new("fastboot"),
            ..Default::default()
        });
        let mut app = BootMenuApp::new(board, LogEventSink::new(), BootMenuConfig::default(), BootArg(0));
        assert_eq!(app.run(), Termination::Fastboot);
        let (board, _) = app.into_parts();
        assert!(board.is_initialized());
        assert_eq!(board.title(), "Skrilax_CZ's bootloader 0.03.14");
        assert_eq!(board.update_checks(), 1);
    }
}
