//! Boot decision engine.
//!
//! Runs once per boot, before anything is drawn:
//!
//! ```text
//!  load record ─▶ classify tag ─▶ key override ─▶ clear tag + save
//!                                                      │
//!        ┌──────────┬──────────────┬──────────┬────────┴──┐
//!        ▼          ▼              ▼          ▼           ▼
//!     Normal    Recovery     FactoryReset  Fastboot     Menu
//!        │          │              │          │           │
//!   [returned] [returned]     [reboot       return     MenuMachine
//!        └────┬─────┘          returned]
//!             ▼                    ▼
//!     menu + banner             Fatal
//! ```
//!
//! The tag is one-shot: it is cleared and written back on every boot,
//! whatever mode is chosen.

use log::info;

use crate::app::events::{BootEvent, ErasablePartition};
use crate::app::ports::{BootPlatform, EventSink};
use crate::command::BootMode;
use crate::dispatch::{self, BootTarget};
use crate::drivers::keys::Key;
use crate::error::FatalError;
use crate::fsm::Termination;
use crate::fsm::context::BootContext;
use crate::menu::MenuState;

/// What the caller does after the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Run the interactive menu.
    EnterMenu,
    /// Stop without showing the menu.
    Terminate(Termination),
}

/// Load the record, pick the boot mode and consume the one-shot tag.
pub fn resolve<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) -> BootMode {
    ctx.command = ctx.store.load(&mut ctx.board);
    ctx.requested_mode = BootMode::classify(&ctx.command.tag);

    ctx.boot_mode = if ctx.keys.is_active(&mut ctx.board, Key::VolumeUp) {
        BootMode::Menu
    } else if ctx.keys.is_active(&mut ctx.board, Key::VolumeDown) {
        BootMode::Recovery
    } else {
        ctx.requested_mode
    };

    ctx.command.tag.clear();
    ctx.persist_command();

    info!(
        "Decision: requested={:?} resolved={:?}",
        ctx.requested_mode, ctx.boot_mode
    );
    ctx.emit(BootEvent::ModeResolved {
        requested: ctx.requested_mode,
        resolved: ctx.boot_mode,
    });
    ctx.boot_mode
}

/// Act on the resolved mode.
pub fn dispatch<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) -> Decision {
    match ctx.boot_mode {
        BootMode::Normal => {
            let target = BootTarget::from_slot(ctx.command.boot_slot());
            boot_or_menu(ctx, target)
        }
        BootMode::Recovery => boot_or_menu(ctx, BootTarget::Recovery),
        BootMode::FactoryReset => {
            let fatal = factory_reset(ctx);
            terminate(ctx, Termination::Fatal(fatal))
        }
        BootMode::Fastboot => terminate(ctx, Termination::Fastboot),
        BootMode::Menu => {
            ctx.menu = MenuState::new();
            Decision::EnterMenu
        }
    }
}

/// [`resolve`] followed by [`dispatch`].
pub fn run<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) -> Decision {
    resolve(ctx);
    dispatch(ctx)
}

// ── Internal ──────────────────────────────────────────────────────

fn boot_or_menu<B: BootPlatform, S: EventSink>(
    ctx: &mut BootContext<B, S>,
    target: BootTarget,
) -> Decision {
    let failure = ctx.attempt_boot(target);
    ctx.menu = MenuState::after_failure(failure.target.label(&ctx.config.partitions));
    Decision::EnterMenu
}

fn factory_reset<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) -> FatalError {
    info!("Decision: factory reset");
    ctx.board.set_status("Factory reset");

    ctx.erase_partition(ErasablePartition::UserData);
    ctx.erase_partition(ErasablePartition::Cache);

    ctx.board.print("Done.\n");
    ctx.board.refresh();
    ctx.pause_ms(ctx.config.factory_reset_pause_ms);

    dispatch::reboot(&mut ctx.board)
}

fn terminate<B: BootPlatform, S: EventSink>(
    ctx: &mut BootContext<B, S>,
    termination: Termination,
) -> Decision {
    ctx.terminate(termination);
    Decision::Terminate(termination)
}
