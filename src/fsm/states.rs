//! Concrete menu state handlers and table builder.
//!
//! Each state is three plain `fn` pointers, monomorphised per board and
//! sink type.  No closures, no dynamic dispatch.
//!
//! ```text
//!  RENDERING ──▶ AWAITING_INPUT ──[vol up/down, none]──▶ RENDERING
//!      ▲               │
//!      │            [power]
//!      │               ▼
//!      └──────────  EXECUTING ──[fastboot, reboot returned]──▶ TERMINAL
//! ```

use log::{info, warn};

use super::context::BootContext;
use super::{StateDescriptor, StateId, Termination};
use crate::app::events::{BootEvent, ErasablePartition, Setting};
use crate::app::ports::{BootPlatform, EventSink};
use crate::dispatch::{self, BootTarget};
use crate::drivers::keys::KeyEvent;
use crate::menu::MenuItem;
use crate::menu::render;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.
pub fn build_state_table<B: BootPlatform, S: EventSink>() -> [StateDescriptor<B, S>; StateId::COUNT]
{
    [
        // Index 0 — Rendering
        StateDescriptor {
            id: StateId::Rendering,
            name: "Rendering",
            on_enter: None,
            on_update: rendering_update::<B, S>,
        },
        // Index 1 — AwaitingInput
        StateDescriptor {
            id: StateId::AwaitingInput,
            name: "AwaitingInput",
            on_enter: None,
            on_update: awaiting_input_update::<B, S>,
        },
        // Index 2 — Executing
        StateDescriptor {
            id: StateId::Executing,
            name: "Executing",
            on_enter: Some(executing_enter::<B, S>),
            on_update: executing_update::<B, S>,
        },
        // Index 3 — Terminal
        StateDescriptor {
            id: StateId::Terminal,
            name: "Terminal",
            on_enter: Some(terminal_enter::<B, S>),
            on_update: terminal_update::<B, S>,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  RENDERING state
// ═══════════════════════════════════════════════════════════════════════════

fn rendering_update<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) -> Option<StateId> {
    render::draw_menu(&mut ctx.board, &ctx.config, &ctx.command, &ctx.menu);
    Some(StateId::AwaitingInput)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_INPUT state — blocks on the key sampler
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_input_update<B: BootPlatform, S: EventSink>(
    ctx: &mut BootContext<B, S>,
) -> Option<StateId> {
    ctx.last_key = ctx.keys.wait_for_event(&mut ctx.board);
    match ctx.last_key {
        KeyEvent::VolumeDown => {
            ctx.menu.select_next();
            Some(StateId::Rendering)
        }
        KeyEvent::VolumeUp => {
            ctx.menu.select_previous();
            Some(StateId::Rendering)
        }
        KeyEvent::Power => Some(StateId::Executing),
        KeyEvent::None => Some(StateId::Rendering),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXECUTING state — runs the selected item, then redraws
// ═══════════════════════════════════════════════════════════════════════════

fn executing_enter<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) {
    let item = ctx.menu.selected_item();
    info!("MENU: {:?} selected", item);
    ctx.emit(BootEvent::ItemSelected(item));
}

fn executing_update<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) -> Option<StateId> {
    match ctx.menu.selected_item() {
        MenuItem::Reboot => {
            let fatal = dispatch::reboot(&mut ctx.board);
            ctx.terminate(Termination::Fatal(fatal));
        }
        MenuItem::FastbootMode => ctx.terminate(Termination::Fastboot),
        MenuItem::BootPrimary => boot_from_menu(ctx, BootTarget::Primary),
        MenuItem::BootSecondary => boot_from_menu(ctx, BootTarget::Secondary),
        MenuItem::BootRecovery => boot_from_menu(ctx, BootTarget::Recovery),
        MenuItem::ToggleBootImage => {
            ctx.command.toggle_boot_slot();
            let value = ctx.command.boot_partition;
            toggled(ctx, Setting::BootImage, value);
        }
        MenuItem::ToggleDebugMode => {
            ctx.command.toggle_debug_mode();
            let value = ctx.command.debug_mode;
            toggled(ctx, Setting::DebugMode, value);
        }
        MenuItem::WipeCache => wipe_cache(ctx),
    }
    Some(StateId::Rendering)
}

fn boot_from_menu<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>, target: BootTarget) {
    let failure = ctx.attempt_boot(target);
    warn!("MENU: {}, staying in menu", failure);
    let label = failure.target.label(&ctx.config.partitions);
    ctx.menu.set_failure(label);
}

fn toggled<B: BootPlatform, S: EventSink>(
    ctx: &mut BootContext<B, S>,
    setting: Setting,
    value: u32,
) {
    ctx.persist_command();
    ctx.menu.reset_selection();
    ctx.emit(BootEvent::SettingToggled { setting, value });
}

fn wipe_cache<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) {
    render::basic_frame(&mut ctx.board);
    ctx.board.set_status(render::MENU_STATUS);
    ctx.erase_partition(ErasablePartition::Cache);
    ctx.board.print("Done.\n");
    ctx.board.refresh();
    ctx.pause_ms(ctx.config.wipe_cache_pause_ms);
    ctx.menu.reset_selection();
}

// ═══════════════════════════════════════════════════════════════════════════
//  TERMINAL state — absorbing
// ═══════════════════════════════════════════════════════════════════════════

fn terminal_enter<B: BootPlatform, S: EventSink>(ctx: &mut BootContext<B, S>) {
    info!("MENU: leaving ({:?})", ctx.termination);
}

fn terminal_update<B: BootPlatform, S: EventSink>(_ctx: &mut BootContext<B, S>) -> Option<StateId> {
    None
}
