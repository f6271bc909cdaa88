//! Function-pointer finite state machine driving the boot menu.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │  StateTable                                        │
//! │  ┌───────────────┬──────────┬───────────────────┐  │
//! │  │ StateId       │ on_enter │ on_update         │  │
//! │  ├───────────────┼──────────┼───────────────────┤  │
//! │  │ Rendering     │ -        │ fn(ctx)->Option<> │  │
//! │  │ AwaitingInput │ -        │ fn(ctx)->Option<> │  │
//! │  │ Executing     │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Terminal      │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └───────────────┴──────────┴───────────────────┘  │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the machine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the machine updates the current pointer
//! and runs `on_enter` for the next state.  Handlers receive
//! `&mut BootContext`; a handler that needs to stop the menu records a
//! [`Termination`] there and [`MenuMachine::run`] returns it.

pub mod context;
pub mod states;

use context::BootContext;
use log::{debug, info};

use crate::app::events::BootEvent;
use crate::app::ports::{BootPlatform, EventSink};
use crate::error::FatalError;

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

/// Why the boot menu stopped without booting an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Hand control back to the resident fastboot handler.
    Fastboot,
    /// No safe way forward; the caller halts.
    Fatal(FatalError),
}

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Menu states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Rendering = 0,
    AwaitingInput = 1,
    Executing = 2,
    Terminal = 3,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`.  Out-of-range indices assert in
    /// debug builds and map to `Terminal` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Rendering,
            1 => Self::AwaitingInput,
            2 => Self::Executing,
            3 => Self::Terminal,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Terminal
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
pub type StateActionFn<B, S> = fn(&mut BootContext<B, S>);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<B, S> = fn(&mut BootContext<B, S>) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor<B, S> {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<B, S>>,
    pub on_update: StateUpdateFn<B, S>,
}

// ---------------------------------------------------------------------------
// Menu machine
// ---------------------------------------------------------------------------

pub struct MenuMachine<B, S> {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor<B, S>; StateId::COUNT],
    current: usize,
    tick_count: u64,
}

impl<B: BootPlatform, S: EventSink> MenuMachine<B, S> {
    pub fn new(table: [StateDescriptor<B, S>; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table rows out of StateId order"
        );
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
        }
    }

    /// A machine over the standard menu table, starting in `Rendering`.
    pub fn standard() -> Self {
        Self::new(states::build_state_table(), StateId::Rendering)
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut BootContext<B, S>) {
        info!("Menu starting in state: {}", self.table[self.current].name);
        ctx.emit(BootEvent::MenuEntered);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the machine by one step.
    pub fn tick(&mut self, ctx: &mut BootContext<B, S>) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if ctx.termination.is_some() {
            self.transition(StateId::Terminal, ctx);
        } else if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Start, then tick until a handler records a termination.
    pub fn run(&mut self, ctx: &mut BootContext<B, S>) -> Termination {
        self.start(ctx);
        loop {
            if let Some(termination) = ctx.termination {
                info!("Menu stopped after {} ticks: {:?}", self.tick_count, termination);
                return termination;
            }
            self.tick(ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut BootContext<B, S>) {
        let next_idx = next_id as usize;
        if next_idx == self.current {
            return;
        }

        debug!(
            "Menu transition: {} -> {}",
            self.table[self.current].name,
            self.table[next_idx].name
        );

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
