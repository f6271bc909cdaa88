//! Text-mode frames: the menu, the basic frame and the fatal screen.
//!
//! Lines are built in fixed-capacity `heapless` strings; colour escape
//! codes come from the display and take no columns on screen.

use core::fmt::Write;

use crate::app::ports::{COLOR_CODE_MAX, ColorCode, DisplayPort};
use crate::command::BootCommand;
use crate::config::{BootMenuConfig, Rgb};

use super::{MenuItem, MenuState, on_off};

/// Width of one text row in characters.
pub const TEXT_LINE_CHARS: usize = 80;

/// Item text is padded to this many columns before the newline.
pub const ITEM_COLUMNS: usize = TEXT_LINE_CHARS - 1;

/// A menu line: two colour codes, the padded label and a newline.
pub const MENU_LINE_CAP: usize = TEXT_LINE_CHARS + 2 * COLOR_CODE_MAX;

pub const TITLE_CAP: usize = 128;

pub const MENU_STATUS: &str = "Bootmenu Mode";
pub const HINT: &str = "Use volume keys to highlight, power to select.";
pub const FATAL_MESSAGE: &str =
    "Unrecoverable bootloader error, please reboot the device manually.";

pub type MenuLine = heapless::String<MENU_LINE_CAP>;

/// Window title: `"{id} {version}"`, cut at [`TITLE_CAP`] bytes.
pub fn title(id: &str, version: &str) -> heapless::String<TITLE_CAP> {
    let mut out = heapless::String::new();
    for c in id.chars().chain(core::iter::once(' ')).chain(version.chars()) {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Clear the screen and the status line.
pub fn basic_frame<D: DisplayPort + ?Sized>(display: &mut D) {
    display.clear();
    display.set_status("");
}

/// Clear the screen, set the menu status and print the centred hint.
pub fn menu_frame<D: DisplayPort + ?Sized>(display: &mut D) {
    display.clear();
    display.set_status(MENU_STATUS);

    let mut line = heapless::String::<TEXT_LINE_CHARS>::new();
    let pad = TEXT_LINE_CHARS.saturating_sub(HINT.len()) / 2;
    for _ in 0..pad {
        let _ = line.push(' ');
    }
    let _ = line.push_str(HINT);
    display.print(&line);
    display.print("\n\n\n");
}

/// Build one item line: `bg + fg + label`, padded or cut to
/// [`ITEM_COLUMNS`], then a newline.
pub fn format_menu_line(bg: &ColorCode, fg: &ColorCode, label: &str) -> MenuLine {
    let mut line = MenuLine::new();
    let _ = line.push_str(bg);
    let _ = line.push_str(fg);
    let mut columns = 0;
    for c in label.chars().take(ITEM_COLUMNS) {
        let _ = line.push(c);
        columns += 1;
    }
    for _ in columns..ITEM_COLUMNS {
        let _ = line.push(' ');
    }
    let _ = line.push('\n');
    line
}

/// Draw the full menu and refresh.
pub fn draw_menu<D: DisplayPort + ?Sized>(
    display: &mut D,
    cfg: &BootMenuConfig,
    cmd: &BootCommand,
    menu: &MenuState,
) {
    menu_frame(display);

    let mut text = heapless::String::<TEXT_LINE_CHARS>::new();
    let _ = writeln!(text, "Current boot mode: {} kernel image", cmd.boot_slot().name());
    display.print(&text);

    text.clear();
    let _ = writeln!(text, "Debug mode: {}\n", on_off(cmd.debug_enabled()));
    display.print(&text);

    if let Some(label) = menu.last_boot_failure() {
        let mut banner = heapless::String::<{ TEXT_LINE_CHARS + COLOR_CODE_MAX }>::new();
        let _ = banner.push_str(&display.text_color_code(cfg.error_color));
        let _ = writeln!(banner, "ERROR: Invalid {} kernel image.\n", label);
        display.print(&banner);
    }

    display.print("\n");

    for item in MenuItem::ALL {
        let (bg, fg) = if item as usize == menu.selected() {
            (cfg.text_color, cfg.highlight_color)
        } else {
            (Rgb::BLACK, cfg.text_color)
        };
        let line = format_menu_line(
            &display.background_color_code(bg),
            &display.text_color_code(fg),
            &item.label(cmd),
        );
        display.print(&line);
    }

    display.refresh();
}

/// Draw the unrecoverable error screen and refresh.
pub fn draw_fatal<D: DisplayPort + ?Sized>(display: &mut D, cfg: &BootMenuConfig) {
    basic_frame(display);
    let code = display.text_color_code(cfg.error_color);
    display.print(&code);
    display.print(FATAL_MESSAGE);
    display.refresh();
}
