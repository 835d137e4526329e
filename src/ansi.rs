/// ANSI escape sequences written straight to the terminal.
use crate::state::ClockColor;
use std::fmt::Write;

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const CLEAR_LINE: &str = "\x1b[2K";
pub const RESET_COLOR: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

/// Append a cursor-position sequence for the 1-based `row`/`col`.
pub fn move_cursor(out: &mut String, row: u16, col: u16) {
    // Writing into a String cannot fail.
    let _ = write!(out, "\x1b[{row};{col}H");
}

/// SGR sequence selecting `color`.
pub fn color(color: ClockColor) -> &'static str {
    match color {
        ClockColor::Default => RESET_COLOR,
        ClockColor::Red => RED,
        ClockColor::Green => GREEN,
    }
}
