/// Lays out an `HH:MM` clock face as five glyphs and renders it to escape
/// sequences at a fixed terminal position.
use crate::ansi;
use crate::glyph::{Glyph, DIGIT_SPACING, DIGIT_WIDTH};
use crate::state::{ClockColor, TimeFormat};

const HOURS_PER_DAY: u32 = 24;
const MINUTES_PER_HOUR: u32 = 60;

/// Hour tens, hour ones, separator, minute tens, minute ones.
pub type ClockFace = [Glyph; 5];

/// Choose the glyphs for `hours`:`mins`.
///
/// `hours` is the value to show, already converted to 12-hour form when
/// `format` is `TwelveHour`. In that mode the leading zero is suppressed.
/// An out-of-range hour or minute blanks both glyphs of that field only.
pub fn clock_face(hours: u32, mins: u32, format: TimeFormat) -> ClockFace {
    let (hour_tens, hour_ones) = if hours < HOURS_PER_DAY {
        let tens = match format {
            TimeFormat::TwelveHour if hours < 10 => Glyph::Blank,
            _ => Glyph::digit(hours / 10),
        };
        (tens, Glyph::digit(hours % 10))
    } else {
        (Glyph::Blank, Glyph::Blank)
    };

    let (min_tens, min_ones) = if mins < MINUTES_PER_HOUR {
        (Glyph::digit(mins / 10), Glyph::digit(mins % 10))
    } else {
        (Glyph::Blank, Glyph::Blank)
    };

    [hour_tens, hour_ones, Glyph::Colon, min_tens, min_ones]
}

/// Plain-text form of a face, e.g. `"12:05"` or `" 9:30"`.
pub fn face_text(face: &ClockFace) -> String {
    face.iter().map(|g| g.symbol()).collect()
}

/// Append the escape sequences that draw `face` with its upper-left corner
/// at (`row`, `col`).
pub fn render_face(out: &mut String, row: u16, col: u16, face: &ClockFace) {
    let stride = DIGIT_WIDTH + DIGIT_SPACING;
    for (slot, glyph) in (0u16..).zip(face.iter()) {
        let glyph_col = col.saturating_add(slot.saturating_mul(stride));
        for (line_no, line) in (0u16..).zip(glyph.bitmap().iter()) {
            ansi::move_cursor(out, row.saturating_add(line_no), glyph_col);
            out.push_str(line);
        }
    }
}

/// Full frame for one clock-loop iteration: color selection followed by
/// the face.
pub fn render_clock(row: u16, col: u16, face: &ClockFace, color: ClockColor) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(ansi::color(color));
    render_face(&mut out, row, col, face);
    out
}
