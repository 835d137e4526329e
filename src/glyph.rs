/// Block-character glyphs for the large clock face.
///
/// Each glyph is `DIGIT_WIDTH` columns by `DIGIT_HEIGHT` rows. Digits are
/// looked up by value; anything that cannot be drawn falls back to `Blank`.
pub const DIGIT_WIDTH: u16 = 9;
pub const DIGIT_HEIGHT: u16 = 10;
/// Columns of padding between adjacent glyphs.
pub const DIGIT_SPACING: u16 = 2;

type Bitmap = [&'static str; DIGIT_HEIGHT as usize];

const DIGITS: [Bitmap; 10] = [
    [
        " XXXXXXX ",
        "XXXXXXXXX",
        "XXX   XXX",
        "XXX   XXX",
        "XXX   XXX",
        "XXX   XXX",
        "XXX   XXX",
        "XXX   XXX",
        "XXXXXXXXX",
        " XXXXXXX ",
    ],
    [
        "   XXX   ",
        "  XXXX   ",
        "   XXX   ",
        "   XXX   ",
        "   XXX   ",
        "   XXX   ",
        "   XXX   ",
        "   XXX   ",
        " XXXXXXX ",
        "XXXXXXXXX",
    ],
    [
        " XXXXXX  ",
        "XXXXXXXX ",
        " XX  XXX ",
        "    XXX  ",
        "   XXX   ",
        "  XXX    ",
        " XXX     ",
        "XXX      ",
        "XXXXXXXXX",
        "XXXXXXXXX",
    ],
    [
        " XXXXXXX ",
        "XXXXXXXXX",
        "      XXX",
        "      XXX",
        "  XXXXXXX",
        "  XXXXXXX",
        "      XXX",
        "      XXX",
        "XXXXXXXXX",
        " XXXXXXX ",
    ],
    [
        "XXX      ",
        "XXX      ",
        "XXX  XXX ",
        "XXX  XXX ",
        "XXXXXXXXX",
        "XXXXXXXXX",
        "     XXX ",
        "     XXX ",
        "     XXX ",
        "     XXX ",
    ],
    [
        "XXXXXXXXX",
        "XXXXXXXXX",
        "XXX      ",
        "XXX      ",
        "XXXXXXXX ",
        "XXXXXXXXX",
        "      XXX",
        "      XXX",
        "XXXXXXXXX",
        "XXXXXXXX ",
    ],
    [
        " XXXXXXX ",
        "XXXXXXXXX",
        "XXX      ",
        "XXX      ",
        "XXXXXXX  ",
        "XXXXXXXX ",
        "XXX   XXX",
        "XXX   XXX",
        "XXXXXXXXX",
        " XXXXXXX ",
    ],
    [
        "XXXXXXXXX",
        "XXXXXXXXX",
        "      XXX",
        "     XXX ",
        "    XXX  ",
        "   XXX   ",
        "  XXX    ",
        " XXX     ",
        "XXX      ",
        "XXX      ",
    ],
    [
        " XXXXXXX ",
        "XXXXXXXXX",
        "XXX   XXX",
        "XXX   XXX",
        " XXXXXXX ",
        " XXXXXXX ",
        "XXX   XXX",
        "XXX   XXX",
        "XXXXXXXXX",
        " XXXXXXX ",
    ],
    [
        " XXXXXXX ",
        "XXXXXXXXX",
        "XXX   XXX",
        "XXX   XXX",
        " XXXXXXXX",
        "  XXXXXXX",
        "     XXX ",
        "    XXX  ",
        "   XXX   ",
        "  XXX    ",
    ],
];

const COLON: Bitmap = [
    "         ",
    "         ",
    "   XXX   ",
    "   XXX   ",
    "         ",
    "         ",
    "   XXX   ",
    "   XXX   ",
    "         ",
    "         ",
];

const BLANK: Bitmap = ["         "; DIGIT_HEIGHT as usize];

/// One cell of the clock face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Digit(u8),
    Colon,
    /// Suppressed leading zero, or the marker for an out-of-range field.
    Blank,
}

impl Glyph {
    /// Glyph for a single decimal digit; values above 9 are blank.
    pub fn digit(value: u32) -> Self {
        match u8::try_from(value) {
            Ok(d) if d < 10 => Glyph::Digit(d),
            _ => Glyph::Blank,
        }
    }

    pub fn bitmap(self) -> &'static Bitmap {
        match self {
            Glyph::Digit(d) => DIGITS.get(usize::from(d)).unwrap_or(&BLANK),
            Glyph::Colon => &COLON,
            Glyph::Blank => &BLANK,
        }
    }

    /// Plain-text stand-in for the glyph, used in logs and tests.
    pub fn symbol(self) -> char {
        match self {
            Glyph::Digit(d) if d < 10 => char::from(b'0' + d),
            Glyph::Colon => ':',
            _ => ' ',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bitmap_is_full_size() {
        let glyphs = (0..10)
            .map(Glyph::digit)
            .chain([Glyph::Colon, Glyph::Blank]);
        for glyph in glyphs {
            let bitmap = glyph.bitmap();
            assert_eq!(bitmap.len(), DIGIT_HEIGHT as usize);
            for line in bitmap {
                assert_eq!(line.len(), DIGIT_WIDTH as usize, "{glyph:?}");
            }
        }
    }

    #[test]
    fn test_digit_out_of_range_is_blank() {
        assert_eq!(Glyph::digit(10), Glyph::Blank);
        assert_eq!(Glyph::digit(u32::MAX), Glyph::Blank);
        assert_eq!(Glyph::Digit(42).bitmap(), &BLANK);
    }

    #[test]
    fn test_blank_has_no_marks() {
        assert!(Glyph::Blank.bitmap().iter().all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Glyph::digit(7).symbol(), '7');
        assert_eq!(Glyph::Colon.symbol(), ':');
        assert_eq!(Glyph::Blank.symbol(), ' ');
    }
}
