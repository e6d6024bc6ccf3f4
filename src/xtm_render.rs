// Turns minefield state into glyphs on a Surface
// Pure translation: reads the field, never changes it

use crate::xtm_color::Tint;
use crate::xtm_game::{Cell, Minefield, Point, Reveal};
use crate::xtm_session::Surface;

/// Number colors for revealed cells, indexed by adjacent mine count
pub const NUMBER_TINTS: [Tint; 9] = [
    Tint::White,
    Tint::LightGray,
    Tint::Cyan,
    Tint::Blue,
    Tint::LightBlue,
    Tint::Green,
    Tint::Magenta,
    Tint::Red,
    Tint::Yellow,
];

pub const BORDER_TINT: Tint = Tint::LightGray;

const DIGITS: [&str; 9] = [" ", "1", "2", "3", "4", "5", "6", "7", "8"];

/// Symbol set for cells and the board frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub hidden: &'static str,
    pub flag: &'static str,
    pub mine: &'static str,
    // frame: corners (tl, tr, bl, br), horizontal, vertical
    pub corners: [&'static str; 4],
    pub horizontal: &'static str,
    pub vertical: &'static str,
}

impl Glyphs {
    pub fn ascii() -> Self {
        Glyphs {
            hidden: "#",
            flag: "!",
            mine: "*",
            corners: ["+", "+", "+", "+"],
            horizontal: "-",
            vertical: "|",
        }
    }

    pub fn unicode() -> Self {
        Glyphs {
            hidden: "■",
            flag: "⚑",
            mine: "☼",
            corners: ["┌", "┐", "└", "┘"],
            horizontal: "─",
            vertical: "│",
        }
    }

    pub fn for_config(ascii_icons: bool) -> Self {
        if ascii_icons { Glyphs::ascii() } else { Glyphs::unicode() }
    }
}

/// One drawn cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub symbol: &'static str,
    pub tint: Tint,
    pub highlight: bool,
}

/// Top-left surface position of the board: centered in the surface,
/// leaving one cell on every side for the frame
pub fn board_offset(surface: (u16, u16), width: usize, height: usize) -> (u16, u16) {
    let max_x = surface.0.saturating_sub(2);
    let max_y = surface.1.saturating_sub(2);
    let w = u16::try_from(width).unwrap_or(u16::MAX);
    let h = u16::try_from(height).unwrap_or(u16::MAX);
    (max_x.saturating_sub(w) / 2 + 1, max_y.saturating_sub(h) / 2 + 1)
}

/// Glyph for cell `p`; the cursor cell is highlighted
pub fn glyph_for(field: &Minefield, p: Point, cursor: Option<Point>, glyphs: &Glyphs) -> Glyph {
    let (symbol, tint, mut highlight) = match (field.reveal_state(p), field.cell(p)) {
        (Reveal::Hidden, _) => (glyphs.hidden, Tint::White, false),
        (Reveal::Flagged, _) => (glyphs.flag, Tint::Yellow, false),
        (Reveal::Revealed, Cell::Mine) => (glyphs.mine, Tint::Red, true),
        (Reveal::Revealed, Cell::Clear(0)) => (DIGITS[0], Tint::Black, false),
        (Reveal::Revealed, Cell::Clear(n)) => {
            let n = usize::from(n).min(8);
            (DIGITS[n], NUMBER_TINTS[n], false)
        }
    };
    if cursor == Some(p) {
        highlight = true;
    }
    Glyph { symbol, tint, highlight }
}

fn put_at<S: Surface + ?Sized>(surface: &mut S, x: usize, y: usize, symbol: &str, tint: Tint, highlight: bool) {
    if let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) {
        surface.put(x, y, symbol, tint, highlight);
    }
}

/// Clear the surface and draw the framed board
pub fn draw_level<S: Surface + ?Sized>(surface: &mut S, field: &Minefield, cursor: Option<Point>, glyphs: &Glyphs) {
    surface.clear();
    let (ox, oy) = board_offset(surface.size(), field.width(), field.height());
    let (ox, oy) = (usize::from(ox), usize::from(oy));
    let (w, h) = (field.width(), field.height());

    // frame sits one cell outside the board
    let (left, top, right, bottom) = (ox - 1, oy - 1, ox + w, oy + h);
    put_at(surface, left, top, glyphs.corners[0], BORDER_TINT, false);
    put_at(surface, right, top, glyphs.corners[1], BORDER_TINT, false);
    put_at(surface, left, bottom, glyphs.corners[2], BORDER_TINT, false);
    put_at(surface, right, bottom, glyphs.corners[3], BORDER_TINT, false);
    for x in ox..right {
        put_at(surface, x, top, glyphs.horizontal, BORDER_TINT, false);
        put_at(surface, x, bottom, glyphs.horizontal, BORDER_TINT, false);
    }
    for y in oy..bottom {
        put_at(surface, left, y, glyphs.vertical, BORDER_TINT, false);
        put_at(surface, right, y, glyphs.vertical, BORDER_TINT, false);
    }

    for y in 0..h {
        for x in 0..w {
            let g = glyph_for(field, (x, y), cursor, glyphs);
            put_at(surface, ox + x, oy + y, g.symbol, g.tint, g.highlight);
        }
    }
}

/// Paint every mine in red after a loss; mines the player had flagged keep the flag symbol
pub fn draw_detonation<S: Surface + ?Sized>(surface: &mut S, field: &Minefield, flagged: &[Point], glyphs: &Glyphs) {
    let (ox, oy) = board_offset(surface.size(), field.width(), field.height());
    let (ox, oy) = (usize::from(ox), usize::from(oy));
    for y in 0..field.height() {
        for x in 0..field.width() {
            if !field.is_mine((x, y)) {
                continue;
            }
            let symbol = if flagged.contains(&(x, y)) { glyphs.flag } else { glyphs.mine };
            put_at(surface, ox + x, oy + y, symbol, Tint::Red, true);
        }
    }
}
