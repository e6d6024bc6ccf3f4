// Palette used by the minigame and its mapping to terminal colors
// The game only speaks in Tints; the terminal host turns them into ratatui colors

use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Host-neutral color names emitted by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Black,
    White,
    LightGray,
    Cyan,
    Blue,
    LightBlue,
    Green,
    LightGreen,
    Magenta,
    Red,
    Yellow,
}

/// How many colors the terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    TrueColor,
    Ansi256,
    Basic,
}

impl ColorDepth {
    /// Probe stdout once; callers keep the result instead of asking per cell.
    pub fn detect() -> ColorDepth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            ColorDepth::TrueColor
        } else if support.has_256 {
            ColorDepth::Ansi256
        } else {
            ColorDepth::Basic
        }
    }
}

impl Tint {
    // Windows Terminal "Campbell" samples: ((R, G, B), 256-color index)
    fn campbell(self) -> ((u8, u8, u8), u8) {
        match self {
            Tint::Black => ((12, 12, 12), 232),
            Tint::White => ((242, 242, 242), 255),
            Tint::LightGray => ((204, 204, 204), 250),
            Tint::Cyan => ((58, 150, 221), 38),
            Tint::Blue => ((0, 55, 218), 20),
            Tint::LightBlue => ((59, 120, 255), 63),
            Tint::Green => ((19, 161, 14), 28),
            Tint::LightGreen => ((22, 198, 12), 46),
            Tint::Magenta => ((136, 23, 152), 90),
            Tint::Red => ((197, 15, 31), 160),
            Tint::Yellow => ((193, 156, 0), 178),
        }
    }

    fn ansi(self) -> Color {
        match self {
            Tint::Black => Color::Black,
            Tint::White => Color::White,
            Tint::LightGray => Color::Gray,
            Tint::Cyan => Color::Cyan,
            Tint::Blue => Color::Blue,
            Tint::LightBlue => Color::LightBlue,
            Tint::Green => Color::Green,
            Tint::LightGreen => Color::LightGreen,
            Tint::Magenta => Color::Magenta,
            Tint::Red => Color::Red,
            Tint::Yellow => Color::Yellow,
        }
    }

    /// Terminal color for this tint, so the board looks the same across terminals
    pub fn to_color(self, depth: ColorDepth) -> Color {
        let ((r, g, b), index256) = self.campbell();
        match depth {
            ColorDepth::TrueColor => Color::Rgb(r, g, b),
            ColorDepth::Ansi256 => Color::Indexed(index256),
            ColorDepth::Basic => self.ansi(),
        }
    }
}
