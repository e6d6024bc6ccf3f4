// Terminal Minesweeper minigame
// Level generation, flood reveal and the keyboard-driven play loop, with a ratatui host

pub mod xtm_color;  // Tint palette and terminal color matching
pub mod xtm_config; // User settings and key bindings
pub mod xtm_game;   // Minefield state and rules
pub mod xtm_lang;   // Multi-language string resources
pub mod xtm_render; // Minefield to glyph translation
pub mod xtm_session; // Play loop, dialogs and host interfaces
pub mod xtm_term;   // Ratatui surface and crossterm input

pub use xtm_game::{Difficulty, LevelParams, Minefield};
pub use xtm_session::{Action, InputEvent, InputSource, Surface, Theme, run_session};
pub use xtm_term::run_terminal;
