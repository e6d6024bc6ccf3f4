// Terminal host for the minigame: ratatui surface, crossterm key input and the run entry point
// The game window is 80x24, centered in the terminal and clipped when the terminal is smaller

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{cursor, execute, terminal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::collections::HashMap;
use std::error::Error;
use std::io;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::xtm_color::{ColorDepth, Tint};
use crate::xtm_config::{Config, KeyBindings, key_name};
use crate::xtm_lang::Assets;
use crate::xtm_render::{BORDER_TINT, Glyphs};
use crate::xtm_session::{Action, Dialog, InputEvent, InputSource, Surface, Theme, run_session};

pub const WINDOW_COLS: u16 = 80;
pub const WINDOW_ROWS: u16 = 24;

type GridCell = (String, Tint, bool);

/// Surface backed by a ratatui terminal. Drawing goes to a shadow grid
/// that is flushed on `present`.
pub struct TermSurface<B: Backend> {
    terminal: Terminal<B>,
    depth: ColorDepth,
    title: &'static str,
    shortcuts: Vec<String>,
    status: Option<String>,
    cols: u16,
    rows: u16,
    grid: Vec<Option<GridCell>>,
    dialog: Option<Dialog>,
}

impl<B: Backend> TermSurface<B> {
    pub fn new(mut terminal: Terminal<B>, depth: ColorDepth, assets: &Assets) -> io::Result<Self> {
        let size = terminal.size()?;
        terminal.clear()?;
        // interior of the window, inside its border
        let cols = WINDOW_COLS.min(size.width).saturating_sub(2);
        let rows = WINDOW_ROWS.min(size.height).saturating_sub(2);
        Ok(TermSurface {
            terminal,
            depth,
            title: assets.title,
            shortcuts: assets.shortcuts.iter().map(|s| s.to_string()).collect(),
            status: None,
            cols,
            rows,
            grid: vec![None; usize::from(cols) * usize::from(rows)],
            dialog: None,
        })
    }

    /// Replace the default shortcut legend, e.g. with one built by `shortcut_legend`
    pub fn with_legend(mut self, shortcuts: Vec<String>) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn grid_lines(&self) -> Vec<Spans<'static>> {
        let cols = usize::from(self.cols);
        if cols == 0 {
            return Vec::new();
        }
        self.grid
            .chunks(cols)
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .iter()
                    .map(|cell| match cell {
                        Some((glyph, tint, highlight)) => Span::styled(glyph.clone(), cell_style(*tint, *highlight, self.depth)),
                        None => Span::raw(" "),
                    })
                    .collect();
                Spans::from(spans)
            })
            .collect()
    }
}

impl<B: Backend> Surface for TermSurface<B> {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn clear(&mut self) {
        self.grid.iter_mut().for_each(|c| *c = None);
    }

    fn put(&mut self, x: u16, y: u16, glyph: &str, tint: Tint, highlight: bool) {
        if x < self.cols && y < self.rows {
            let idx = usize::from(y) * usize::from(self.cols) + usize::from(x);
            self.grid[idx] = Some((glyph.to_string(), tint, highlight));
        }
    }

    fn show(&mut self, dialog: Option<Dialog>) {
        self.dialog = dialog;
    }

    fn status(&mut self, text: Option<String>) {
        self.status = text;
    }

    fn present(&mut self) -> io::Result<()> {
        let depth = self.depth;
        let lines = self.grid_lines();
        let (legend, legend_width) = legend_spans(&self.shortcuts, depth);
        let title = self.title;
        let dialog = self.dialog.clone();
        let status = self.status.clone();
        let window_w = self.cols + 2;
        let window_h = self.rows + 2;

        self.terminal.draw(|f| {
            let size = f.size();
            let window = center_rect(window_w.min(size.width), window_h.min(size.height), size);
            f.render_widget(Clear, window);

            let frame_style = Style::default().fg(BORDER_TINT.to_color(depth));
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(frame_style)
                .title(Span::styled(title, Style::default().fg(Tint::White.to_color(depth))));
            f.render_widget(Paragraph::new(Text::from(lines)).block(block), window);

            // shortcut legend sits on the top border, right-aligned
            let room = window.width.saturating_sub(2 + title.width() as u16 + 2);
            let lw = legend_width.min(room);
            if lw > 0 {
                let rect = Rect::new(window.x + window.width - 1 - lw, window.y, lw, 1);
                f.render_widget(Paragraph::new(Spans::from(legend)), rect);
            }

            // mine counter on the bottom border
            if let Some(text) = status {
                let sw = (text.width() as u16).min(window.width.saturating_sub(2));
                if sw > 0 && window.height > 1 {
                    let rect = Rect::new(window.x + 1, window.y + window.height - 1, sw, 1);
                    let style = Style::default().fg(Tint::Yellow.to_color(depth));
                    f.render_widget(Paragraph::new(Spans::from(Span::styled(text, style))), rect);
                }
            }

            if let Some(d) = &dialog {
                let (w, h, block, body) = dialog_widgets(d, depth);
                let area = center_rect(w.min(window.width), h.min(window.height), window);
                f.render_widget(Clear, area);
                f.render_widget(Paragraph::new(Text::from(body)).block(block), area);
            }
        })?;
        Ok(())
    }
}

fn cell_style(tint: Tint, highlight: bool, depth: ColorDepth) -> Style {
    if highlight {
        // blank black cells still need a visible cursor
        let bg = if tint == Tint::Black { Tint::White } else { tint };
        Style::default().fg(Tint::Black.to_color(depth)).bg(bg.to_color(depth))
    } else {
        Style::default().fg(tint.to_color(depth))
    }
}

// "<n>ew level" -> ("", "n", "ew level"); the key is at least one character
fn split_shortcut(s: &str) -> Option<(&str, &str, &str)> {
    let open = s.find('<')?;
    let rest = &s[open + 1..];
    let first = rest.chars().next()?.len_utf8();
    let close = first + rest[first..].find('>')?;
    Some((&s[..open], &rest[..close], &rest[close + 1..]))
}

/// Legend spans for "<n>ew level" style shortcuts with the key highlighted,
/// plus their total display width
fn legend_spans(shortcuts: &[String], depth: ColorDepth) -> (Vec<Span<'static>>, u16) {
    let key_style = Style::default().fg(Tint::LightGreen.to_color(depth));
    let text_style = Style::default().fg(Tint::White.to_color(depth));
    let mut spans = Vec::new();
    let mut width = 0usize;
    for (i, s) in shortcuts.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
            width += 1;
        }
        match split_shortcut(s) {
            Some((before, key, after)) => {
                spans.push(Span::styled(before.to_string(), text_style));
                spans.push(Span::styled("<", text_style));
                spans.push(Span::styled(key.to_string(), key_style));
                spans.push(Span::styled(">", text_style));
                spans.push(Span::styled(after.to_string(), text_style));
            }
            None => spans.push(Span::styled(s.clone(), text_style)),
        }
        width += s.width();
    }
    (spans, u16::try_from(width).unwrap_or(u16::MAX))
}

/// Legend entries for new level, flag and quit using the keys actually bound.
/// The localized "<n>ew level" form is kept while its letter is still the bound key.
pub fn shortcut_legend(assets: &Assets, input: &KeyInput) -> Vec<String> {
    [Action::New, Action::Flag, Action::Quit]
        .iter()
        .zip(assets.shortcuts.iter().zip(assets.shortcut_names.iter()))
        .filter_map(|(action, (template, name))| {
            let key = input.first_key(*action)?;
            match split_shortcut(template) {
                Some((_, letter, _)) if letter == key => Some(template.to_string()),
                _ => Some(format!("<{}> {}", key, name)),
            }
        })
        .collect()
}

// Size, frame and body of a dialog box
fn dialog_widgets(dialog: &Dialog, depth: ColorDepth) -> (u16, u16, Block<'static>, Vec<Spans<'static>>) {
    let frame = Style::default().fg(Tint::White.to_color(depth));
    let mut block = Block::default().borders(Borders::ALL).border_style(frame);
    let body: Vec<Spans<'static>> = match dialog {
        Dialog::Menu { title, entries, selected } => {
            block = block.title(title.clone()).title_alignment(Alignment::Center);
            let focus = Style::default().fg(Tint::Black.to_color(depth)).bg(Tint::LightBlue.to_color(depth));
            entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    let text = format!(" {} ", e);
                    if i == *selected { Spans::from(Span::styled(text, focus)) } else { Spans::from(Span::raw(text)) }
                })
                .collect()
        }
        Dialog::Prompt { title, description, text } => {
            block = block.title(title.clone());
            let input = Style::default().fg(Tint::Yellow.to_color(depth));
            vec![
                Spans::from(Span::raw(format!(" {}", description))),
                Spans::from(vec![Span::raw(" > "), Span::styled(format!("{}_", text), input)]),
            ]
        }
        Dialog::Message { title, lines } => {
            if let Some(t) = title {
                block = block.title(t.clone());
            }
            lines.iter().map(|l| Spans::from(Span::raw(format!(" {} ", l)))).collect()
        }
    };
    let title_width = match dialog {
        Dialog::Menu { title, .. } | Dialog::Prompt { title, .. } => title.width(),
        Dialog::Message { title, .. } => title.as_deref().map(|t| t.width()).unwrap_or(0),
    };
    let content_width = body.iter().map(|s| s.width()).max().unwrap_or(0).max(title_width + 2);
    let w = u16::try_from(content_width + 2).unwrap_or(u16::MAX);
    let h = u16::try_from(body.len() + 2).unwrap_or(u16::MAX);
    (w, h, block, body)
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Key presses mapped to actions through the configured bindings
pub struct KeyInput {
    bound: Vec<(KeyCode, Action)>,
    keymap: HashMap<KeyCode, Action>,
}

impl KeyInput {
    pub fn new(keys: &KeyBindings) -> Self {
        let bound = keys.resolve();
        let mut keymap = HashMap::new();
        // first binding of a key wins
        for (code, action) in &bound {
            keymap.entry(*code).or_insert(*action);
        }
        KeyInput { bound, keymap }
    }

    /// Display name of the first key that triggers `action`
    pub fn first_key(&self, action: Action) -> Option<String> {
        self.effective(action).next()
    }

    // Keys bound to `action` that are not shadowed by an earlier binding
    fn effective(&self, action: Action) -> impl Iterator<Item = String> + '_ {
        self.bound
            .iter()
            .filter(move |(code, a)| *a == action && self.keymap.get(code) == Some(&action))
            .map(|(code, _)| key_name(*code))
    }

    /// Translate one key event; None for events the game ignores
    pub fn map_key(&self, key: KeyEvent) -> Option<InputEvent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(InputEvent::Action(Action::Quit));
        }
        if let Some(action) = self.keymap.get(&key.code) {
            return Some(InputEvent::Action(*action));
        }
        match key.code {
            KeyCode::Char(c) => Some(InputEvent::Char(c)),
            KeyCode::Backspace => Some(InputEvent::Backspace),
            _ => None,
        }
    }
}

impl InputSource for KeyInput {
    fn next_event(&mut self) -> io::Result<InputEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(ev) = self.map_key(key) {
                    return Ok(ev);
                }
            }
        }
    }

    fn bindings(&self) -> Vec<(Action, String)> {
        Action::ALL
            .iter()
            .map(|action| (*action, self.effective(*action).collect::<Vec<_>>().join(", ")))
            .collect()
    }
}

// Terminal setup, session and surface live here so restoring can run whatever happens inside
fn play(theme: &Theme, input: &mut KeyInput, rng: &mut StdRng) -> io::Result<u32> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    let legend = shortcut_legend(&theme.assets, input);
    let mut surface = TermSurface::new(terminal, ColorDepth::detect(), &theme.assets)?.with_legend(legend);
    run_session(&mut surface, input, rng, theme)
}

/// Run one minigame session on the real terminal and return its score
pub fn run_terminal(cfg: &Config, assets: &Assets) -> Result<u32, Box<dyn Error>> {
    let theme = Theme {
        assets: assets.clone(),
        glyphs: Glyphs::for_config(cfg.ascii_icons),
    };
    let mut input = KeyInput::new(&cfg.keys);
    // a drawn seed is logged so any board can be replayed
    let seed = cfg.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    info!(seed, "starting session");

    enable_raw_mode()?;
    let outcome = match execute!(io::stdout(), terminal::EnterAlternateScreen) {
        Ok(()) => play(&theme, &mut input, &mut rng),
        Err(e) => Err(e),
    };

    let restored = disable_raw_mode().and_then(|_| execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show));
    let score = outcome?;
    restored?;
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xtm_lang::english_assets;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn surface(w: u16, h: u16) -> TermSurface<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        TermSurface::new(terminal, ColorDepth::TrueColor, &english_assets()).unwrap()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf.get(x, y).symbol.clone()).collect()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn window_is_clipped_to_terminal() {
        assert_eq!(surface(100, 30).size(), (78, 22));
        assert_eq!(surface(40, 10).size(), (38, 8));
    }

    #[test]
    fn grid_lands_inside_centered_window() {
        let mut s = surface(100, 30);
        s.put(0, 0, "#", Tint::Yellow, false);
        s.put(77, 21, "5", Tint::Green, true);
        s.put(78, 0, "x", Tint::Red, false);
        s.present().unwrap();

        // window at (10, 3), interior starts one cell in
        let buf = s.terminal().backend().buffer();
        let origin = buf.get(11, 4);
        assert_eq!(origin.symbol, "#");
        assert_eq!(origin.fg, Tint::Yellow.to_color(ColorDepth::TrueColor));
        let last = buf.get(88, 25);
        assert_eq!(last.symbol, "5");
        assert_eq!(last.bg, Tint::Green.to_color(ColorDepth::TrueColor));
        assert_eq!(buf.get(10, 3).symbol, "┌");
        assert!(!row_text(buf, 4).contains('x'));
    }

    #[test]
    fn title_and_legend_share_top_border() {
        let mut s = surface(80, 24);
        s.present().unwrap();
        let buf = s.terminal().backend().buffer();
        let top = row_text(buf, 0);
        assert!(top.contains("Minesweeper"));
        assert!(top.trim_end_matches('┐').ends_with("<n>ew level <f>lag <q>uit"));

        let q = top[..top.find("<q>").unwrap()].chars().count() + 1;
        assert_eq!(buf.get(q as u16, 0).fg, Tint::LightGreen.to_color(ColorDepth::TrueColor));
    }

    #[test]
    fn mine_counter_sits_on_bottom_border() {
        let mut s = surface(80, 24);
        s.status(Some(" Mines: -1 ".to_string()));
        s.present().unwrap();
        let buf = s.terminal().backend().buffer();
        let bottom = row_text(buf, 23);
        assert!(bottom.starts_with("└ Mines: -1 ─"));
        assert_eq!(buf.get(3, 23).fg, Tint::Yellow.to_color(ColorDepth::TrueColor));

        s.status(None);
        s.present().unwrap();
        assert!(!row_text(s.terminal().backend().buffer(), 23).contains("Mines"));
    }

    #[test]
    fn legend_follows_rebound_keys() {
        let assets = english_assets();
        let default = KeyInput::new(&KeyBindings::default());
        assert_eq!(shortcut_legend(&assets, &default), vec!["<n>ew level", "<f>lag", "<q>uit"]);

        let mut keys = KeyBindings::default();
        keys.flag = vec!["x".to_string()];
        keys.quit = vec!["Esc".to_string()];
        keys.new = Vec::new();
        let rebound = KeyInput::new(&keys);
        assert_eq!(shortcut_legend(&assets, &rebound), vec!["<x> flag", "<Esc> quit"]);

        let mut s = surface(80, 24).with_legend(shortcut_legend(&assets, &rebound));
        s.present().unwrap();
        let top = row_text(s.terminal().backend().buffer(), 0);
        assert!(top.trim_end_matches('┐').ends_with("<x> flag <Esc> quit"));
        assert!(!top.contains("<f>lag"));
    }

    #[test]
    fn shortcut_keys_may_be_symbols() {
        assert_eq!(split_shortcut("<n>ew level"), Some(("", "n", "ew level")));
        assert_eq!(split_shortcut("<>> quit"), Some(("", ">", " quit")));
        assert_eq!(split_shortcut("<Esc> quit"), Some(("", "Esc", " quit")));
        assert_eq!(split_shortcut("quit"), None);
    }

    #[test]
    fn dialog_is_drawn_over_the_board() {
        let mut s = surface(80, 24);
        s.put(10, 10, "#", Tint::White, false);
        s.show(Some(Dialog::Message {
            title: None,
            lines: vec!["Congratulations, you won!".to_string()],
        }));
        s.present().unwrap();
        let buf = s.terminal().backend().buffer();
        assert!((0..24).any(|y| row_text(buf, y).contains("Congratulations, you won!")));

        s.show(None);
        s.present().unwrap();
        let buf = s.terminal().backend().buffer();
        assert!(!(0..24).any(|y| row_text(buf, y).contains("Congratulations")));
    }

    #[test]
    fn prompt_shows_bounds_and_text() {
        let mut s = surface(80, 24);
        s.show(Some(Dialog::Prompt {
            title: "Level width:".to_string(),
            description: "Min: 8 Max: 78".to_string(),
            text: "12".to_string(),
        }));
        s.present().unwrap();
        let buf = s.terminal().backend().buffer();
        let rows: Vec<String> = (0..24).map(|y| row_text(buf, y)).collect();
        assert!(rows.iter().any(|r| r.contains("Level width:")));
        assert!(rows.iter().any(|r| r.contains("Min: 8 Max: 78")));
        assert!(rows.iter().any(|r| r.contains("> 12_")));
    }

    #[test]
    fn keys_map_through_bindings() {
        let input = KeyInput::new(&KeyBindings::default());
        assert_eq!(input.map_key(press(KeyCode::Char('k'))), Some(InputEvent::Action(Action::Move(crate::xtm_session::Direction::Up))));
        assert_eq!(input.map_key(press(KeyCode::Enter)), Some(InputEvent::Action(Action::Confirm)));
        assert_eq!(input.map_key(press(KeyCode::Esc)), Some(InputEvent::Action(Action::Quit)));
        assert_eq!(input.map_key(press(KeyCode::Char('7'))), Some(InputEvent::Char('7')));
        assert_eq!(input.map_key(press(KeyCode::Backspace)), Some(InputEvent::Backspace));
        assert_eq!(input.map_key(press(KeyCode::Home)), None);
        assert_eq!(
            input.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputEvent::Action(Action::Quit))
        );
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..press(KeyCode::Enter)
        };
        assert_eq!(input.map_key(release), None);
    }

    #[test]
    fn help_lists_effective_keys() {
        let mut keys = KeyBindings::default();
        keys.flag = vec!["f".to_string(), "Space".to_string()];
        let input = KeyInput::new(&keys);
        let bindings = input.bindings();
        let find = |a: Action| bindings.iter().find(|(b, _)| *b == a).map(|(_, k)| k.clone());
        // Space is taken by flag first since flag comes before confirm
        assert_eq!(find(Action::Flag).as_deref(), Some("f, Space"));
        assert_eq!(find(Action::Confirm).as_deref(), Some("Enter"));
        assert_eq!(find(Action::Quit).as_deref(), Some("q, Esc"));
    }
}
