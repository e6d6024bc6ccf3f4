// Minigame session: host interfaces, the play state machine and the modal dialogs
// The host passes in a Surface and an InputSource; nothing here touches the terminal directly

use rand::Rng;
use std::io;
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::xtm_color::Tint;
use crate::xtm_game::{Difficulty, LevelParams, MIN_SIDE, Minefield, Point, Reveal, mine_range};
use crate::xtm_lang::Assets;
use crate::xtm_render::{Glyphs, draw_detonation, draw_level};

/// Score for quitting, losing or leaving a level unfinished
pub const SCORE_INCOMPLETE: u32 = 5;
/// Score for clearing a level
pub const SCORE_WIN: u32 = 30;

// Longest number accepted by the numeric prompt
const PROMPT_DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Named actions the input source maps physical keys to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move(Direction),
    New,
    Flag,
    Confirm,
    Quit,
    Help,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Move(Direction::Up),
        Action::Move(Direction::Down),
        Action::Move(Direction::Left),
        Action::Move(Direction::Right),
        Action::New,
        Action::Flag,
        Action::Confirm,
        Action::Quit,
        Action::Help,
    ];
}

/// One input event. Characters and Backspace that are not bound to an
/// action still arrive so the numeric prompt can edit its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Action(Action),
    Char(char),
    Backspace,
}

/// Modal overlay drawn above the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Menu { title: String, entries: Vec<String>, selected: usize },
    Prompt { title: String, description: String, text: String },
    Message { title: Option<String>, lines: Vec<String> },
}

/// Character-grid renderer owned by the host
pub trait Surface {
    /// Usable columns and rows
    fn size(&self) -> (u16, u16);
    fn clear(&mut self);
    /// Draw `glyph` at a cell; positions outside the surface are ignored
    fn put(&mut self, x: u16, y: u16, glyph: &str, tint: Tint, highlight: bool);
    /// Set or remove the modal overlay
    fn show(&mut self, dialog: Option<Dialog>);
    /// Set or remove the status line shown below the board
    fn status(&mut self, text: Option<String>);
    /// Push everything drawn so far to the screen
    fn present(&mut self) -> io::Result<()>;
}

/// Blocking source of input events owned by the host
pub trait InputSource {
    fn next_event(&mut self) -> io::Result<InputEvent>;
    /// Key names bound to each action, for the help box
    fn bindings(&self) -> Vec<(Action, String)>;
}

/// Strings and symbols the session draws with
#[derive(Debug, Clone)]
pub struct Theme {
    pub assets: Assets,
    pub glyphs: Glyphs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NewLevel,
    Playing,
    Won,
    Lost,
    Quit,
}

/// State of one level being played
#[derive(Debug, Clone)]
pub struct Session {
    field: Minefield,
    cursor: Point,
    phase: Phase,
    flagged_mines: Vec<Point>,
}

impl Session {
    /// Start playing `field` with the cursor in the top-left corner
    pub fn start(field: Minefield) -> Self {
        let phase = if field.check_win() { Phase::Won } else { Phase::Playing };
        Session {
            field,
            cursor: (0, 0),
            phase,
            flagged_mines: Vec::new(),
        }
    }

    pub fn field(&self) -> &Minefield {
        &self.field
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Mines that carried a flag when the level was lost
    pub fn flagged_mines(&self) -> &[Point] {
        &self.flagged_mines
    }

    /// Apply one player action. Only `Playing` reacts; every other phase is final
    /// for this level. Help is left to the caller since it needs I/O.
    pub fn apply(&mut self, action: Action) -> Phase {
        if self.phase != Phase::Playing {
            return self.phase;
        }
        match action {
            Action::Move(dir) => {
                if let Some(p) = self.field.step(self.cursor, dir.delta()) {
                    self.cursor = p;
                }
            }
            Action::Flag => {
                self.field.toggle_flag(self.cursor);
            }
            Action::Confirm => match self.field.reveal_state(self.cursor) {
                Reveal::Revealed => {}
                // a flag does not protect a mine
                _ if self.field.is_mine(self.cursor) => {
                    self.flagged_mines = self.field.reveal_mines();
                    self.phase = Phase::Lost;
                }
                Reveal::Hidden => {
                    self.field.reveal(self.cursor);
                }
                Reveal::Flagged => {}
            },
            Action::New => self.phase = Phase::NewLevel,
            Action::Quit => self.phase = Phase::Quit,
            Action::Help => {}
        }
        if self.phase == Phase::Playing && self.field.check_win() {
            self.phase = Phase::Won;
        }
        self.phase
    }
}

/// Run a full minigame session and return the score.
///
/// Asks for a difficulty, plays levels until the player quits, wins or loses,
/// and announces wins and losses in a message box.
pub fn run_session<S, I, R>(surface: &mut S, input: &mut I, rng: &mut R, theme: &Theme) -> io::Result<u32>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
    R: Rng + ?Sized,
{
    let assets = &theme.assets;
    let mut score = SCORE_INCOMPLETE;

    'levels: loop {
        let params = choose_level(surface, input, assets)?;
        let mut session = Session::start(Minefield::generate(params, rng));

        loop {
            draw_level(surface, session.field(), Some(session.cursor()), &theme.glyphs);
            surface.status(Some(assets.mines_line(session.field().remaining_mines())));
            match session.phase() {
                Phase::Playing => {}
                Phase::NewLevel => continue 'levels,
                Phase::Won => {
                    message_box(surface, input, None, vec![assets.win_message.to_string()])?;
                    score = SCORE_WIN;
                    info!(score, "level cleared");
                    break 'levels;
                }
                Phase::Lost => {
                    draw_detonation(surface, session.field(), session.flagged_mines(), &theme.glyphs);
                    message_box(surface, input, None, vec![assets.loss_message.to_string()])?;
                    info!(score, "mine hit");
                    break 'levels;
                }
                Phase::Quit => {
                    info!(score, "player quit");
                    break 'levels;
                }
            }

            surface.present()?;
            match input.next_event()? {
                InputEvent::Action(Action::Help) => help_box(surface, input, assets)?,
                InputEvent::Action(action) => {
                    session.apply(action);
                }
                InputEvent::Char(_) | InputEvent::Backspace => {}
            }
        }
    }

    Ok(score)
}

/// Difficulty menu followed by the custom prompts when needed
pub fn choose_level<S, I>(surface: &mut S, input: &mut I, assets: &Assets) -> io::Result<LevelParams>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
{
    surface.clear();
    surface.status(None);
    let entries: Vec<String> = Difficulty::ALL
        .iter()
        .map(|d| format!("{}) {}", d.hotkey(), assets.diff_name(*d)))
        .collect();
    let count = entries.len();
    let mut selected = 0usize;

    // the menu cannot be cancelled
    let choice = loop {
        surface.show(Some(Dialog::Menu {
            title: assets.diff_title.to_string(),
            entries: entries.clone(),
            selected,
        }));
        surface.present()?;
        match input.next_event()? {
            InputEvent::Action(Action::Move(Direction::Up)) => selected = (selected + count - 1) % count,
            InputEvent::Action(Action::Move(Direction::Down)) => selected = (selected + 1) % count,
            InputEvent::Action(Action::Confirm) => break Difficulty::ALL[selected],
            InputEvent::Char(c) => {
                let c = c.to_ascii_lowercase();
                if let Some(d) = Difficulty::ALL.iter().find(|d| d.hotkey() == c) {
                    break *d;
                }
            }
            _ => {}
        }
    };
    surface.show(None);

    let params = match choice.preset() {
        Some(p) => p,
        None => custom_level(surface, input, assets)?,
    };
    surface.show(None);
    Ok(params)
}

/// Ask for width, height and mine count, each bounded by the surface and the board area
fn custom_level<S, I>(surface: &mut S, input: &mut I, assets: &Assets) -> io::Result<LevelParams>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
{
    let (cols, rows) = surface.size();
    // leave room for the frame; a tiny surface still gets the 8x8 minimum
    let max_w = usize::from(cols).saturating_sub(2).max(MIN_SIDE);
    let max_h = usize::from(rows).saturating_sub(2).max(MIN_SIDE);

    let width = prompt_bounded(surface, input, assets, assets.prompt_width, MIN_SIDE, MIN_SIDE, max_w)?;
    let height = prompt_bounded(surface, input, assets, assets.prompt_height, MIN_SIDE, MIN_SIDE, max_h)?;
    let range = mine_range(width * height);
    let mines = prompt_bounded(surface, input, assets, assets.prompt_mines, *range.start(), *range.start(), *range.end())?;

    Ok(LevelParams::new(width, height, mines))
}

/// Keep asking until the answer lies in `min..=max`.
/// Out-of-range or unreadable answers restart from `min`; cancelling keeps the current value.
pub fn prompt_bounded<S, I>(
    surface: &mut S,
    input: &mut I,
    assets: &Assets,
    title: &str,
    initial: usize,
    min: usize,
    max: usize,
) -> io::Result<usize>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
{
    let description = assets.bounds_line(min, max);
    let mut value = initial;
    loop {
        if !(min..=max).contains(&value) {
            value = min;
        }
        let Some(text) = edit_number(surface, input, title, &description, value)? else {
            return Ok(value);
        };
        match text.trim().parse::<usize>() {
            Ok(v) if (min..=max).contains(&v) => return Ok(v),
            Ok(v) => {
                debug!(value = v, min, max, "number out of range, asking again");
                value = v;
            }
            Err(_) => {
                debug!(text = %text, "not a number, asking again");
                value = min;
            }
        }
    }
}

// Numeric text entry. None when cancelled.
fn edit_number<S, I>(surface: &mut S, input: &mut I, title: &str, description: &str, value: usize) -> io::Result<Option<String>>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
{
    let mut text = value.to_string();
    let entered = loop {
        surface.show(Some(Dialog::Prompt {
            title: title.to_string(),
            description: description.to_string(),
            text: text.clone(),
        }));
        surface.present()?;
        match input.next_event()? {
            InputEvent::Char(c) if c.is_ascii_digit() => {
                if text.len() < PROMPT_DIGITS {
                    text.push(c);
                }
            }
            InputEvent::Backspace => {
                text.pop();
            }
            InputEvent::Action(Action::Confirm) => break Some(text),
            InputEvent::Action(Action::Quit) => break None,
            _ => {}
        }
    };
    surface.show(None);
    Ok(entered)
}

/// Show `lines` and wait for any input
pub fn message_box<S, I>(surface: &mut S, input: &mut I, title: Option<&str>, lines: Vec<String>) -> io::Result<()>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
{
    surface.show(Some(Dialog::Message {
        title: title.map(str::to_string),
        lines,
    }));
    surface.present()?;
    input.next_event()?;
    surface.show(None);
    Ok(())
}

/// Key bindings box
fn help_box<S, I>(surface: &mut S, input: &mut I, assets: &Assets) -> io::Result<()>
where
    S: Surface + ?Sized,
    I: InputSource + ?Sized,
{
    let bindings = input.bindings();
    let names: Vec<&str> = bindings.iter().map(|(a, _)| assets.action_name(*a)).collect();
    let col = names.iter().map(|n| n.width()).max().unwrap_or(0);
    let mut lines: Vec<String> = names
        .iter()
        .zip(&bindings)
        .map(|(name, (_, keys))| format!("{}{}  {}", name, " ".repeat(col - name.width()), keys))
        .collect();
    lines.push(String::new());
    lines.push(assets.press_any_key.to_string());
    message_box(surface, input, Some(assets.help_title), lines)
}
