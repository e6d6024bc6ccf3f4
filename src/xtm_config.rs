// User settings: language, icons, logging, RNG seed and key bindings
// Read from a TOML file in the platform config directory. The minigame keeps
// no state of its own, so the file is only ever read.

use crossterm::event::KeyCode;
use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{Level, warn};

use crate::xtm_session::{Action, Direction};

/// Settings file contents. Every field is optional in the file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: String,          // "en" or "zh"
    pub ascii_icons: bool,         // Use plain ASCII symbols for the board
    pub seed: Option<u64>,         // Fixed seed for mine placement
    pub log_file: Option<PathBuf>, // Logging is off unless set
    pub log_level: String,         // error, warn, info, debug or trace
    pub keys: KeyBindings,
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let language = if system_lang.to_lowercase().starts_with("zh") { "zh" } else { "en" };

        Config {
            language: language.to_string(),
            ascii_icons: false,
            seed: None,
            log_file: None,
            log_level: "info".to_string(),
            keys: KeyBindings::default(),
        }
    }
}

impl Config {
    /// Parsed `log_level`; None when the name is not a tracing level
    pub fn max_level(&self) -> Option<Level> {
        self.log_level.trim().parse::<Level>().ok()
    }
}

/// Key names per action, e.g. `up = ["Up", "k"]`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KeyBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub new: Vec<String>,
    pub flag: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
    pub help: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            up: names(&["Up", "k"]),
            down: names(&["Down", "j"]),
            left: names(&["Left", "h"]),
            right: names(&["Right", "l"]),
            new: names(&["n"]),
            flag: names(&["f"]),
            confirm: names(&["Enter", "Space"]),
            quit: names(&["q", "Esc"]),
            help: names(&["?"]),
        }
    }
}

impl KeyBindings {
    pub fn names_for(&self, action: Action) -> &[String] {
        match action {
            Action::Move(Direction::Up) => &self.up,
            Action::Move(Direction::Down) => &self.down,
            Action::Move(Direction::Left) => &self.left,
            Action::Move(Direction::Right) => &self.right,
            Action::New => &self.new,
            Action::Flag => &self.flag,
            Action::Confirm => &self.confirm,
            Action::Quit => &self.quit,
            Action::Help => &self.help,
        }
    }

    /// Key codes for every action. Unknown names are skipped; digits stay
    /// free for typing numbers and are rejected as bindings.
    pub fn resolve(&self) -> Vec<(KeyCode, Action)> {
        let mut out = Vec::new();
        for action in Action::ALL {
            for name in self.names_for(action) {
                match parse_key(name) {
                    Some(KeyCode::Char(c)) if c.is_ascii_digit() => {
                        warn!(key = %name, ?action, "digit keys are reserved for number entry");
                    }
                    Some(code) => out.push((code, action)),
                    None => warn!(key = %name, ?action, "unknown key name in bindings"),
                }
            }
        }
        out
    }
}

/// Parse a key name from the config file. Single characters are literal
/// (case kept); longer names are matched case-insensitively.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(code)
}

/// Display name of a key for the help box
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{}", n),
        other => format!("{:?}", other),
    }
}

/// Get the configuration file path
/// Uses the platform config directory (e.g., ~/.config/xtmines/xtmines.toml on Linux)
/// and falls back to the current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    let name = env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| "xtmines".to_string());
    match ProjectDirs::from("com", "xhbl", &name) {
        Some(proj) => Some(proj.config_dir().join(format!("{}.toml", name))),
        None => env::current_dir().ok().map(|dir| dir.join(format!("{}.toml", name))),
    }
}

pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(text)
}

/// Load the settings file. A missing file gives the defaults; a broken one is
/// returned as an error so the caller can report it once logging is up.
pub fn load_config() -> Result<Config, toml::de::Error> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    match fs::read_to_string(&path) {
        Ok(text) => parse_config(&text),
        Err(_) => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse_config(
            r#"
            ascii_icons = true
            seed = 42

            [keys]
            flag = ["x", "F2"]
            "#,
        )
        .unwrap();
        assert!(cfg.ascii_icons);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.keys.flag, vec!["x".to_string(), "F2".to_string()]);
        assert_eq!(cfg.keys.up, KeyBindings::default().up);
    }

    #[test]
    fn log_level_names() {
        let mut cfg = parse_config("log_level = \"DEBUG\"").unwrap();
        assert_eq!(cfg.max_level(), Some(Level::DEBUG));
        cfg.log_level = "verbose".to_string();
        assert_eq!(cfg.max_level(), None);
        assert_eq!(Config::default().max_level(), Some(Level::INFO));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_config("seed = \"soon\"").is_err());
    }

    #[test]
    fn key_names_parse() {
        assert_eq!(parse_key("Up"), Some(KeyCode::Up));
        assert_eq!(parse_key("ESC"), Some(KeyCode::Esc));
        assert_eq!(parse_key("space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key("F12"), Some(KeyCode::F(12)));
        assert_eq!(parse_key("F"), Some(KeyCode::Char('F')));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key("Meta"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn resolve_skips_unknown_and_digit_keys() {
        let mut keys = KeyBindings::default();
        keys.new = names(&["n", "7", "Hyper"]);
        let resolved = keys.resolve();
        assert!(resolved.contains(&(KeyCode::Char('n'), Action::New)));
        assert!(!resolved.iter().any(|(k, _)| *k == KeyCode::Char('7')));
        assert!(resolved.contains(&(KeyCode::Enter, Action::Confirm)));
        assert!(resolved.contains(&(KeyCode::Char(' '), Action::Confirm)));
    }

    #[test]
    fn key_names_display() {
        assert_eq!(key_name(KeyCode::Char(' ')), "Space");
        assert_eq!(key_name(KeyCode::Char('q')), "q");
        assert_eq!(key_name(KeyCode::F(1)), "F1");
        assert_eq!(key_name(KeyCode::Esc), "Esc");
    }
}
