// Entry point for the Minesweeper minigame
// Loads settings, sets up file logging when asked, runs one session and prints the score

use std::error::Error;
use std::fs::File;
use std::sync::Mutex;

use tracing::{Level, info, warn};
use xtmines::run_terminal;
use xtmines::xtm_config::{Config, load_config};
use xtmines::xtm_lang::Lang;

// Log lines would corrupt the alternate screen, so they only ever go to a file.
// An unusable log file turns logging off instead of stopping the game.
fn init_logging(cfg: &Config) -> bool {
    let Some(path) = &cfg.log_file else {
        return false;
    };
    let file = match File::create(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("xtmines: logging disabled, cannot create {}: {}", path.display(), e);
            return false;
        }
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cfg.max_level().unwrap_or(Level::INFO))
        .try_init()
        .is_ok()
}

fn main() -> Result<(), Box<dyn Error>> {
    let (cfg, problem) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(&cfg);
    if let Some(e) = problem {
        warn!(error = %e, "ignoring unreadable config");
    }
    if cfg.max_level().is_none() {
        warn!(log_level = %cfg.log_level, "unknown log level, using info");
    }

    // Initialize language resources based on configured or system language
    let lang = Lang::new(&cfg.language);
    info!(language = %lang.current_lang, "language selected");

    let score = run_terminal(&cfg, &lang.assets)?;
    println!("Score: {}", score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unwritable_log_file_disables_logging() {
        let cfg = Config {
            log_file: Some(PathBuf::from("/nonexistent-xtmines-dir/sub/xtmines.log")),
            ..Config::default()
        };
        assert!(!init_logging(&cfg));
    }

    #[test]
    fn no_log_file_means_no_subscriber() {
        let cfg = Config {
            log_file: None,
            ..Config::default()
        };
        assert!(!init_logging(&cfg));
    }
}
