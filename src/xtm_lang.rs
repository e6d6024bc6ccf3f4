// Localized strings for the minigame
// English and Chinese tables; anything not "zh*" falls back to English

use crate::xtm_game::Difficulty;
use crate::xtm_session::{Action, Direction};

#[derive(Clone, Debug)]
pub struct Assets {
    // Window chrome
    pub title: &'static str,
    pub shortcuts: [&'static str; 3], // "<n>ew level" style, bracketed key is highlighted
    pub shortcut_names: [&'static str; 3], // same actions, used when their keys are rebound
    pub status_mines_fmt: &'static str, // " Mines: {} "

    // Difficulty menu
    pub diff_title: &'static str,
    pub diff_beginner: &'static str,
    pub diff_intermediate: &'static str,
    pub diff_expert: &'static str,
    pub diff_custom: &'static str,

    // Custom level prompts
    pub prompt_width: &'static str,
    pub prompt_height: &'static str,
    pub prompt_mines: &'static str,
    pub prompt_bounds_fmt: &'static str, // "Min: {} Max: {}"

    // Outcome boxes
    pub win_message: &'static str,
    pub loss_message: &'static str,
    pub press_any_key: &'static str,

    // Help box
    pub help_title: &'static str,
    pub act_up: &'static str,
    pub act_down: &'static str,
    pub act_left: &'static str,
    pub act_right: &'static str,
    pub act_new: &'static str,
    pub act_flag: &'static str,
    pub act_confirm: &'static str,
    pub act_quit: &'static str,
    pub act_help: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        title: "Minesweeper",
        shortcuts: ["<n>ew level", "<f>lag", "<q>uit"],
        shortcut_names: ["new level", "flag", "quit"],
        status_mines_fmt: " Mines: {} ",

        diff_title: "Game Difficulty",
        diff_beginner: "Beginner",
        diff_intermediate: "Intermediate",
        diff_expert: "Expert",
        diff_custom: "Custom",

        prompt_width: "Level width:",
        prompt_height: "Level height:",
        prompt_mines: "Number of bombs:",
        prompt_bounds_fmt: "Min: {} Max: {}",

        win_message: "Congratulations, you won!",
        loss_message: "Boom, you're dead!  Better luck next time.",
        press_any_key: "Press any key",

        help_title: "Keybindings",
        act_up: "Move up",
        act_down: "Move down",
        act_left: "Move left",
        act_right: "Move right",
        act_new: "New level",
        act_flag: "Flag",
        act_confirm: "Reveal",
        act_quit: "Quit",
        act_help: "Keybindings",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        title: "扫雷",
        shortcuts: ["<n>新关卡", "<f>标记", "<q>退出"],
        shortcut_names: ["新关卡", "标记", "退出"],
        status_mines_fmt: " 地雷：{} ",

        diff_title: "游戏难度",
        diff_beginner: "初级",
        diff_intermediate: "中级",
        diff_expert: "高级",
        diff_custom: "自定义",

        prompt_width: "关卡宽度：",
        prompt_height: "关卡高度：",
        prompt_mines: "地雷数量：",
        prompt_bounds_fmt: "最小：{} 最大：{}",

        win_message: "恭喜，你赢了！",
        loss_message: "轰！你被炸死了。祝下次好运。",
        press_any_key: "按任意键继续",

        help_title: "按键说明",
        act_up: "上移",
        act_down: "下移",
        act_left: "左移",
        act_right: "右移",
        act_new: "新关卡",
        act_flag: "标记",
        act_confirm: "翻开",
        act_quit: "退出",
        act_help: "按键说明",
    }
}

impl Assets {
    pub fn diff_name(&self, d: Difficulty) -> &'static str {
        match d {
            Difficulty::Beginner => self.diff_beginner,
            Difficulty::Intermediate => self.diff_intermediate,
            Difficulty::Expert => self.diff_expert,
            Difficulty::Custom => self.diff_custom,
        }
    }

    pub fn action_name(&self, action: Action) -> &'static str {
        match action {
            Action::Move(Direction::Up) => self.act_up,
            Action::Move(Direction::Down) => self.act_down,
            Action::Move(Direction::Left) => self.act_left,
            Action::Move(Direction::Right) => self.act_right,
            Action::New => self.act_new,
            Action::Flag => self.act_flag,
            Action::Confirm => self.act_confirm,
            Action::Quit => self.act_quit,
            Action::Help => self.act_help,
        }
    }

    /// "Min: 8 Max: 76"
    pub fn bounds_line(&self, min: usize, max: usize) -> String {
        self.prompt_bounds_fmt
            .replacen("{}", &min.to_string(), 1)
            .replacen("{}", &max.to_string(), 1)
    }

    /// Mine counter; goes negative when more cells are flagged than there are mines
    pub fn mines_line(&self, remaining: isize) -> String {
        self.status_mines_fmt.replacen("{}", &remaining.to_string(), 1)
    }
}

/// Active language and its string table
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Normalizes the code ("zh-CN" -> "zh"); unsupported languages get English
    pub fn new(lang_code: &str) -> Self {
        let code = if lang_code.to_lowercase().starts_with("zh") { "zh" } else { "en" };
        Lang {
            current_lang: code.to_string(),
            assets: if code == "zh" { chinese_assets() } else { english_assets() },
        }
    }
}
