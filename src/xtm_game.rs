// Minefield state and the rules that change it
// Level generation, flood reveal, flags and the win check. Nothing in here draws.

use rand::Rng;
use std::ops::RangeInclusive;
use tracing::{debug, trace};

/// Board coordinate as (x, y)
pub type Point = (usize, usize);

/// Smallest custom board side
pub const MIN_SIDE: usize = 8;

/// Difficulty presets offered by the level menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,     // 8x8, 10 mines
    Intermediate, // 16x16, 40 mines
    Expert,       // 30x16, 99 mines
    Custom,       // width, height and mines asked from the player
}

impl Difficulty {
    /// Menu order
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
        Difficulty::Custom,
    ];

    /// Fixed level parameters, `None` for Custom
    pub fn preset(&self) -> Option<LevelParams> {
        match self {
            Difficulty::Beginner => Some(LevelParams::new(8, 8, 10)),
            Difficulty::Intermediate => Some(LevelParams::new(16, 16, 40)),
            Difficulty::Expert => Some(LevelParams::new(30, 16, 99)),
            Difficulty::Custom => None,
        }
    }

    /// Menu hotkey
    pub fn hotkey(&self) -> char {
        match self {
            Difficulty::Beginner => 'b',
            Difficulty::Intermediate => 'i',
            Difficulty::Expert => 'e',
            Difficulty::Custom => 'c',
        }
    }
}

/// Size and mine count of one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

impl LevelParams {
    pub fn new(width: usize, height: usize, mines: usize) -> Self {
        LevelParams { width, height, mines }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Allowed mine counts for a board of `area` cells: 10% to 60%, truncated
pub fn mine_range(area: usize) -> RangeInclusive<usize> {
    area / 10..=area * 6 / 10
}

/// What a cell holds. Fixed once the level is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Mine,
    Clear(u8), // adjacent mine count (0-8)
}

/// What the player knows about a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Hidden,
    Flagged,
    Revealed,
}

/// One generated level: cell values plus the parallel reveal grid
#[derive(Debug, Clone)]
pub struct Minefield {
    w: usize,
    h: usize,
    mines: usize,
    cells: Vec<Cell>,
    reveal: Vec<Reveal>,
}

// In-bounds neighbours of `p`, excluding `p` itself
fn around(w: usize, h: usize, (x, y): Point) -> impl Iterator<Item = Point> {
    let xs = x.saturating_sub(1)..=(x + 1).min(w - 1);
    (y.saturating_sub(1)..=(y + 1).min(h - 1))
        .flat_map(move |oy| xs.clone().map(move |ox| (ox, oy)))
        .filter(move |&p| p != (x, y))
}

impl Minefield {
    /// Place `params.mines` mines uniformly at random and compute the counts.
    ///
    /// Positions are resampled on collision. The mine count is clamped to the
    /// number of cells so the sampling always finishes.
    pub fn generate<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> Self {
        let w = params.width.max(1);
        let h = params.height.max(1);
        let target = params.mines.min(w * h);

        let mut taken = vec![false; w * h];
        let mut positions = Vec::with_capacity(target);
        while positions.len() < target {
            let x = rng.gen_range(0..w);
            let y = rng.gen_range(0..h);
            if !taken[y * w + x] {
                taken[y * w + x] = true;
                positions.push((x, y));
            }
        }

        let field = Minefield::with_mines(w, h, &positions);
        debug!(width = w, height = h, mines = field.mines, "level generated");
        field
    }

    /// Build a level with mines at exactly the given positions.
    /// Duplicates are ignored; positions outside the board are skipped.
    pub fn with_mines(w: usize, h: usize, mines: &[Point]) -> Self {
        let w = w.max(1);
        let h = h.max(1);
        let mut cells = vec![Cell::Clear(0); w * h];
        for &(x, y) in mines {
            if x < w && y < h {
                cells[y * w + x] = Cell::Mine;
            }
        }

        // every mine bumps the count of its non-mine neighbours
        for y in 0..h {
            for x in 0..w {
                if cells[y * w + x] != Cell::Mine {
                    continue;
                }
                for (nx, ny) in around(w, h, (x, y)) {
                    if let Cell::Clear(n) = &mut cells[ny * w + nx] {
                        *n += 1;
                    }
                }
            }
        }

        let mines = cells.iter().filter(|c| **c == Cell::Mine).count();
        Minefield {
            w,
            h,
            mines,
            cells,
            reveal: vec![Reveal::Hidden; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    fn index(&self, (x, y): Point) -> usize {
        y * self.w + x
    }

    pub fn cell(&self, p: Point) -> Cell {
        self.cells[self.index(p)]
    }

    pub fn reveal_state(&self, p: Point) -> Reveal {
        self.reveal[self.index(p)]
    }

    pub fn is_mine(&self, p: Point) -> bool {
        self.cell(p) == Cell::Mine
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn flag_count(&self) -> usize {
        self.reveal.iter().filter(|r| **r == Reveal::Flagged).count()
    }

    /// Mine counter shown to the player; negative when over-flagged
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.flag_count() as isize
    }

    /// Cursor target after moving by `(dx, dy)`, or `None` if it leaves the board
    pub fn step(&self, (x, y): Point, (dx, dy): (isize, isize)) -> Option<Point> {
        let nx = x.checked_add_signed(dx).filter(|nx| *nx < self.w)?;
        let ny = y.checked_add_signed(dy).filter(|ny| *ny < self.h)?;
        Some((nx, ny))
    }

    /// Reveal `p`, flooding through connected zero cells.
    ///
    /// The reveal grid doubles as the visited set, so every cell is pushed at
    /// most a handful of times and never processed twice. Flagged cells
    /// reached by the flood are revealed as well. Returns how many cells
    /// changed to revealed.
    pub fn reveal(&mut self, p: Point) -> usize {
        let mut opened = 0;
        let mut pending = vec![p];
        while let Some(q) = pending.pop() {
            let i = self.index(q);
            if self.reveal[i] == Reveal::Revealed {
                continue;
            }
            self.reveal[i] = Reveal::Revealed;
            opened += 1;
            if self.cells[i] == Cell::Clear(0) {
                pending.extend(
                    around(self.w, self.h, q).filter(|n| self.reveal[self.index(*n)] != Reveal::Revealed),
                );
            }
        }
        trace!(x = p.0, y = p.1, opened, "reveal");
        opened
    }

    /// Toggle hidden <-> flagged. Revealed cells are left alone.
    pub fn toggle_flag(&mut self, p: Point) -> bool {
        let i = self.index(p);
        self.reveal[i] = match self.reveal[i] {
            Reveal::Hidden => Reveal::Flagged,
            Reveal::Flagged => Reveal::Hidden,
            Reveal::Revealed => return false,
        };
        trace!(x = p.0, y = p.1, state = ?self.reveal[i], "flag toggled");
        true
    }

    /// Won once every non-mine cell is revealed; mines may be in any state
    pub fn check_win(&self) -> bool {
        self.cells
            .iter()
            .zip(&self.reveal)
            .all(|(c, r)| *c == Cell::Mine || *r == Reveal::Revealed)
    }

    /// Reveal every mine. Returns the mines that were flagged beforehand.
    pub fn reveal_mines(&mut self) -> Vec<Point> {
        let mut flagged = Vec::new();
        for y in 0..self.h {
            for x in 0..self.w {
                let i = self.index((x, y));
                if self.cells[i] != Cell::Mine {
                    continue;
                }
                if self.reveal[i] == Reveal::Flagged {
                    flagged.push((x, y));
                }
                self.reveal[i] = Reveal::Revealed;
            }
        }
        flagged
    }
}
