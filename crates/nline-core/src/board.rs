//! Square N×N board and N-in-a-row win detection.
//!
//! A line wins only when all N cells hold the same mark, so a 5×5 board needs
//! five in a row. Coordinates are `(row, col)`; the HTTP API calls them
//! `(x, y)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Smallest supported board.
pub const MIN_SIZE: usize = 3;

/// Largest supported board.
pub const MAX_SIZE: usize = 7;

/// Board size used when a request does not name one.
pub const DEFAULT_SIZE: usize = 3;

/// Wire symbol for a draw.
pub const DRAW_SYMBOL: &str = "Draw";

/// Player mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other player's mark.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }

    fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "X" => Some(Self::X),
            "O" => Some(Self::O),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decided result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Outcome {
    Winner(Mark),
    Draw,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winner(mark) => mark.as_str(),
            Self::Draw => DRAW_SYMBOL,
        }
    }

    /// Winning mark, `None` for a draw.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Self::Winner(mark) => Some(mark),
            Self::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.as_str().to_string()
    }
}

impl TryFrom<String> for Outcome {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == DRAW_SYMBOL {
            return Ok(Self::Draw);
        }
        Mark::parse(&value)
            .map(Self::Winner)
            .ok_or_else(|| format!("unknown outcome symbol: {value:?}"))
    }
}

/// Coordinates of a completed line, in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinLine {
    pub mark: Mark,
    pub cells: Vec<(usize, usize)>,
}

impl WinLine {
    /// Row-major flat indices, as a grid renderer addresses squares.
    pub fn indices(&self, size: usize) -> Vec<usize> {
        self.cells.iter().map(|(r, c)| r * size + c).collect()
    }
}

/// Clamp a requested size into `MIN_SIZE..=MAX_SIZE`; negatives become `MIN_SIZE`.
pub fn clamp_size(requested: i64) -> usize {
    match usize::try_from(requested) {
        Ok(size) => size.clamp(MIN_SIZE, MAX_SIZE),
        Err(_) => MIN_SIZE,
    }
}

/// Square board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<String>>", try_from = "Vec<Vec<String>>")]
pub struct Board {
    size: usize,
    cells: Vec<Option<Mark>>,
}

impl Board {
    /// Empty board; fails for sizes outside `MIN_SIZE..=MAX_SIZE`.
    pub fn new(size: usize) -> GameResult<Self> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::InvalidSize {
                size,
                min: MIN_SIZE,
                max: MAX_SIZE,
            });
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    /// Empty board with the size clamped into range.
    pub fn clamped(size: usize) -> Self {
        let size = clamp_size(i64::try_from(size).unwrap_or(i64::MAX));
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size && col < self.size).then(|| row * self.size + col)
    }

    /// Mark at `(row, col)`; `None` for empty or out-of-board cells.
    pub fn get(&self, row: usize, col: usize) -> Option<Mark> {
        self.index(row, col).and_then(|i| self.cells[i])
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        self.index(row, col).is_some()
    }

    /// Place a mark on an empty cell.
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> GameResult<()> {
        let i = self
            .index(row, col)
            .ok_or(GameError::OutOfBounds { x: row, y: col })?;
        if self.cells[i].is_some() {
            return Err(GameError::CellOccupied { x: row, y: col });
        }
        self.cells[i] = Some(mark);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of marks on the board.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..self.size)
            .flat_map(|r| (0..self.size).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get(r, c).is_none())
            .collect()
    }

    /// Outcome after a mark was placed at `(row, col)`.
    ///
    /// Only the lines through that cell can have been completed by the move,
    /// so this inspects at most four lines of N cells.
    pub fn outcome_after(&self, row: usize, col: usize) -> Option<Outcome> {
        let n = self.size;
        if let Some(mark) = self.get(row, col) {
            let won = self.line_owner((0..n).map(|c| (row, c))) == Some(mark)
                || self.line_owner((0..n).map(|r| (r, col))) == Some(mark)
                || (row == col && self.line_owner((0..n).map(|i| (i, i))) == Some(mark))
                || (row + col == n - 1
                    && self.line_owner((0..n).map(|i| (i, n - 1 - i))) == Some(mark));
            if won {
                return Some(Outcome::Winner(mark));
            }
        }
        self.is_full().then_some(Outcome::Draw)
    }

    /// Outcome from a full scan of every line.
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(line) = self.winning_line() {
            return Some(Outcome::Winner(line.mark));
        }
        self.is_full().then_some(Outcome::Draw)
    }

    /// First completed line: rows, then columns, main diagonal, anti diagonal.
    pub fn winning_line(&self) -> Option<WinLine> {
        self.lines().into_iter().find_map(|cells| {
            self.line_owner(cells.iter().copied())
                .map(|mark| WinLine { mark, cells })
        })
    }

    fn lines(&self) -> Vec<Vec<(usize, usize)>> {
        let n = self.size;
        let mut lines = Vec::with_capacity(2 * n + 2);
        lines.extend((0..n).map(|r| (0..n).map(|c| (r, c)).collect::<Vec<_>>()));
        lines.extend((0..n).map(|c| (0..n).map(|r| (r, c)).collect::<Vec<_>>()));
        lines.push((0..n).map(|i| (i, i)).collect());
        lines.push((0..n).map(|i| (i, n - 1 - i)).collect());
        lines
    }

    /// Mark filling every cell of the line, if any.
    fn line_owner(&self, mut cells: impl Iterator<Item = (usize, usize)>) -> Option<Mark> {
        let (r, c) = cells.next()?;
        let first = self.get(r, c)?;
        cells.all(|(r, c)| self.get(r, c) == Some(first)).then_some(first)
    }

    /// Wire form: one `Vec<String>` per row, `""` for empty cells.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.cells
            .chunks(self.size)
            .map(|row| {
                row.iter()
                    .map(|c| c.map(Mark::as_str).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    /// Parse the wire form.
    pub fn from_rows(rows: &[Vec<String>]) -> GameResult<Self> {
        let size = rows.len();
        let mut board = Self::new(size).map_err(|_| GameError::MalformedBoard {
            reason: format!("{size} rows"),
        })?;
        for (r, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(GameError::MalformedBoard {
                    reason: format!("row {r} has {} cells, expected {size}", row.len()),
                });
            }
            for (c, symbol) in row.iter().enumerate() {
                if symbol.is_empty() {
                    continue;
                }
                let mark = Mark::parse(symbol).ok_or_else(|| GameError::MalformedBoard {
                    reason: format!("unknown symbol {symbol:?} at ({r}, {c})"),
                })?;
                board.cells[r * size + c] = Some(mark);
            }
        }
        Ok(board)
    }
}

impl From<Board> for Vec<Vec<String>> {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl TryFrom<Vec<Vec<String>>> for Board {
    type Error = GameError;

    fn try_from(rows: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        Board::from_rows(&rows)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..self.size {
            write!(f, " {c}")?;
        }
        writeln!(f)?;
        for r in 0..self.size {
            write!(f, " {r} ")?;
            for c in 0..self.size {
                let symbol = self.get(r, c).map(Mark::as_str).unwrap_or(".");
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
