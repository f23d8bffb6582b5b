use rand::Rng;

use crate::pieces::{PieceKind, Shape};

// ============================================================================
// Configuration
// ============================================================================

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

// Timing (in milliseconds)
pub const BASE_DROP_MS: u64 = 1000;
pub const MIN_DROP_MS: u64 = 100;
const SPEED_STEP_MS: u64 = 100;
pub const LINES_PER_LEVEL: u32 = 10;

// Scoring: points per lines cleared in one pass, multiplied by the level,
// plus a flat bonus whenever a piece locks.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];
pub const LOCK_BONUS: u32 = 10;

// ============================================================================
// Types
// ============================================================================

/// Board contents: one color id (0..=7) per cell, 0 = empty. Fixed-size so
/// line compaction shifts rows in place instead of reallocating.
pub type Grid = [[u8; GRID_WIDTH]; GRID_HEIGHT];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

/// The piece currently under player control: its kind, its current (possibly
/// rotated) shape matrix, and the board position of the matrix's top-left
/// corner. The y offset may be negative while cells sit above the board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub position: Position,
}

impl ActivePiece {
    /// A fresh piece at the horizontal spawn column, top of the board.
    pub fn spawn(kind: PieceKind) -> Self {
        Self::at(kind, (GRID_WIDTH as i16 / 2) - 1, 0)
    }

    pub fn at(kind: PieceKind, x: i16, y: i16) -> Self {
        Self {
            kind,
            shape: kind.template(),
            position: Position { x, y },
        }
    }

    pub fn color_id(&self) -> u8 {
        self.kind.color_id()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// The single source of nondeterminism: which kind spawns next. Injecting it
/// makes every game replayable from a fixed draw sequence.
pub trait PieceProvider {
    fn next_kind(&mut self) -> PieceKind;
}

struct RandomPieceProvider;

impl PieceProvider for RandomPieceProvider {
    fn next_kind(&mut self) -> PieceKind {
        let mut rng = rand::thread_rng();
        PieceKind::ALL[rng.gen_range(0..PieceKind::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(kinds: Vec<PieceKind>) -> Self {
        Self { kinds, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index += 1;
        kind
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Grid,
    pub current_piece: ActivePiece,
    pub next_piece: ActivePiece,
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub drop_interval_ms: u64,
    pub status: GameStatus,
    drop_accum_ms: u64,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

// ============================================================================
// Game Logic
// ============================================================================

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider))
    }

    pub fn with_provider(mut provider: Box<dyn PieceProvider>) -> Self {
        let current_piece = ActivePiece::spawn(provider.next_kind());
        let next_piece = ActivePiece::spawn(provider.next_kind());

        Self {
            grid: [[0; GRID_WIDTH]; GRID_HEIGHT],
            current_piece,
            next_piece,
            score: 0,
            lines_cleared: 0,
            level: 1,
            drop_interval_ms: BASE_DROP_MS,
            status: GameStatus::Running,
            drop_accum_ms: 0,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// Test constructor: a prepared board and a hand-placed current piece.
    pub fn with_grid(grid: Grid, current_piece: ActivePiece) -> Self {
        let mut game = Self::new();
        game.grid = grid;
        game.current_piece = current_piece;
        game
    }

    /// Clears the board, resets the progression counters and drop speed, and
    /// spawns a fresh current/next pair. Always succeeds, even after GameOver.
    pub fn reset(&mut self) {
        self.grid = [[0; GRID_WIDTH]; GRID_HEIGHT];
        self.score = 0;
        self.lines_cleared = 0;
        self.level = 1;
        self.drop_interval_ms = BASE_DROP_MS;
        self.drop_accum_ms = 0;
        self.status = GameStatus::Running;
        self.events.clear();

        self.current_piece = ActivePiece::spawn(self.piece_provider.next_kind());
        self.next_piece = ActivePiece::spawn(self.piece_provider.next_kind());

        self.events.push(GameEvent::GameRestarted);
    }

    /// Pure collision predicate: true iff any filled cell of `shape`, placed
    /// at `position`, leaves the board sideways or downward, or overlaps a
    /// settled cell. Cells above row 0 never collide against board contents,
    /// which lets pieces spawn and rotate partially above the visible board.
    pub fn check_collision(&self, shape: &Shape, position: Position) -> bool {
        for (x, y, _) in shape.filled_cells() {
            let board_x = position.x + x as i16;
            let board_y = position.y + y as i16;

            if board_x < 0 || board_x >= GRID_WIDTH as i16 || board_y >= GRID_HEIGHT as i16 {
                return true;
            }
            if board_y >= 0 && self.grid[board_y as usize][board_x as usize] != 0 {
                return true;
            }
        }
        false
    }

    fn collides(&self, piece: &ActivePiece) -> bool {
        self.check_collision(&piece.shape, piece.position)
    }

    pub fn move_left(&mut self) -> bool {
        self.move_horizontal(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_horizontal(1)
    }

    /// Shifts the current piece by `direction` columns (-1 or +1), rolling
    /// the shift back if it collides. No-op unless the game is running.
    pub fn move_horizontal(&mut self, direction: i16) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        self.current_piece.position.x += direction;
        if self.collides(&self.current_piece) {
            self.current_piece.position.x -= direction;
            return false;
        }
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Rotates the current piece 90° clockwise (transpose + row reverse).
    /// A rotation that would collide is discarded whole; there are no
    /// wall-kick attempts.
    pub fn rotate(&mut self) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        let rotated = self.current_piece.shape.rotated_cw();
        if self.check_collision(&rotated, self.current_piece.position) {
            return false;
        }
        self.current_piece.shape = rotated;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    /// Player-initiated single-row descent. Identical to an automatic gravity
    /// step, including resetting the drop accumulator, so the next automatic
    /// drop is measured from this moment.
    pub fn soft_drop(&mut self) {
        if self.status != GameStatus::Running {
            return;
        }
        self.gravity_step();
    }

    /// Accumulates elapsed time and performs one gravity step once the
    /// accumulator exceeds the drop interval. The accumulator is only reset
    /// by gravity steps, never by pause/resume; the driver re-baselines its
    /// own clock when resuming.
    pub fn advance_time(&mut self, delta_ms: u64) {
        if self.status != GameStatus::Running {
            return;
        }
        self.drop_accum_ms += delta_ms;
        if self.drop_accum_ms > self.drop_interval_ms {
            self.gravity_step();
        }
    }

    /// Descends until the piece collides, then locks in place. Atomic: the
    /// intermediate rows are never observable.
    pub fn hard_drop(&mut self) {
        if self.status != GameStatus::Running {
            return;
        }
        loop {
            self.current_piece.position.y += 1;
            if self.collides(&self.current_piece) {
                self.current_piece.position.y -= 1;
                break;
            }
        }
        self.lock_and_spawn();
        self.drop_accum_ms = 0;
    }

    /// One downward step: shift, roll back on collision, and in the colliding
    /// case run the lock → clear → spawn sequence.
    fn gravity_step(&mut self) {
        self.current_piece.position.y += 1;
        if self.collides(&self.current_piece) {
            self.current_piece.position.y -= 1;
            self.lock_and_spawn();
        }
        self.drop_accum_ms = 0;
    }

    fn lock_and_spawn(&mut self) {
        self.lock_piece();
        if self.status == GameStatus::GameOver {
            // Locked above the visible board; nothing to clear or spawn.
            return;
        }
        let lines = self.clear_lines();
        if lines > 0 {
            self.score_lines(lines);
        }
        self.spawn_next();
    }

    /// Writes the current piece's cells into the board and awards the flat
    /// placement bonus. If any filled cell still sits above row 0 the game is
    /// over instead: nothing is written and no bonus is awarded.
    fn lock_piece(&mut self) {
        let cells = self.current_piece.shape.filled_cells();
        let position = self.current_piece.position;

        if cells.iter().any(|&(_, y, _)| position.y + (y as i16) < 0) {
            self.status = GameStatus::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }

        for (x, y, value) in cells {
            let board_x = (position.x + x as i16) as usize;
            let board_y = (position.y + y as i16) as usize;
            self.grid[board_y][board_x] = value;
        }
        self.update_score(LOCK_BONUS);
        self.events.push(GameEvent::PieceLocked);
    }

    /// Removes every full row, shifting the rows above it down and leaving an
    /// empty row at the top. Scans bottom-up and re-examines the same index
    /// after a removal, since a new row has just shifted into it. Returns the
    /// number of rows cleared (0..=4 from a single lock).
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = GRID_HEIGHT as i32 - 1;

        while row >= 0 {
            let y = row as usize;
            if self.grid[y].iter().all(|&cell| cell != 0) {
                for r in (1..=y).rev() {
                    self.grid[r] = self.grid[r - 1];
                }
                self.grid[0] = [0; GRID_WIDTH];
                cleared += 1;
                // Re-check the same row: the row above just shifted into it.
            } else {
                row -= 1;
            }
        }

        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
        }
        cleared
    }

    /// Applies the progression rule for `lines` rows cleared in one pass:
    /// score by the per-line table times the current level, then recompute
    /// the level and, on a level-up, the drop interval.
    pub fn score_lines(&mut self, lines: u32) {
        self.lines_cleared += lines;
        let base = LINE_SCORES[lines.min(4) as usize];
        self.update_score(base * self.level);

        let new_level = self.lines_cleared / LINES_PER_LEVEL + 1;
        if new_level > self.level {
            self.level = new_level;
            self.drop_interval_ms = BASE_DROP_MS
                .saturating_sub(u64::from(self.level - 1) * SPEED_STEP_MS)
                .max(MIN_DROP_MS);
            self.events.push(GameEvent::LevelUp(self.level));
        }
    }

    pub fn update_score(&mut self, points: u32) {
        self.score += points;
    }

    /// Promotes the next piece to current and draws a new next. A collision
    /// at the spawn position is the game's sole other loss condition.
    pub fn spawn_next(&mut self) {
        let next = ActivePiece::spawn(self.piece_provider.next_kind());
        self.current_piece = std::mem::replace(&mut self.next_piece, next);

        if self.collides(&self.current_piece) {
            self.status = GameStatus::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.status {
            GameStatus::Running => {
                self.status = GameStatus::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameStatus::Paused => {
                self.status = GameStatus::Running;
                self.events.push(GameEvent::Unpaused);
            }
            GameStatus::GameOver => {
                // Terminal until reset; pause is rejected.
            }
        }
    }

    /// Returns the board with the current piece overlaid, so presenters never
    /// re-derive piece geometry. Cells above row 0 are simply not visible.
    pub fn render_grid(&self) -> Grid {
        let mut visual = self.grid;
        for (x, y, value) in self.current_piece.shape.filled_cells() {
            let board_x = self.current_piece.position.x + x as i16;
            let board_y = self.current_piece.position.y + y as i16;
            if (0..GRID_WIDTH as i16).contains(&board_x)
                && (0..GRID_HEIGHT as i16).contains(&board_y)
            {
                visual[board_y as usize][board_x as usize] = value;
            }
        }
        visual
    }

    /// Takes and clears all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Check if a specific row is complete (all filled)
    pub fn is_row_complete(&self, y: usize) -> bool {
        self.grid[y].iter().all(|&cell| cell != 0)
    }

    /// Count filled cells in a row
    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.grid[y].iter().filter(|&&cell| cell != 0).count()
    }

    /// Count total filled cells in grid
    pub fn total_filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|&&cell| cell != 0).count()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn empty_grid() -> Grid {
        [[0; GRID_WIDTH]; GRID_HEIGHT]
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..GRID_WIDTH {
            grid[y][x] = PieceKind::T.color_id();
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..GRID_WIDTH {
            if x != gap_x {
                grid[y][x] = PieceKind::T.color_id();
            }
        }
    }
}
