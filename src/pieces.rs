// ============================================================================
// Static Piece Data
// ============================================================================

/// The seven tetromino kinds, in color-id order (I=1 .. Z=7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Board-cell encoding for this kind (1..=7; 0 is the empty cell).
    pub fn color_id(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    /// The canonical spawn-orientation shape matrix. Nonzero cells carry the
    /// kind's color id, so locking a piece writes the matrix values directly.
    pub fn template(&self) -> Shape {
        match self {
            PieceKind::I => Shape::new(vec![
                vec![0, 0, 0, 0],
                vec![1, 1, 1, 1],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ]),
            PieceKind::J => Shape::new(vec![
                vec![2, 0, 0],
                vec![2, 2, 2],
                vec![0, 0, 0],
            ]),
            PieceKind::L => Shape::new(vec![
                vec![0, 0, 3],
                vec![3, 3, 3],
                vec![0, 0, 0],
            ]),
            PieceKind::O => Shape::new(vec![
                vec![4, 4],
                vec![4, 4],
            ]),
            PieceKind::S => Shape::new(vec![
                vec![0, 5, 5],
                vec![5, 5, 0],
                vec![0, 0, 0],
            ]),
            PieceKind::T => Shape::new(vec![
                vec![0, 6, 0],
                vec![6, 6, 6],
                vec![0, 0, 0],
            ]),
            PieceKind::Z => Shape::new(vec![
                vec![7, 7, 0],
                vec![0, 7, 7],
                vec![0, 0, 0],
            ]),
        }
    }
}

// ============================================================================
// Shape Matrix
// ============================================================================

/// A square matrix of cells (0 = empty, nonzero = the owning kind's color id).
/// Templates are immutable; rotation always returns a new instance.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    fn new(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    /// Side length of the (square) matrix.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.rows[y][x]
    }

    /// Filled cells as (x, y, color id), row-major.
    pub fn filled_cells(&self) -> Vec<(usize, usize, u8)> {
        let mut cells = Vec::with_capacity(4);
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    cells.push((x, y, value));
                }
            }
        }
        cells
    }

    /// 90° clockwise rotation: transpose the matrix, then reverse each row.
    /// This is a matrix-origin rotation, not a rotation about a visual pivot,
    /// and it is the exact formula the collision rules are tuned against.
    pub fn rotated_cw(&self) -> Shape {
        let height = self.rows.len();
        let width = self.rows[0].len();

        let mut rotated = vec![vec![0u8; height]; width];
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                rotated[x][y] = value;
            }
        }
        for row in &mut rotated {
            row.reverse();
        }

        Shape { rows: rotated }
    }
}

// ============================================================================
// Table Validation Tests
// ============================================================================
