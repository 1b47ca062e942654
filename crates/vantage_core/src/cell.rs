use std::fmt::Display;

/// Grid coordinate on the battlefield plane, `x` across and `z` deep.
/// Registry keys and sight-cache keys hash by component.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

/// Sugar macro
#[macro_export]
macro_rules! c {
    ($x: expr, $z: expr) => {
        Cell::new($x, $z)
    };
}

impl Cell {
    pub const ZERO: Cell = Cell { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance, the reach of an orthogonal-only attacker
    pub fn manhattan(&self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// Chebyshev distance, the reach of an attacker that may strike diagonally
    pub fn chebyshev(&self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

impl std::ops::Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Cell {
    type Output = Cell;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            z: self.z - rhs.z,
        }
    }
}

impl std::ops::Neg for Cell {
    type Output = Cell;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            z: -self.z,
        }
    }
}

/// Iterates the inclusive square of side `2 * radius + 1` around `center`,
/// row-major by x then z. Used by the registry range query.
pub fn iter_square(center: Cell, radius: i32) -> impl Iterator<Item = Cell> {
    (center.x - radius..=center.x + radius).flat_map(move |x| {
        (center.z - radius..=center.z + radius).map(move |z| Cell::new(x, z))
    })
}
