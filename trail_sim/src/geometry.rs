use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width and height of every region grid.
pub const GRID_SIZE: u8 = 50;

/// Number of cells in one region grid.
pub const GRID_CELLS: usize = GRID_SIZE as usize * GRID_SIZE as usize;

/// Highest valid coordinate on either axis.
pub const GRID_EDGE: u8 = GRID_SIZE - 1;

/// Cell coordinate inside a region. Always within `[0, 49]` on both axes,
/// including positions decoded from persisted records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTilePos")]
pub struct TilePos {
    x: u8,
    y: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tile ({x}, {y}) is outside the 50x50 grid")]
pub struct OutOfGrid {
    pub x: u8,
    pub y: u8,
}

#[derive(Deserialize)]
#[serde(rename = "TilePos")]
struct RawTilePos {
    x: u8,
    y: u8,
}

impl TryFrom<RawTilePos> for TilePos {
    type Error = OutOfGrid;

    fn try_from(raw: RawTilePos) -> Result<Self, Self::Error> {
        TilePos::new(raw.x, raw.y).ok_or(OutOfGrid { x: raw.x, y: raw.y })
    }
}

impl TilePos {
    /// Builds a position, returning `None` when either coordinate is off the grid.
    pub fn new(x: u8, y: u8) -> Option<Self> {
        if x < GRID_SIZE && y < GRID_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub const fn x(self) -> u8 {
        self.x
    }

    pub const fn y(self) -> u8 {
        self.y
    }

    /// Builds a position from signed coordinates, as produced by neighbour offsets.
    pub fn from_signed(x: i32, y: i32) -> Option<Self> {
        if x < 0 || y < 0 || x > GRID_EDGE as i32 || y > GRID_EDGE as i32 {
            return None;
        }
        Some(Self {
            x: x as u8,
            y: y as u8,
        })
    }

    /// Row-major cell index (`y * 50 + x`).
    #[inline]
    pub fn index(self) -> usize {
        self.y as usize * GRID_SIZE as usize + self.x as usize
    }

    /// Inverse of [`TilePos::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= GRID_CELLS {
            return None;
        }
        Some(Self {
            x: (index % GRID_SIZE as usize) as u8,
            y: (index / GRID_SIZE as usize) as u8,
        })
    }

    /// Neighbouring cell one step in `direction`, or `None` past the grid edge.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        Self::from_signed(self.x as i32 + dx, self.y as i32 + dy)
    }

    /// All in-bounds neighbours (diagonals included) paired with their direction.
    pub fn neighbors(self) -> impl Iterator<Item = (Direction, TilePos)> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.step(dir).map(|pos| (dir, pos)))
    }

    /// Whether the cell lies on an exit row or column.
    pub fn is_edge(self) -> bool {
        self.x == 0 || self.y == 0 || self.x == GRID_EDGE || self.y == GRID_EDGE
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction of a single move, numbered clockwise from `Top = 1`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
    TopLeft = 8,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// Screen-space offset; `y` grows downwards.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
        }
    }

    /// Rotates clockwise by `eighths` 45-degree steps (negative turns counter-clockwise).
    pub fn rotate(self, eighths: i32) -> Self {
        let index = (self as i32 - 1 + eighths).rem_euclid(8);
        Self::ALL[index as usize]
    }

    pub fn opposite(self) -> Self {
        self.rotate(4)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Top => "top",
            Direction::TopRight => "top_right",
            Direction::Right => "right",
            Direction::BottomRight => "bottom_right",
            Direction::Bottom => "bottom",
            Direction::BottomLeft => "bottom_left",
            Direction::Left => "left",
            Direction::TopLeft => "top_left",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_row_major() {
        let pos = TilePos::new(7, 3).unwrap();
        assert_eq!(pos.index(), 3 * 50 + 7);
        assert_eq!(TilePos::from_index(pos.index()), Some(pos));
        assert_eq!(TilePos::from_index(GRID_CELLS), None);
    }

    #[test]
    fn corner_has_three_neighbors() {
        let corner = TilePos::new(0, 0).unwrap();
        let dirs: Vec<Direction> = corner.neighbors().map(|(dir, _)| dir).collect();
        assert_eq!(
            dirs,
            vec![Direction::Right, Direction::BottomRight, Direction::Bottom]
        );
        let centre = TilePos::new(25, 25).unwrap();
        assert_eq!(centre.neighbors().count(), 8);
    }

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Direction::Top.rotate(-1), Direction::TopLeft);
        assert_eq!(Direction::TopLeft.rotate(1), Direction::Top);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::BottomLeft.opposite(), Direction::TopRight);
    }

    #[test]
    fn edges_are_detected() {
        assert!(TilePos::new(0, 17).unwrap().is_edge());
        assert!(TilePos::new(12, 49).unwrap().is_edge());
        assert!(!TilePos::new(1, 48).unwrap().is_edge());
        assert_eq!(TilePos::new(50, 0), None);
        assert_eq!(TilePos::from_signed(-1, 4), None);
    }

    #[test]
    fn decoding_rejects_off_grid_positions() {
        let pos: TilePos = serde_json::from_str(r#"{"x":12,"y":49}"#).unwrap();
        assert_eq!((pos.x(), pos.y()), (12, 49));

        let err = serde_json::from_str::<TilePos>(r#"{"x":60,"y":3}"#).unwrap_err();
        assert!(err.to_string().contains("(60, 3) is outside"), "{err}");
        assert!(serde_json::from_str::<TilePos>(r#"{"x":0,"y":50}"#).is_err());
    }
}
