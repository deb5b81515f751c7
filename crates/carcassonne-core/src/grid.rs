//! Square-grid coordinate system.
//!
//! This module provides the foundational coordinate types for the tile board:
//! - `Coord`: Identifies a board cell (one placed tile at most)
//! - `Direction`: The four tile sides, in clockwise order
//! - `Rotation`: Quarter-turns clockwise, `0..=3`
//!
//! Integer coordinates keep every derived quantity (neighbors, frontier,
//! sort order) bit-exact across participants, which the replication layer
//! depends on.

use serde::{Deserialize, Serialize};

/// Quarter-turns clockwise, valid values `0..=3`.
pub type Rotation = u8;

/// One side of a tile, in clockwise order starting from North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Top side of the tile
    North,
    /// Right side
    East,
    /// Bottom side
    South,
    /// Left side
    West,
}

impl Direction {
    /// All directions in clockwise order starting from North
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Side index used by the catalog (North = 0 .. West = 3)
    pub const fn side_index(self) -> usize {
        self as usize
    }

    /// The direction facing back at this one
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Integer board coordinate.
///
/// `x` increases going east, `y` increases going north. `Ord` is derived so
/// query results can be sorted into a deterministic order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Coord {
    /// Column (increases going east)
    pub x: i32,
    /// Row (increases going north)
    pub y: i32,
}

impl Coord {
    /// Where the first tile of a game is placed
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    /// Create a new coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbor one step in a direction
    pub fn neighbor(&self, direction: Direction) -> Coord {
        match direction {
            Direction::North => Coord::new(self.x, self.y + 1),
            Direction::East => Coord::new(self.x + 1, self.y),
            Direction::South => Coord::new(self.x, self.y - 1),
            Direction::West => Coord::new(self.x - 1, self.y),
        }
    }

    /// The four edge-adjacent neighbors paired with their direction,
    /// in clockwise order starting from North
    pub fn neighbors(&self) -> [(Direction, Coord); 4] {
        Direction::ALL.map(|d| (d, self.neighbor(d)))
    }

    /// The eight surrounding coordinates (cardinal + diagonal), used for
    /// cloister completion
    pub fn neighbors8(&self) -> [Coord; 8] {
        [
            Coord::new(self.x - 1, self.y + 1),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x + 1, self.y + 1),
            Coord::new(self.x - 1, self.y),
            Coord::new(self.x + 1, self.y),
            Coord::new(self.x - 1, self.y - 1),
            Coord::new(self.x, self.y - 1),
            Coord::new(self.x + 1, self.y - 1),
        ]
    }
}

/// The local (unrotated) side index that faces world direction `direction`
/// when the tile is rotated by `rotation` quarter-turns clockwise.
pub const fn local_side(direction: Direction, rotation: Rotation) -> usize {
    (direction as usize + 4 - rotation as usize) % 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_neighbors_are_unique_and_adjacent() {
        let c = Coord::new(0, 0);
        let neighbors = c.neighbors();

        let unique: HashSet<_> = neighbors.iter().map(|(_, n)| *n).collect();
        assert_eq!(unique.len(), 4);

        for (_, n) in neighbors {
            assert_eq!((n.x - c.x).abs() + (n.y - c.y).abs(), 1);
        }
    }

    #[test]
    fn test_neighbor_round_trip() {
        let c = Coord::new(3, -2);
        for d in Direction::ALL {
            assert_eq!(c.neighbor(d).neighbor(d.opposite()), c);
        }
    }

    #[test]
    fn test_neighbors8_count() {
        let c = Coord::new(1, 1);
        let unique: HashSet<_> = c.neighbors8().into_iter().collect();
        assert_eq!(unique.len(), 8);
        assert!(!unique.contains(&c));
    }

    #[test]
    fn test_local_side_identity_rotation() {
        for d in Direction::ALL {
            assert_eq!(local_side(d, 0), d.side_index());
        }
    }

    #[test]
    fn test_local_side_quarter_turn() {
        // After one clockwise quarter-turn the local North side faces East.
        assert_eq!(local_side(Direction::East, 1), Direction::North.side_index());
        assert_eq!(local_side(Direction::South, 1), Direction::East.side_index());
        assert_eq!(local_side(Direction::North, 3), Direction::East.side_index());
    }

    #[test]
    fn test_local_side_full_turn_is_identity() {
        for d in Direction::ALL {
            for r in 0..4u8 {
                let once = local_side(d, r);
                // Four quarter-turns bring the side back around.
                assert_eq!(local_side(d, (r + 4) % 4), once);
            }
        }
    }

    #[test]
    fn test_coord_ordering_is_stable() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(-1, 2), Coord::new(0, 0)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(-1, 2), Coord::new(0, 0), Coord::new(1, 0)]
        );
    }
}
