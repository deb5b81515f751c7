//! The wire-level move record and its outcome.
//!
//! A move is the only thing peers exchange: which tile went where, at what
//! rotation, and optionally which feature received a meeple. Applying the
//! same move stream to the same seed reproduces the same game everywhere.

use crate::grid::{Coord, Rotation};
use crate::player::{MeepleId, PlayerId};
use crate::score::ClosureEvent;
use serde::{Deserialize, Serialize};

/// A meeple placed as part of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeeplePlacement {
    /// Local feature index on the placed tile
    pub feature: u8,
    /// The placing player; the engine picks the token from their pool
    pub player: PlayerId,
}

/// One complete turn, as replicated between peers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Catalog index of the tile drawn this turn
    pub tile: usize,
    pub position: Coord,
    /// Clockwise quarter-turns
    pub rotation: Rotation,
    pub meeple: Option<MeeplePlacement>,
}

/// Everything that happened when a move was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Regions that completed and paid out this turn, ascending by region id
    pub closures: Vec<ClosureEvent>,
    /// Meeples released back to pools this turn
    pub returned_meeples: Vec<MeepleId>,
    /// Net points credited this turn, ascending by player
    pub score_deltas: Vec<(PlayerId, u32)>,
    /// Legal placements for the next tile, empty when the deck is out
    pub next_positions: Vec<(Coord, Vec<Rotation>)>,
}
