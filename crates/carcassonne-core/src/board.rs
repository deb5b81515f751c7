//! Sparse board of placed tiles.
//!
//! This module contains:
//! - The placed-tile grid (at most one tile per coordinate)
//! - Placement legality: every occupied-facing side must match terrain kinds
//!   exactly (City-City, Road-Road, Field-Field)
//! - Frontier enumeration for the current tile
//! - A JSON-friendly snapshot with arrays instead of map keys

use crate::catalog::{Catalog, EdgeKind, TileType};
use crate::grid::{Coord, Direction, Rotation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tile committed to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    /// Catalog index of the tile type
    pub tile: usize,
    /// Clockwise quarter-turns applied at placement
    pub rotation: Rotation,
}

/// The sparse grid of placed tiles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    tiles: HashMap<Coord, PlacedTile>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been placed yet
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of placed tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Get the tile at a coordinate
    pub fn get(&self, coord: Coord) -> Option<PlacedTile> {
        self.tiles.get(&coord).copied()
    }

    /// Whether a coordinate holds a tile
    pub fn occupied(&self, coord: Coord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Terrain of the placed tile at `coord` on the side facing `direction`
    pub fn edge_at(&self, catalog: &Catalog, coord: Coord, direction: Direction) -> Option<EdgeKind> {
        let placed = self.get(coord)?;
        let tile = catalog.get(placed.tile)?;
        Some(tile.edge(placed.rotation, direction))
    }

    /// How many of the 8 surrounding coordinates are occupied
    pub fn occupied_neighbors8(&self, coord: Coord) -> u32 {
        coord
            .neighbors8()
            .into_iter()
            .filter(|n| self.occupied(*n))
            .count() as u32
    }

    /// Whether `tile` fits at `coord` under `rotation`.
    ///
    /// The coordinate must be empty and touch at least one placed tile, and
    /// every side facing a placed tile must carry the same terrain kind as
    /// the neighbor's facing side. Sides facing empty space always fit.
    pub fn fits(&self, catalog: &Catalog, tile: &TileType, coord: Coord, rotation: Rotation) -> bool {
        if self.occupied(coord) {
            return false;
        }
        let mut touches = false;
        for (direction, neighbor) in coord.neighbors() {
            let Some(facing) = self.edge_at(catalog, neighbor, direction.opposite()) else {
                continue;
            };
            touches = true;
            if tile.edge(rotation, direction) != facing {
                return false;
            }
        }
        touches
    }

    /// Every frontier coordinate where `tile` fits, with its valid rotations.
    ///
    /// Coordinates are sorted ascending and carry no duplicates; rotations
    /// are ascending `0..=3`. Coordinates where no rotation fits are omitted.
    pub fn legal_placements(&self, catalog: &Catalog, tile: &TileType) -> Vec<(Coord, Vec<Rotation>)> {
        let mut frontier: Vec<Coord> = self
            .tiles
            .keys()
            .flat_map(|c| c.neighbors().map(|(_, n)| n))
            .filter(|c| !self.occupied(*c))
            .collect();
        frontier.sort();
        frontier.dedup();

        frontier
            .into_iter()
            .filter_map(|coord| {
                let rotations: Vec<Rotation> = (0..4)
                    .filter(|&r| self.fits(catalog, tile, coord, r))
                    .collect();
                if rotations.is_empty() {
                    None
                } else {
                    Some((coord, rotations))
                }
            })
            .collect()
    }

    /// Record a tile. The caller has already checked legality; the first
    /// tile of a game lands at the origin with no check at all.
    pub(crate) fn place(&mut self, coord: Coord, placed: PlacedTile) {
        debug_assert!(!self.occupied(coord));
        self.tiles.insert(coord, placed);
    }

    /// Iterate over all placed tiles
    pub fn iter(&self) -> impl Iterator<Item = (Coord, PlacedTile)> + '_ {
        self.tiles.iter().map(|(c, t)| (*c, *t))
    }

    /// Convert to a JSON-friendly representation with arrays instead of a
    /// coordinate-keyed map (JSON cannot key objects by tuples)
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut tiles: Vec<PlacedTileJson> = self
            .tiles
            .iter()
            .map(|(coord, placed)| PlacedTileJson {
                x: coord.x,
                y: coord.y,
                tile: placed.tile,
                rotation: placed.rotation,
            })
            .collect();
        tiles.sort_by_key(|t| (t.x, t.y));
        BoardSnapshot { tiles }
    }
}

/// JSON-friendly board representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<PlacedTileJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTileJson {
    pub x: i32,
    pub y: i32,
    pub tile: usize,
    pub rotation: Rotation,
}
