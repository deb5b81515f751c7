//! Static tile definitions.
//!
//! This module contains:
//! - Edge terrain kinds and feature kinds
//! - `TileType`: the terrain layout of one physical tile
//! - `Catalog`: the full set of tiles in a deck, loaded from JSON or built
//!   from the standard base-game distribution
//! - Catalog validation (fail-fast at startup)
//!
//! A catalog has one entry per physical tile, so repeated tile shapes appear
//! repeatedly. The reference deck holds 72 entries and entry 0 is the
//! starting tile.

use crate::grid::{local_side, Direction, Rotation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of tiles in the reference base-game deck
pub const REFERENCE_TILE_COUNT: usize = 72;

/// Terrain kind at a full tile side, used for placement compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    City,
    Road,
    Field,
}

/// Kind of a terrain feature on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Walled city segment, scored per tile (+ pennants) on completion
    City,
    /// Road segment, scored per tile on completion
    Road,
    /// Farmland, scored at game end per adjacent completed city
    Field,
    /// Monastery, scored when all 8 surrounding cells are occupied
    Cloister,
}

impl FeatureKind {
    /// The edge terrain this feature occupies, if it touches edges at all
    pub fn edge_kind(&self) -> Option<EdgeKind> {
        match self {
            FeatureKind::City => Some(EdgeKind::City),
            FeatureKind::Road => Some(EdgeKind::Road),
            FeatureKind::Field => Some(EdgeKind::Field),
            FeatureKind::Cloister => None,
        }
    }
}

/// One terrain feature of a tile type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDef {
    /// What kind of feature this is
    pub kind: FeatureKind,
    /// Local side indices (0 = North .. 3 = West) this feature reaches.
    /// Empty for cloisters.
    #[serde(default)]
    pub edges: Vec<u8>,
    /// Whether a pennant/shield is printed on this (city) segment
    #[serde(default)]
    pub pennant: bool,
    /// For fields: local indices of city features this field borders on the
    /// same tile, used for farm scoring
    #[serde(default)]
    pub adjacent_cities: Vec<u8>,
    /// Tile-local center position, passed through unchanged to the
    /// presentation layer for meeple placement
    #[serde(default)]
    pub center: (f32, f32),
}

/// The terrain layout of one physical tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileType {
    /// Terrain at each side in local orientation (North, East, South, West)
    pub edges: [EdgeKind; 4],
    /// All terrain features on the tile
    pub features: Vec<FeatureDef>,
}

impl TileType {
    /// Terrain facing world direction `direction` under `rotation`
    pub fn edge(&self, rotation: Rotation, direction: Direction) -> EdgeKind {
        self.edges[local_side(direction, rotation)]
    }

    /// Index of the feature that owns the side facing `direction` under
    /// `rotation`. Every side is owned by exactly one feature in a valid
    /// catalog.
    pub fn feature_on_side(&self, rotation: Rotation, direction: Direction) -> Option<usize> {
        let side = local_side(direction, rotation) as u8;
        self.features
            .iter()
            .position(|f| f.edges.contains(&side))
    }

    /// Number of features on this tile
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

/// Errors raised while loading or validating a catalog.
///
/// All of these are fatal: the engine cannot run on a malformed catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("expected {expected} tiles in catalog, found {found}")]
    Mismatch { expected: usize, found: usize },

    #[error("tile {tile}: {reason}")]
    Invalid { tile: usize, reason: String },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The full set of physical tiles in a deck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tiles: Vec<TileType>,
}

impl Catalog {
    /// Parse a catalog from JSON and fail fast unless it holds exactly
    /// `expected` tiles and every tile is internally consistent
    pub fn from_json(json: &str, expected: usize) -> Result<Self, CatalogError> {
        let tiles: Vec<TileType> = serde_json::from_str(json)?;
        Self::from_tiles(tiles, expected)
    }

    /// Build a catalog from already-parsed tiles, applying the same checks
    /// as [`Catalog::from_json`]
    pub fn from_tiles(tiles: Vec<TileType>, expected: usize) -> Result<Self, CatalogError> {
        if tiles.len() != expected {
            return Err(CatalogError::Mismatch {
                expected,
                found: tiles.len(),
            });
        }
        for (i, tile) in tiles.iter().enumerate() {
            validate_tile(i, tile)?;
        }
        Ok(Self { tiles })
    }

    /// Number of physical tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Get a tile type by index
    pub fn get(&self, index: usize) -> Option<&TileType> {
        self.tiles.get(index)
    }

    /// Iterate over all tile types
    pub fn iter(&self) -> impl Iterator<Item = &TileType> {
        self.tiles.iter()
    }

    /// The standard base-game deck: 24 tile shapes, 72 physical tiles,
    /// starting tile (city + straight road) first.
    pub fn standard() -> Self {
        let shapes = standard_shapes();
        let mut tiles = Vec::with_capacity(REFERENCE_TILE_COUNT);

        // Starting tile first, then the remaining copies in shape order.
        tiles.push(shapes[START_SHAPE].1.clone());
        for (i, (count, shape)) in shapes.iter().enumerate() {
            let count = if i == START_SHAPE { count - 1 } else { *count };
            for _ in 0..count {
                tiles.push(shape.clone());
            }
        }

        Self::from_tiles(tiles, REFERENCE_TILE_COUNT)
            .expect("standard deck is valid by construction")
    }
}

fn validate_tile(index: usize, tile: &TileType) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::Invalid {
        tile: index,
        reason,
    };

    let mut side_owner = [None::<usize>; 4];
    for (fi, feature) in tile.features.iter().enumerate() {
        match feature.kind.edge_kind() {
            None => {
                if !feature.edges.is_empty() {
                    return Err(invalid(format!("cloister feature {fi} touches edges")));
                }
            }
            Some(kind) => {
                if feature.edges.is_empty() {
                    return Err(invalid(format!("feature {fi} touches no edges")));
                }
                for &side in &feature.edges {
                    let s = side as usize;
                    if s >= 4 {
                        return Err(invalid(format!("feature {fi} has edge index {side}")));
                    }
                    if tile.edges[s] != kind {
                        return Err(invalid(format!(
                            "feature {fi} claims side {side} of a different terrain"
                        )));
                    }
                    if let Some(other) = side_owner[s] {
                        return Err(invalid(format!(
                            "side {side} owned by features {other} and {fi}"
                        )));
                    }
                    side_owner[s] = Some(fi);
                }
            }
        }
        for &ci in &feature.adjacent_cities {
            if feature.kind != FeatureKind::Field {
                return Err(invalid(format!(
                    "non-field feature {fi} lists adjacent cities"
                )));
            }
            match tile.features.get(ci as usize) {
                Some(f) if f.kind == FeatureKind::City => {}
                _ => {
                    return Err(invalid(format!(
                        "field feature {fi} borders non-city feature {ci}"
                    )))
                }
            }
        }
    }

    for (s, owner) in side_owner.iter().enumerate() {
        if owner.is_none() {
            return Err(invalid(format!("side {s} not owned by any feature")));
        }
    }

    Ok(())
}

// ==================== Standard deck ====================

/// Index of the starting tile's shape within [`standard_shapes`]
const START_SHAPE: usize = 3; // city + straight road through

fn feature(kind: FeatureKind, edges: &[u8], pennant: bool, adjacent_cities: &[u8]) -> FeatureDef {
    // Center falls on the mean of the touched edge midpoints; a feature with
    // no edges (cloister) sits at the tile center.
    let center = if edges.is_empty() {
        (0.0, 0.0)
    } else {
        let (mut cx, mut cy) = (0.0f32, 0.0f32);
        for &e in edges {
            let (dx, dy) = match e {
                0 => (0.0, 1.0),
                1 => (1.0, 0.0),
                2 => (0.0, -1.0),
                _ => (-1.0, 0.0),
            };
            cx += dx;
            cy += dy;
        }
        (cx / edges.len() as f32, cy / edges.len() as f32)
    };
    FeatureDef {
        kind,
        edges: edges.to_vec(),
        pennant,
        adjacent_cities: adjacent_cities.to_vec(),
        center,
    }
}

fn city(edges: &[u8]) -> FeatureDef {
    feature(FeatureKind::City, edges, false, &[])
}

fn city_pennant(edges: &[u8]) -> FeatureDef {
    feature(FeatureKind::City, edges, true, &[])
}

fn road(edges: &[u8]) -> FeatureDef {
    feature(FeatureKind::Road, edges, false, &[])
}

fn field(edges: &[u8], adjacent_cities: &[u8]) -> FeatureDef {
    feature(FeatureKind::Field, edges, false, adjacent_cities)
}

fn cloister() -> FeatureDef {
    feature(FeatureKind::Cloister, &[], false, &[])
}

fn tile(edges: [EdgeKind; 4], features: Vec<FeatureDef>) -> TileType {
    TileType { edges, features }
}

/// The 24 base-game tile shapes with their physical counts (sum 72).
///
/// Sides are listed (North, East, South, West). Fields separated only by a
/// road on the same tile are modeled as one feature; the `adjacent_cities`
/// lists carry the field-to-city adjacency farm scoring needs.
fn standard_shapes() -> Vec<(usize, TileType)> {
    use EdgeKind::{City as C, Field as F, Road as R};

    vec![
        // Cloister with a road stub south
        (2, tile([F, F, R, F], vec![cloister(), road(&[2]), field(&[0, 1, 3], &[])])),
        // Plain cloister
        (4, tile([F, F, F, F], vec![cloister(), field(&[0, 1, 2, 3], &[])])),
        // Full city, pennant
        (1, tile([C, C, C, C], vec![city_pennant(&[0, 1, 2, 3])])),
        // City + straight road through (the starting tile)
        (4, tile([C, R, F, R], vec![city(&[0]), road(&[1, 3]), field(&[2], &[0])])),
        // City on one side
        (5, tile([C, F, F, F], vec![city(&[0]), field(&[1, 2, 3], &[0])])),
        // City bridging east-west, pennant
        (
            2,
            tile([F, C, F, C], vec![city_pennant(&[1, 3]), field(&[0], &[0]), field(&[2], &[0])]),
        ),
        // City bridging north-south
        (
            1,
            tile([C, F, C, F], vec![city(&[0, 2]), field(&[1], &[0]), field(&[3], &[0])]),
        ),
        // Two separate cities on opposite sides
        (
            3,
            tile([F, C, F, C], vec![city(&[1]), city(&[3]), field(&[0, 2], &[0, 1])]),
        ),
        // Two separate cities on adjacent sides
        (
            2,
            tile([F, C, C, F], vec![city(&[1]), city(&[2]), field(&[0, 3], &[0, 1])]),
        ),
        // City + road bending east-south
        (
            3,
            tile([C, R, R, F], vec![city(&[0]), road(&[1, 2]), field(&[3], &[0])]),
        ),
        // City + road bending south-west
        (
            3,
            tile([C, F, R, R], vec![city(&[0]), road(&[2, 3]), field(&[1], &[0])]),
        ),
        // City + three-way road junction
        (
            3,
            tile([C, R, R, R], vec![city(&[0]), road(&[1]), road(&[2]), road(&[3])]),
        ),
        // City corner, pennant
        (
            2,
            tile([C, F, F, C], vec![city_pennant(&[0, 3]), field(&[1, 2], &[0])]),
        ),
        // City corner
        (3, tile([C, F, F, C], vec![city(&[0, 3]), field(&[1, 2], &[0])])),
        // City corner + road corner, pennant
        (
            2,
            tile([C, R, R, C], vec![city_pennant(&[0, 3]), road(&[1, 2])]),
        ),
        // City corner + road corner
        (3, tile([C, R, R, C], vec![city(&[0, 3]), road(&[1, 2])])),
        // City on three sides, pennant
        (
            1,
            tile([C, C, F, C], vec![city_pennant(&[0, 1, 3]), field(&[2], &[0])]),
        ),
        // City on three sides
        (3, tile([C, C, F, C], vec![city(&[0, 1, 3]), field(&[2], &[0])])),
        // City on three sides + road, pennant
        (
            2,
            tile([C, C, R, C], vec![city_pennant(&[0, 1, 3]), road(&[2])]),
        ),
        // City on three sides + road
        (1, tile([C, C, R, C], vec![city(&[0, 1, 3]), road(&[2])])),
        // Straight road
        (
            8,
            tile([R, F, R, F], vec![road(&[0, 2]), field(&[1], &[]), field(&[3], &[])]),
        ),
        // Curved road
        (9, tile([F, F, R, R], vec![road(&[2, 3]), field(&[0, 1], &[])])),
        // Three-way road junction
        (
            4,
            tile([F, R, R, R], vec![road(&[1]), road(&[2]), road(&[3]), field(&[0], &[])]),
        ),
        // Four-way road junction
        (
            1,
            tile([R, R, R, R], vec![road(&[0]), road(&[1]), road(&[2]), road(&[3])]),
        ),
    ]
}
