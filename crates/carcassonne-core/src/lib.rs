//! Core rules engine for a tile-laying board game.
//!
//! The engine is a deterministic state machine: given the same seed and the
//! same stream of [`Move`]s, every peer reaches the same state, so a
//! networked game needs to replicate nothing but the moves themselves.
//!
//! The pieces:
//! - [`catalog`]: tile definitions, validated at load
//! - [`deck`]: the seeded deal order
//! - [`board`]: the sparse grid and placement legality
//! - [`regions`]: cross-tile feature connectivity
//! - [`player`]: seats, meeples, and the token ledger
//! - [`score`]: completion detection and payouts
//! - [`game`]: the façade tying it all together
//!
//! ```
//! use carcassonne_core::{Catalog, Game, Move};
//!
//! let mut game = Game::new(Catalog::standard(), 2, 42);
//! let tile = game.current_tile().unwrap();
//! let (position, rotations) = game.free_positions()[0].clone();
//! game.apply_move(&Move {
//!     tile,
//!     position,
//!     rotation: rotations[0],
//!     meeple: None,
//! })
//! .unwrap();
//! ```

pub mod board;
pub mod catalog;
pub mod deck;
pub mod game;
pub mod grid;
pub mod moves;
pub mod player;
pub mod regions;
pub mod score;

pub use board::{Board, BoardSnapshot, PlacedTile};
pub use catalog::{Catalog, CatalogError, EdgeKind, FeatureDef, FeatureKind, TileType};
pub use deck::Deck;
pub use game::{Game, GameError, GameSnapshot};
pub use grid::{Coord, Direction, Rotation};
pub use moves::{MeeplePlacement, Move, MoveOutcome};
pub use player::{Ledger, Meeple, MeepleColor, MeepleId, MeepleState, Player, PlayerId};
pub use regions::{FeatureGraph, RegionData, RegionId};
pub use score::{ClosureEvent, ScoreRules};
