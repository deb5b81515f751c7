//! The game façade: one struct owning the whole rules state.
//!
//! `Game` validates a move completely before touching anything, so a
//! rejected move leaves the state byte-for-byte unchanged. That property is
//! what lets networked peers treat any rejection as a replication fault
//! rather than something to patch around locally.

use crate::board::{Board, BoardSnapshot, PlacedTile};
use crate::catalog::Catalog;
use crate::deck::Deck;
use crate::grid::{Coord, Rotation};
use crate::moves::{Move, MoveOutcome};
use crate::player::{Ledger, LedgerError, Player, PlayerId};
use crate::regions::FeatureGraph;
use crate::score::{self, ClosureEvent, ScoreRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a move was rejected. The state is untouched in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    /// The tile does not fit at that position and rotation
    #[error("tile does not fit at that position and rotation")]
    IllegalPlacement,

    /// The move names a different tile than the deck is about to deal.
    /// Peers seeing this have diverged and must resynchronize.
    #[error("move carries tile {got} but the deck deals tile {expected}")]
    TileMismatch { expected: usize, got: usize },

    /// The targeted feature connects to a region that already has a meeple
    #[error("that feature already belongs to a claimed region")]
    FeatureAlreadyClaimed,

    /// The placing player has no meeples left in their pool
    #[error("player {0} has no meeples left")]
    NoFreeMeeple(PlayerId),

    /// The move names a feature index the tile does not have
    #[error("tile has no feature {0}")]
    NoSuchFeature(u8),

    /// The move names a player that is not seated
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// A discard was requested but the current tile still fits somewhere
    #[error("the current tile still has a legal placement")]
    TileStillPlaceable,

    /// The deck is exhausted or final scoring has run
    #[error("the game is over")]
    GameOver,
}

impl From<LedgerError> for GameError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownPlayer(p) => GameError::UnknownPlayer(p),
            LedgerError::NoFreeMeeple(p) => GameError::NoFreeMeeple(p),
        }
    }
}

/// Serializable view of the full public game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub seed: u64,
    pub board: BoardSnapshot,
    pub players: Vec<Player>,
    pub tiles_remaining: usize,
    pub finished: bool,
}

/// A complete game of tiles, meeples, and scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    catalog: Catalog,
    board: Board,
    graph: FeatureGraph,
    ledger: Ledger,
    deck: Deck,
    rules: ScoreRules,
    finished: bool,
}

impl Game {
    /// Start a game on the standard deck with reference scoring
    pub fn new(catalog: Catalog, players: usize, seed: u64) -> Self {
        Self::with_rules(catalog, players, seed, ScoreRules::default())
    }

    /// Start a game over an explicit deck, for agreed deals and scripted
    /// games
    pub fn with_deck(catalog: Catalog, players: usize, deck: Deck, rules: ScoreRules) -> Self {
        Self {
            catalog,
            board: Board::new(),
            graph: FeatureGraph::new(),
            ledger: Ledger::new(players),
            deck,
            rules,
            finished: false,
        }
    }

    /// Start a game with custom point values
    pub fn with_rules(catalog: Catalog, players: usize, seed: u64, rules: ScoreRules) -> Self {
        let deck = Deck::new(catalog.len(), seed);
        Self {
            catalog,
            board: Board::new(),
            graph: FeatureGraph::new(),
            ledger: Ledger::new(players),
            deck,
            rules,
            finished: false,
        }
    }

    /// Catalog index of the tile the current move must place
    pub fn current_tile(&self) -> Option<usize> {
        if self.finished {
            None
        } else {
            self.deck.peek()
        }
    }

    /// Tiles left to deal after the current one
    pub fn tiles_remaining(&self) -> usize {
        self.deck.remaining()
    }

    /// Whether final scoring has run or the deck is out
    pub fn is_finished(&self) -> bool {
        self.finished || self.deck.is_empty()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.ledger.player(id)
    }

    pub fn players(&self) -> &[Player] {
        self.ledger.players()
    }

    /// Meeples left in a player's pool
    pub fn meeples_in_pool(&self, player: PlayerId) -> u32 {
        self.ledger.meeples_in_pool(player)
    }

    /// Meeples a player has standing on the board
    pub fn meeples_on_board(&self, player: PlayerId) -> u32 {
        self.ledger.meeples_on_board(player)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    /// Every legal position and rotation for the current tile, sorted by
    /// coordinate with rotations ascending. On an empty board the starting
    /// tile goes at the origin, any rotation.
    pub fn free_positions(&self) -> Vec<(Coord, Vec<Rotation>)> {
        let Some(index) = self.current_tile() else {
            return Vec::new();
        };
        if self.board.is_empty() {
            return vec![(Coord::ORIGIN, vec![0, 1, 2, 3])];
        }
        let Some(tile) = self.catalog.get(index) else {
            return Vec::new();
        };
        self.board.legal_placements(&self.catalog, tile)
    }

    /// Feature indices of the current tile still claimable after placing it
    /// at `position`/`rotation`
    pub fn open_feature_slots(&self, position: Coord, rotation: Rotation) -> Vec<u8> {
        let Some(index) = self.current_tile() else {
            return Vec::new();
        };
        let Some(tile) = self.catalog.get(index) else {
            return Vec::new();
        };
        self.graph
            .open_slots(&self.catalog, &self.board, tile, position, rotation % 4)
    }

    /// Apply one replicated move.
    ///
    /// Validation happens entirely up front; on `Err` nothing has changed.
    pub fn apply_move(&mut self, mv: &Move) -> Result<MoveOutcome, GameError> {
        if self.finished {
            return Err(GameError::GameOver);
        }
        let expected = self.deck.peek().ok_or(GameError::GameOver)?;
        if mv.tile != expected {
            return Err(GameError::TileMismatch {
                expected,
                got: mv.tile,
            });
        }

        let rotation = mv.rotation % 4;
        let tile = self
            .catalog
            .get(mv.tile)
            .ok_or(GameError::IllegalPlacement)?;

        if self.board.is_empty() {
            if mv.position != Coord::ORIGIN {
                return Err(GameError::IllegalPlacement);
            }
        } else if !self.board.fits(&self.catalog, tile, mv.position, rotation) {
            return Err(GameError::IllegalPlacement);
        }

        // Meeple checks run against the prospective placement without
        // mutating, so any rejection below still leaves the state intact.
        let staged_meeple = match mv.meeple {
            None => None,
            Some(placement) => {
                if self.ledger.player(placement.player).is_none() {
                    return Err(GameError::UnknownPlayer(placement.player));
                }
                if placement.feature as usize >= tile.feature_count() {
                    return Err(GameError::NoSuchFeature(placement.feature));
                }
                let token = self.ledger.free_meeple(placement.player)?;
                if self.graph.would_join_claimed(
                    &self.catalog,
                    &self.board,
                    tile,
                    mv.position,
                    rotation,
                    placement.feature as usize,
                ) {
                    return Err(GameError::FeatureAlreadyClaimed);
                }
                Some((placement.feature as usize, token))
            }
        };

        // Commit.
        self.board.place(
            mv.position,
            PlacedTile {
                tile: mv.tile,
                rotation,
            },
        );
        let touched = self.graph.merge_tile(&self.catalog, &self.board, mv.position);

        if let Some((feature, token)) = staged_meeple {
            let node = touched[feature];
            self.graph.add_meeple(node, token);
            self.ledger.place(token, node);
        }

        self.deck.draw();

        // Closures run after the meeple lands, so a feature completed by
        // its own placement still scores for the placing player.
        let mut candidates = touched;
        candidates.extend(self.graph.cloisters_near(mv.position));
        let closures = score::check_closures(
            &mut self.graph,
            &self.board,
            &mut self.ledger,
            &self.rules,
            &candidates,
        );

        let returned_meeples: Vec<_> = closures
            .iter()
            .flat_map(|e| e.returned.iter().copied())
            .collect();
        let mut deltas: BTreeMap<PlayerId, u32> = BTreeMap::new();
        for event in &closures {
            for &p in &event.scorers {
                *deltas.entry(p).or_default() += event.points;
            }
        }

        let next_positions = self.free_positions();
        Ok(MoveOutcome {
            closures,
            returned_meeples,
            score_deltas: deltas.into_iter().collect(),
            next_positions,
        })
    }

    /// Set aside a tile that fits nowhere and move on to the next one.
    ///
    /// Only legal when [`Game::free_positions`] is empty, so peers applying
    /// the same move stream discard at the same points. Returns the
    /// discarded tile's catalog index.
    pub fn discard_unplaceable(&mut self) -> Result<usize, GameError> {
        if self.finished {
            return Err(GameError::GameOver);
        }
        let tile = self.deck.peek().ok_or(GameError::GameOver)?;
        if !self.free_positions().is_empty() {
            return Err(GameError::TileStillPlaceable);
        }
        self.deck.draw();
        Ok(tile)
    }

    /// Run final scoring: claimed incomplete regions pay reduced values,
    /// fields pay per completed adjacent city, and every meeple returns to
    /// its pool. Idempotent; a second call pays nothing.
    pub fn end_game(&mut self) -> Vec<ClosureEvent> {
        self.finished = true;
        score::end_game(&mut self.graph, &self.board, &mut self.ledger, &self.rules)
    }

    /// Serializable view of the public state
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            seed: self.deck.seed(),
            board: self.board.snapshot(),
            players: self.ledger.players().to_vec(),
            tiles_remaining: self.deck.remaining(),
            finished: self.is_finished(),
        }
    }
}
