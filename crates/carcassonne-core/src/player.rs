//! Players, meeples, and the token ledger.
//!
//! Every meeple is a tracked token: it is always either in its owner's pool
//! or standing on exactly one region. The ledger enforces that conservation
//! so replays can never leak or duplicate a token.

use crate::regions::RegionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Player identifier, assigned by seat order starting at 0
pub type PlayerId = u8;

/// Meeple identifier, unique across the whole game
pub type MeepleId = u32;

/// Meeples each player starts with
pub const MEEPLES_PER_PLAYER: u32 = 7;

/// Most seats a single game supports
pub const MAX_PLAYERS: usize = 5;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} has no meeples left in their pool")]
    NoFreeMeeple(PlayerId),
}

/// Meeple colors in seat order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeepleColor {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

impl MeepleColor {
    /// Color assigned to a seat
    pub fn for_player(player: PlayerId) -> MeepleColor {
        match player % MAX_PLAYERS as u8 {
            0 => MeepleColor::Red,
            1 => MeepleColor::Blue,
            2 => MeepleColor::Green,
            3 => MeepleColor::Yellow,
            _ => MeepleColor::Black,
        }
    }
}

/// Where a meeple currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeepleState {
    /// In its owner's supply, available to place
    InPool,
    /// Standing on a region on the board
    OnBoard { region: RegionId },
}

/// One tracked meeple token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeple {
    pub id: MeepleId,
    pub owner: PlayerId,
    pub state: MeepleState,
}

/// One seat at the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: MeepleColor,
    pub score: u32,
    /// Ids of the meeples this player owns, fixed at setup
    pub meeples: Vec<MeepleId>,
}

/// Token and score ledger for every seat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    players: Vec<Player>,
    meeples: Vec<Meeple>,
}

impl Ledger {
    /// Seat `count` players, each with a full pool of meeples
    pub fn new(count: usize) -> Self {
        let mut players = Vec::with_capacity(count);
        let mut meeples = Vec::with_capacity(count * MEEPLES_PER_PLAYER as usize);
        for seat in 0..count {
            let id = seat as PlayerId;
            let mut owned = Vec::with_capacity(MEEPLES_PER_PLAYER as usize);
            for _ in 0..MEEPLES_PER_PLAYER {
                let meeple_id = meeples.len() as MeepleId;
                meeples.push(Meeple {
                    id: meeple_id,
                    owner: id,
                    state: MeepleState::InPool,
                });
                owned.push(meeple_id);
            }
            players.push(Player {
                id,
                name: format!("Player {}", seat + 1),
                color: MeepleColor::for_player(id),
                score: 0,
                meeples: owned,
            });
        }
        Self { players, meeples }
    }

    /// Number of seats
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn meeple(&self, id: MeepleId) -> Option<&Meeple> {
        self.meeples.get(id as usize)
    }

    /// Owner of a meeple
    pub fn owner_of(&self, id: MeepleId) -> Option<PlayerId> {
        self.meeple(id).map(|m| m.owner)
    }

    /// An available meeple from `player`'s pool, if any. Lowest id first so
    /// identical move streams pick identical tokens.
    pub fn free_meeple(&self, player: PlayerId) -> Result<MeepleId, LedgerError> {
        let seat = self
            .players
            .get(player as usize)
            .ok_or(LedgerError::UnknownPlayer(player))?;
        seat.meeples
            .iter()
            .copied()
            .find(|&m| self.meeples[m as usize].state == MeepleState::InPool)
            .ok_or(LedgerError::NoFreeMeeple(player))
    }

    /// Move a pooled meeple onto a region
    pub fn place(&mut self, meeple: MeepleId, region: RegionId) {
        self.meeples[meeple as usize].state = MeepleState::OnBoard { region };
    }

    /// Return a meeple to its owner's pool. Idempotent; returning a pooled
    /// meeple is a no-op.
    pub fn return_meeple(&mut self, meeple: MeepleId) {
        self.meeples[meeple as usize].state = MeepleState::InPool;
    }

    /// How many of `player`'s meeples are standing on the board
    pub fn meeples_on_board(&self, player: PlayerId) -> u32 {
        self.meeples
            .iter()
            .filter(|m| m.owner == player && matches!(m.state, MeepleState::OnBoard { .. }))
            .count() as u32
    }

    /// How many meeples remain in `player`'s pool
    pub fn meeples_in_pool(&self, player: PlayerId) -> u32 {
        self.meeples
            .iter()
            .filter(|m| m.owner == player && m.state == MeepleState::InPool)
            .count() as u32
    }

    /// Credit points to a player
    pub fn add_score(&mut self, player: PlayerId, points: u32) {
        if let Some(seat) = self.players.get_mut(player as usize) {
            seat.score += points;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_player_starts_with_full_pool() {
        let ledger = Ledger::new(3);
        for seat in 0..3 {
            assert_eq!(ledger.meeples_in_pool(seat), MEEPLES_PER_PLAYER);
            assert_eq!(ledger.meeples_on_board(seat), 0);
        }
    }

    #[test]
    fn test_colors_by_seat() {
        let ledger = Ledger::new(5);
        let colors: Vec<_> = ledger.players().iter().map(|p| p.color).collect();
        assert_eq!(
            colors,
            vec![
                MeepleColor::Red,
                MeepleColor::Blue,
                MeepleColor::Green,
                MeepleColor::Yellow,
                MeepleColor::Black,
            ]
        );
    }

    #[test]
    fn test_place_and_return_conserves_tokens() {
        let mut ledger = Ledger::new(2);

        let m = ledger.free_meeple(0).unwrap();
        ledger.place(m, 42);
        assert_eq!(ledger.meeples_in_pool(0), MEEPLES_PER_PLAYER - 1);
        assert_eq!(ledger.meeples_on_board(0), 1);
        assert_eq!(
            ledger.meeple(m).unwrap().state,
            MeepleState::OnBoard { region: 42 }
        );

        ledger.return_meeple(m);
        ledger.return_meeple(m); // idempotent
        assert_eq!(ledger.meeples_in_pool(0), MEEPLES_PER_PLAYER);
        assert_eq!(ledger.meeples_on_board(0), 0);
    }

    #[test]
    fn test_pool_exhaustion() {
        let mut ledger = Ledger::new(1);
        for _ in 0..MEEPLES_PER_PLAYER {
            let m = ledger.free_meeple(0).unwrap();
            ledger.place(m, 0);
        }
        assert_eq!(ledger.free_meeple(0), Err(LedgerError::NoFreeMeeple(0)));
    }

    #[test]
    fn test_unknown_player_rejected() {
        let ledger = Ledger::new(2);
        assert_eq!(ledger.free_meeple(9), Err(LedgerError::UnknownPlayer(9)));
    }

    #[test]
    fn test_free_meeple_is_deterministic() {
        let mut ledger = Ledger::new(2);
        let first = ledger.free_meeple(1).unwrap();
        ledger.place(first, 7);
        let second = ledger.free_meeple(1).unwrap();
        assert_eq!(second, first + 1, "pool drains in id order");
    }

    #[test]
    fn test_scores_accumulate() {
        let mut ledger = Ledger::new(2);
        ledger.add_score(0, 4);
        ledger.add_score(0, 2);
        ledger.add_score(1, 9);
        assert_eq!(ledger.player(0).unwrap().score, 6);
        assert_eq!(ledger.player(1).unwrap().score, 9);
    }
}
