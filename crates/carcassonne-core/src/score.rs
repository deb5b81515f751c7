//! Completion detection and scoring.
//!
//! Scoring runs in two regimes: during play, regions that complete pay out
//! immediately and release their meeples; at game end, every still-claimed
//! region pays a reduced value and fields pay per completed adjacent city.
//! A region pays out at most once, ever.

use crate::board::Board;
use crate::catalog::FeatureKind;
use crate::player::{Ledger, MeepleId, PlayerId};
use crate::regions::{FeatureGraph, RegionData, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Point values, tunable per game. `Default` gives the reference rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRules {
    /// Points per tile of a completed city
    pub city_per_tile: u32,
    /// Extra points per pennant in a completed city
    pub city_per_pennant: u32,
    /// Points per tile of a completed road
    pub road_per_tile: u32,
    /// Points per occupied cell of a cloister's neighborhood, the cloister
    /// tile itself included (9 when fully surrounded)
    pub cloister_per_tile: u32,
    /// Points per completed adjacent city for a claimed field
    pub field_per_city: u32,
    /// Divisor applied (flooring) to incomplete city/road values at game end
    pub endgame_divisor: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            city_per_tile: 2,
            city_per_pennant: 2,
            road_per_tile: 1,
            cloister_per_tile: 1,
            field_per_city: 3,
            endgame_divisor: 2,
        }
    }
}

/// One region paying out, either from completion during play or at game end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureEvent {
    /// Root node id of the region at the time it paid out
    pub region: RegionId,
    pub kind: FeatureKind,
    /// Points credited to each scorer (full value to every majority holder)
    pub points: u32,
    /// Players holding the meeple majority, ascending; empty if unclaimed
    pub scorers: Vec<PlayerId>,
    /// Meeples released back to their owners' pools
    pub returned: Vec<MeepleId>,
}

/// Players holding the strict meeple majority on a region, ascending.
/// Ties all score in full.
fn majority(ledger: &Ledger, meeples: &[MeepleId]) -> Vec<PlayerId> {
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    for &m in meeples {
        if let Some(owner) = ledger.owner_of(m) {
            *counts.entry(owner).or_default() += 1;
        }
    }
    let Some(&top) = counts.values().max() else {
        return Vec::new();
    };
    let mut winners: Vec<PlayerId> = counts
        .into_iter()
        .filter(|&(_, n)| n == top)
        .map(|(p, _)| p)
        .collect();
    winners.sort_unstable();
    winners
}

/// Full value of a completed city or road
fn completed_value(rules: &ScoreRules, data: &RegionData) -> u32 {
    let tiles = data.tiles.len() as u32;
    match data.kind {
        FeatureKind::City => tiles * rules.city_per_tile + data.pennants * rules.city_per_pennant,
        FeatureKind::Road => tiles * rules.road_per_tile,
        // Cloisters and fields are valued by their own rules elsewhere.
        FeatureKind::Cloister | FeatureKind::Field => 0,
    }
}

/// Occupied-cell count of a cloister's 3x3 neighborhood, itself included
fn cloister_value(rules: &ScoreRules, board: &Board, data: &RegionData) -> u32 {
    match data.cloister {
        Some(coord) => (1 + board.occupied_neighbors8(coord)) * rules.cloister_per_tile,
        None => 0,
    }
}

fn is_complete(board: &Board, data: &RegionData) -> bool {
    match data.kind {
        FeatureKind::City | FeatureKind::Road => data.open_ends == 0,
        FeatureKind::Cloister => data
            .cloister
            .is_some_and(|c| board.occupied_neighbors8(c) == 8),
        // Fields never complete during play.
        FeatureKind::Field => false,
    }
}

/// Pay out a region: credit every majority holder the full value, release
/// all meeples, and mark it so it never pays again
fn pay_out(
    graph: &mut FeatureGraph,
    ledger: &mut Ledger,
    root: RegionId,
    kind: FeatureKind,
    points: u32,
    closed: bool,
) -> ClosureEvent {
    let returned = graph.clear_meeples(root);
    let scorers = majority(ledger, &returned);
    for &m in &returned {
        ledger.return_meeple(m);
    }
    for &p in &scorers {
        ledger.add_score(p, points);
    }
    graph.mark_scored(root, closed);
    ClosureEvent {
        region: root,
        kind,
        points,
        scorers,
        returned,
    }
}

/// Check the given regions for completion and pay out every one that just
/// finished. Candidates are deduplicated by root; events come back in
/// ascending root-id order. Unclaimed regions still close (and are marked)
/// but produce an event with no scorers.
pub fn check_closures(
    graph: &mut FeatureGraph,
    board: &Board,
    ledger: &mut Ledger,
    rules: &ScoreRules,
    candidates: &[RegionId],
) -> Vec<ClosureEvent> {
    let roots: BTreeSet<RegionId> = candidates.iter().map(|&id| graph.resolve(id)).collect();

    let mut events = Vec::new();
    for root in roots {
        let data = graph.region(root);
        if data.scored || !is_complete(board, data) {
            continue;
        }
        let points = match data.kind {
            FeatureKind::Cloister => cloister_value(rules, board, data),
            _ => completed_value(rules, data),
        };
        let kind = data.kind;
        events.push(pay_out(graph, ledger, root, kind, points, true));
    }
    events
}

/// Final scoring pass: every claimed, unpaid region pays a reduced value
/// and releases its meeples. Runs over the whole graph in root-id order.
///
/// Incomplete cities and roads pay their full value divided (flooring) by
/// the endgame divisor. Cloisters pay per occupied neighborhood cell.
/// Fields pay per distinct completed adjacent city.
pub fn end_game(
    graph: &mut FeatureGraph,
    board: &Board,
    ledger: &mut Ledger,
    rules: &ScoreRules,
) -> Vec<ClosureEvent> {
    let mut events = Vec::new();
    for root in graph.roots() {
        let data = graph.region(root);
        if data.scored || data.meeples.is_empty() {
            continue;
        }
        let points = match data.kind {
            FeatureKind::City | FeatureKind::Road => {
                completed_value(rules, data) / rules.endgame_divisor.max(1)
            }
            FeatureKind::Cloister => cloister_value(rules, board, data),
            FeatureKind::Field => {
                // Count each completed adjacent city region once, however
                // many raw segment ids point into it.
                let closed_cities: BTreeSet<RegionId> = data
                    .adjacent_cities
                    .iter()
                    .map(|&id| graph.resolve(id))
                    .filter(|&c| graph.region(c).closed)
                    .collect();
                closed_cities.len() as u32 * rules.field_per_city
            }
        };
        let kind = data.kind;
        events.push(pay_out(graph, ledger, root, kind, points, false));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PlacedTile;
    use crate::catalog::Catalog;
    use crate::grid::{Coord, Rotation};
    use pretty_assertions::assert_eq;

    // Standard catalog indices (see catalog::standard_shapes).
    const PLAIN_CLOISTER: usize = 3;
    const CITY_ONE_SIDE: usize = 11;
    const STRAIGHT_ROAD: usize = 50;

    struct Fixture {
        catalog: Catalog,
        board: Board,
        graph: FeatureGraph,
        ledger: Ledger,
        rules: ScoreRules,
    }

    impl Fixture {
        fn new(players: usize) -> Self {
            Self {
                catalog: Catalog::standard(),
                board: Board::new(),
                graph: FeatureGraph::new(),
                ledger: Ledger::new(players),
                rules: ScoreRules::default(),
            }
        }

        fn place(&mut self, coord: Coord, tile: usize, rotation: Rotation) -> Vec<RegionId> {
            self.board.place(coord, PlacedTile { tile, rotation });
            self.graph.merge_tile(&self.catalog, &self.board, coord)
        }

        fn claim(&mut self, player: PlayerId, region: RegionId) -> MeepleId {
            let m = self.ledger.free_meeple(player).unwrap();
            self.graph.add_meeple(region, m);
            self.ledger.place(m, region);
            m
        }
    }

    #[test]
    fn test_two_tile_city_pays_once() {
        let mut fx = Fixture::new(2);
        let first = fx.place(Coord::ORIGIN, CITY_ONE_SIDE, 0);
        let meeple = fx.claim(0, first[0]);
        let second = fx.place(Coord::new(0, 1), CITY_ONE_SIDE, 2);

        let events = check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &second);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.kind, FeatureKind::City);
        assert_eq!(event.points, 4);
        assert_eq!(event.scorers, vec![0]);
        assert_eq!(event.returned, vec![meeple]);
        assert_eq!(fx.ledger.player(0).unwrap().score, 4);
        assert_eq!(fx.ledger.meeples_in_pool(0), crate::player::MEEPLES_PER_PLAYER);

        // Re-checking the same region pays nothing.
        let again = check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &second);
        assert!(again.is_empty());
        assert_eq!(fx.ledger.player(0).unwrap().score, 4);
    }

    #[test]
    fn test_pennant_adds_to_city_value() {
        // Custom two-tile catalog: a pennanted city cap against a plain one.
        let pennant_cap = {
            use crate::catalog::{EdgeKind, FeatureDef};
            crate::catalog::TileType {
                edges: [EdgeKind::City, EdgeKind::Field, EdgeKind::Field, EdgeKind::Field],
                features: vec![
                    FeatureDef {
                        kind: FeatureKind::City,
                        edges: vec![0],
                        pennant: true,
                        adjacent_cities: vec![],
                        center: (0.0, 1.0),
                    },
                    FeatureDef {
                        kind: FeatureKind::Field,
                        edges: vec![1, 2, 3],
                        pennant: false,
                        adjacent_cities: vec![0],
                        center: (0.0, -1.0),
                    },
                ],
            }
        };
        let plain_cap = Catalog::standard().get(CITY_ONE_SIDE).unwrap().clone();
        let catalog = Catalog::from_tiles(vec![pennant_cap, plain_cap], 2).unwrap();

        let mut board = Board::new();
        let mut graph = FeatureGraph::new();
        let mut ledger = Ledger::new(1);
        let rules = ScoreRules::default();

        board.place(Coord::ORIGIN, PlacedTile { tile: 0, rotation: 0 });
        let first = graph.merge_tile(&catalog, &board, Coord::ORIGIN);
        let meeple = ledger.free_meeple(0).unwrap();
        graph.add_meeple(first[0], meeple);
        ledger.place(meeple, first[0]);

        board.place(Coord::new(0, 1), PlacedTile { tile: 1, rotation: 2 });
        let second = graph.merge_tile(&catalog, &board, Coord::new(0, 1));

        let events = check_closures(&mut graph, &board, &mut ledger, &rules, &second);
        assert_eq!(events.len(), 1);
        // Two tiles at 2 each, plus 2 for the pennant.
        assert_eq!(events[0].points, 6);
        assert_eq!(events[0].returned, vec![meeple]);
        assert_eq!(ledger.player(0).unwrap().score, 6);
    }

    #[test]
    fn test_unclaimed_city_closes_without_scorers() {
        let mut fx = Fixture::new(2);
        fx.place(Coord::ORIGIN, CITY_ONE_SIDE, 0);
        let second = fx.place(Coord::new(0, 1), CITY_ONE_SIDE, 2);

        let events = check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &second);
        assert_eq!(events.len(), 1);
        assert!(events[0].scorers.is_empty());
        assert!(events[0].returned.is_empty());
        assert!(fx.graph.region(second[0]).closed);
    }

    #[test]
    fn test_open_road_not_paid() {
        let mut fx = Fixture::new(2);
        let nodes = fx.place(Coord::ORIGIN, STRAIGHT_ROAD, 0);
        fx.claim(0, nodes[0]);
        let events = check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &nodes);
        assert!(events.is_empty());
        assert_eq!(fx.ledger.meeples_on_board(0), 1);
    }

    #[test]
    fn test_majority_tie_scores_both_in_full() {
        let mut fx = Fixture::new(2);
        let first = fx.place(Coord::ORIGIN, STRAIGHT_ROAD, 0);
        fx.claim(0, first[0]);
        let second = fx.place(Coord::new(0, 1), STRAIGHT_ROAD, 0);
        // Legal in play only through separate segments merging; modeled
        // directly here.
        fx.claim(1, second[0]);

        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        let road: Vec<_> = events
            .iter()
            .filter(|e| e.kind == FeatureKind::Road)
            .collect();
        assert_eq!(road.len(), 1);
        // 2 road tiles, halved: 1 point, to both tied players.
        assert_eq!(road[0].points, 1);
        assert_eq!(road[0].scorers, vec![0, 1]);
        assert_eq!(fx.ledger.player(0).unwrap().score, 1);
        assert_eq!(fx.ledger.player(1).unwrap().score, 1);
    }

    #[test]
    fn test_lone_road_tile_rounds_to_zero_at_endgame() {
        let mut fx = Fixture::new(1);
        let nodes = fx.place(Coord::ORIGIN, STRAIGHT_ROAD, 0);
        fx.claim(0, nodes[0]);

        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        assert_eq!(events[0].points, 0);
        assert_eq!(fx.ledger.player(0).unwrap().score, 0);
        // The meeple still comes home.
        assert_eq!(fx.ledger.meeples_on_board(0), 0);
    }

    #[test]
    fn test_cloister_pays_nine_when_surrounded() {
        let mut fx = Fixture::new(1);
        let nodes = fx.place(Coord::ORIGIN, PLAIN_CLOISTER, 0);
        fx.claim(0, nodes[0]);

        // Surround the cloister; board-level occupancy is all that matters.
        let ring = Coord::ORIGIN.neighbors8();
        for (i, c) in ring.into_iter().enumerate() {
            fx.board.place(c, PlacedTile { tile: PLAIN_CLOISTER, rotation: 0 });
            let candidates = fx.graph.cloisters_near(c);
            let events =
                check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &candidates);
            if i < 7 {
                assert!(events.is_empty());
            } else {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].points, 9);
            }
        }
        assert_eq!(fx.ledger.player(0).unwrap().score, 9);
    }

    #[test]
    fn test_partial_cloister_at_endgame() {
        let mut fx = Fixture::new(1);
        let nodes = fx.place(Coord::ORIGIN, PLAIN_CLOISTER, 0);
        fx.claim(0, nodes[0]);
        fx.board
            .place(Coord::new(1, 0), PlacedTile { tile: PLAIN_CLOISTER, rotation: 0 });
        fx.board
            .place(Coord::new(1, 1), PlacedTile { tile: PLAIN_CLOISTER, rotation: 0 });

        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        // Cloister tile plus two neighbors.
        assert_eq!(events[0].points, 3);
    }

    #[test]
    fn test_field_pays_per_completed_city() {
        let mut fx = Fixture::new(1);
        // Starting tile: city north, field south of the road.
        let start = fx.place(Coord::ORIGIN, 0, 0);
        fx.claim(0, start[2]);

        // Complete the city above.
        let cap = fx.place(Coord::new(0, 1), CITY_ONE_SIDE, 2);
        check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &cap);
        assert!(fx.graph.region(start[0]).closed);

        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        let field: Vec<_> = events
            .iter()
            .filter(|e| e.kind == FeatureKind::Field)
            .collect();
        assert_eq!(field.len(), 1);
        assert_eq!(field[0].points, 3);
        assert_eq!(fx.ledger.player(0).unwrap().score, 3);
    }

    #[test]
    fn test_field_ignores_open_city() {
        let mut fx = Fixture::new(1);
        let start = fx.place(Coord::ORIGIN, 0, 0);
        fx.claim(0, start[2]);

        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        let field = events.iter().find(|e| e.kind == FeatureKind::Field).unwrap();
        assert_eq!(field.points, 0);
    }

    #[test]
    fn test_city_half_value_at_endgame() {
        let mut fx = Fixture::new(1);
        let nodes = fx.place(Coord::ORIGIN, CITY_ONE_SIDE, 0);
        fx.claim(0, nodes[0]);
        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        // One city tile: full value 2, halved to 1.
        assert_eq!(events[0].points, 1);
    }

    #[test]
    fn test_endgame_skips_paid_regions() {
        let mut fx = Fixture::new(1);
        fx.place(Coord::ORIGIN, CITY_ONE_SIDE, 0);
        let second = fx.place(Coord::new(0, 1), CITY_ONE_SIDE, 2);
        let first_node = fx.graph.instance(Coord::ORIGIN, 0).unwrap();
        fx.claim(0, first_node);

        check_closures(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules, &second);
        assert_eq!(fx.ledger.player(0).unwrap().score, 4);

        let events = end_game(&mut fx.graph, &fx.board, &mut fx.ledger, &fx.rules);
        assert!(events.iter().all(|e| e.kind != FeatureKind::City));
        assert_eq!(fx.ledger.player(0).unwrap().score, 4);
    }
}
