//! Cross-tile feature connectivity.
//!
//! Every feature of every placed tile becomes a node in an arena; nodes are
//! united into regions by a union-find structure keyed by stable integer
//! ids, so the growing graph never holds object links. A region's root node
//! carries its accumulated data: open ends, member tiles, pennants, meeples.
//!
//! Open ends are decremented exactly once per edge-pairing event, never per
//! tile side, which keeps loop closures (a tile whose two sides join the
//! same region) from double-subtracting.

use crate::board::Board;
use crate::catalog::{Catalog, FeatureKind, TileType};
use crate::grid::{Coord, Rotation};
use crate::player::MeepleId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Stable id of a region node. Pass it through [`FeatureGraph::resolve`] to
/// reach the current root after merges.
pub type RegionId = usize;

/// Accumulated state of one connected region, held at its root node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionData {
    /// What kind of terrain this region is
    pub kind: FeatureKind,
    /// Edges still bordering unoccupied space. A City/Road region is
    /// complete when this reaches zero; meaningless for fields & cloisters.
    pub open_ends: u32,
    /// Coordinates of every tile contributing to the region
    pub tiles: BTreeSet<Coord>,
    /// Pennants printed on member city segments
    pub pennants: u32,
    /// Meeples currently standing on the region
    pub meeples: Vec<MeepleId>,
    /// For cloisters, the coordinate of the cloister tile
    pub cloister: Option<Coord>,
    /// For fields, city-feature node ids bordering the field. Stored raw and
    /// resolved at scoring time so later city merges are picked up.
    pub adjacent_cities: BTreeSet<RegionId>,
    /// Whether the region completed during play
    pub closed: bool,
    /// Whether the region has been paid out (closure or endgame)
    pub scored: bool,
}

impl RegionData {
    fn new(kind: FeatureKind, coord: Coord, open_ends: u32, pennant: bool) -> Self {
        Self {
            kind,
            open_ends,
            tiles: BTreeSet::from([coord]),
            pennants: pennant as u32,
            meeples: Vec::new(),
            cloister: (kind == FeatureKind::Cloister).then_some(coord),
            adjacent_cities: BTreeSet::new(),
            closed: false,
            scored: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    parent: usize,
    rank: u8,
    /// Present only at root nodes
    data: Option<RegionData>,
}

/// The board-wide connectivity graph of terrain features
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureGraph {
    nodes: Vec<Node>,
    /// (tile coordinate, local feature index) -> node id
    instances: HashMap<(Coord, u8), usize>,
}

impl FeatureGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Node id of a specific placed feature instance
    pub fn instance(&self, coord: Coord, feature: u8) -> Option<RegionId> {
        self.instances.get(&(coord, feature)).copied()
    }

    /// Current root of a node, without mutating (no path compression)
    pub fn resolve(&self, mut id: RegionId) -> RegionId {
        while self.nodes[id].parent != id {
            id = self.nodes[id].parent;
        }
        id
    }

    /// Current root of a node, compressing the path walked
    fn find(&mut self, id: RegionId) -> RegionId {
        let root = self.resolve(id);
        let mut cursor = id;
        while self.nodes[cursor].parent != root {
            let next = self.nodes[cursor].parent;
            self.nodes[cursor].parent = root;
            cursor = next;
        }
        root
    }

    /// Region state for the region containing `id`
    pub fn region(&self, id: RegionId) -> &RegionData {
        let root = self.resolve(id);
        self.nodes[root]
            .data
            .as_ref()
            .expect("root node carries region data")
    }

    fn region_mut(&mut self, id: RegionId) -> &mut RegionData {
        let root = self.find(id);
        self.nodes[root]
            .data
            .as_mut()
            .expect("root node carries region data")
    }

    /// Ids of all current region roots, ascending
    pub fn roots(&self) -> Vec<RegionId> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].data.is_some())
            .collect()
    }

    /// Stand a meeple on the region containing `id`
    pub fn add_meeple(&mut self, id: RegionId, meeple: MeepleId) {
        self.region_mut(id).meeples.push(meeple);
    }

    /// Take every meeple off the region containing `id`
    pub fn clear_meeples(&mut self, id: RegionId) -> Vec<MeepleId> {
        std::mem::take(&mut self.region_mut(id).meeples)
    }

    /// Mark the region containing `id` as paid out
    pub fn mark_scored(&mut self, id: RegionId, closed: bool) {
        let data = self.region_mut(id);
        data.scored = true;
        data.closed |= closed;
    }

    /// Cloister regions whose tile lies within one step (any direction) of
    /// `coord`, the cloister's own coordinate included
    pub fn cloisters_near(&self, coord: Coord) -> Vec<RegionId> {
        self.roots()
            .into_iter()
            .filter(|&r| {
                self.nodes[r]
                    .data
                    .as_ref()
                    .and_then(|d| d.cloister)
                    .is_some_and(|c| {
                        (c.x - coord.x).abs() <= 1 && (c.y - coord.y).abs() <= 1
                    })
            })
            .collect()
    }

    /// Whether placing `feature` of `tile` at `coord`/`rotation` would join
    /// a region that already carries a meeple.
    ///
    /// A pure probe: evaluated against prospective neighbors without
    /// touching the graph, so a rejected move mutates nothing.
    pub fn would_join_claimed(
        &self,
        catalog: &Catalog,
        board: &Board,
        tile: &TileType,
        coord: Coord,
        rotation: Rotation,
        feature: usize,
    ) -> bool {
        for (direction, neighbor_coord) in coord.neighbors() {
            if tile.feature_on_side(rotation, direction) != Some(feature) {
                continue;
            }
            let Some(neighbor) = board.get(neighbor_coord) else {
                continue;
            };
            let Some(neighbor_tile) = catalog.get(neighbor.tile) else {
                continue;
            };
            let Some(facing) =
                neighbor_tile.feature_on_side(neighbor.rotation, direction.opposite())
            else {
                continue;
            };
            if let Some(node) = self.instance(neighbor_coord, facing as u8) {
                if !self.region(node).meeples.is_empty() {
                    return true;
                }
            }
        }
        false
    }

    /// Local feature indices of `tile` that would still be unclaimed after
    /// placement at `coord`/`rotation` — the set eligible for a meeple this
    /// turn. Ascending, no duplicates.
    pub fn open_slots(
        &self,
        catalog: &Catalog,
        board: &Board,
        tile: &TileType,
        coord: Coord,
        rotation: Rotation,
    ) -> Vec<u8> {
        (0..tile.feature_count())
            .filter(|&f| !self.would_join_claimed(catalog, board, tile, coord, rotation, f))
            .map(|f| f as u8)
            .collect()
    }

    /// Add the freshly placed tile at `coord` to the graph: create one node
    /// per feature, then union across every occupied, kind-matching side.
    ///
    /// Merging is commutative and idempotent; re-pairing two instances that
    /// already share a root only subtracts the paired edge. Returns the
    /// node ids of this tile's features (closure candidates).
    pub fn merge_tile(&mut self, catalog: &Catalog, board: &Board, coord: Coord) -> Vec<RegionId> {
        let placed = board.get(coord).expect("tile recorded before merge");
        let tile = catalog
            .get(placed.tile)
            .expect("placed tile exists in catalog");

        // One fresh node per feature.
        let mut created = Vec::with_capacity(tile.feature_count());
        for (fi, feature) in tile.features.iter().enumerate() {
            let id = self.nodes.len();
            self.nodes.push(Node {
                parent: id,
                rank: 0,
                data: Some(RegionData::new(
                    feature.kind,
                    coord,
                    feature.edges.len() as u32,
                    feature.pennant,
                )),
            });
            self.instances.insert((coord, fi as u8), id);
            created.push(id);
        }

        // Record field-to-city adjacency as raw node ids.
        for (fi, feature) in tile.features.iter().enumerate() {
            for &ci in &feature.adjacent_cities {
                let city_node = created[ci as usize];
                self.region_mut(created[fi]).adjacent_cities.insert(city_node);
            }
        }

        // Union across each occupied side; legality already guaranteed the
        // terrain kinds match.
        for (direction, neighbor_coord) in coord.neighbors() {
            let Some(neighbor) = board.get(neighbor_coord) else {
                continue;
            };
            let Some(fi) = tile.feature_on_side(placed.rotation, direction) else {
                continue;
            };
            let neighbor_tile = catalog
                .get(neighbor.tile)
                .expect("placed tile exists in catalog");
            let Some(nfi) =
                neighbor_tile.feature_on_side(neighbor.rotation, direction.opposite())
            else {
                continue;
            };
            let ours = created[fi];
            let theirs = self
                .instance(neighbor_coord, nfi as u8)
                .expect("neighbor features registered at placement");
            self.pair(ours, theirs);
        }

        created
    }

    /// Unite the regions of two facing feature instances, retiring the
    /// paired edge from both sides' open-end counts.
    fn pair(&mut self, a: RegionId, b: RegionId) {
        let ra = self.find(a);
        let rb = self.find(b);

        if ra == rb {
            // Loop closure against itself: the edge pairing still retires
            // one open end on each side, once.
            let data = self.region_mut(ra);
            data.open_ends = data.open_ends.saturating_sub(2);
            return;
        }

        let (root, child) = if self.nodes[ra].rank >= self.nodes[rb].rank {
            (ra, rb)
        } else {
            (rb, ra)
        };
        if self.nodes[ra].rank == self.nodes[rb].rank {
            self.nodes[root].rank += 1;
        }

        let absorbed = self.nodes[child]
            .data
            .take()
            .expect("root node carries region data");
        self.nodes[child].parent = root;

        let data = self.nodes[root]
            .data
            .as_mut()
            .expect("root node carries region data");
        data.open_ends = (data.open_ends + absorbed.open_ends).saturating_sub(2);
        data.tiles.extend(absorbed.tiles);
        data.pennants += absorbed.pennants;
        data.meeples.extend(absorbed.meeples);
        data.adjacent_cities.extend(absorbed.adjacent_cities);
        data.closed |= absorbed.closed;
        data.scored |= absorbed.scored;
        if data.cloister.is_none() {
            data.cloister = absorbed.cloister;
        }
    }
}
