//! Adjacency queries and placement rules over a generated board.
//!
//! All lookups go through the adjacency tables written onto the entities by
//! the generator; nothing here derives relationships from coordinates.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::board::{Board, Building, EdgeId, HexId, PlayerId, PortKind, Resource, VertexId};

impl Board {
    // ==================== Adjacency ====================

    /// Land hexes touching a vertex
    pub fn hexes_of_vertex(&self, vertex: VertexId) -> &[HexId] {
        self.vertex(vertex).map(|v| v.hexes.as_slice()).unwrap_or(&[])
    }

    /// Land hexes bordering an edge
    pub fn hexes_of_edge(&self, edge: EdgeId) -> &[HexId] {
        self.edge(edge).map(|e| e.hexes.as_slice()).unwrap_or(&[])
    }

    /// Corners of a hex
    pub fn vertices_of_hex(&self, hex: HexId) -> Vec<VertexId> {
        self.hex(hex).map(|h| h.vertices.to_vec()).unwrap_or_default()
    }

    /// Sides of a hex
    pub fn edges_of_hex(&self, hex: HexId) -> Vec<EdgeId> {
        self.hex(hex).map(|h| h.edges.to_vec()).unwrap_or_default()
    }

    /// Edges ending at a vertex
    pub fn edges_of_vertex(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertex(vertex).map(|v| v.edges.as_slice()).unwrap_or(&[])
    }

    /// Vertices one edge away
    pub fn neighbors_of_vertex(&self, vertex: VertexId) -> &[VertexId] {
        self.vertex(vertex).map(|v| v.neighbors.as_slice()).unwrap_or(&[])
    }

    /// Every building on a corner of the hex
    pub fn buildings_adjacent_to_hex(&self, hex: HexId) -> Vec<(VertexId, Building)> {
        self.vertices_of_hex(hex)
            .into_iter()
            .filter_map(|v| self.building_at(v).map(|b| (v, b)))
            .collect()
    }

    /// Owners of buildings around a hex, in id order without repeats
    pub fn players_adjacent_to_hex(&self, hex: HexId) -> Vec<PlayerId> {
        let owners: BTreeSet<PlayerId> = self
            .buildings_adjacent_to_hex(hex)
            .into_iter()
            .map(|(_, b)| b.owner)
            .collect();
        owners.into_iter().collect()
    }

    // ==================== Production ====================

    /// Resources produced by a dice sum as `(player, resource, amount)`.
    ///
    /// Hexes under the robber produce nothing; cities count double. Entries
    /// are aggregated per player and resource and sorted.
    pub fn production_for_roll(&self, sum: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut totals: BTreeMap<(PlayerId, Resource), u32> = BTreeMap::new();
        for hex in self.hexes().filter(|h| h.produces_on(sum)) {
            let Some(resource) = hex.resource() else {
                continue;
            };
            for (_, building) in self.buildings_adjacent_to_hex(hex.id) {
                *totals.entry((building.owner, resource)).or_insert(0) +=
                    building.kind.resource_multiplier();
            }
        }
        totals
            .into_iter()
            .map(|((player, resource), amount)| (player, resource, amount))
            .collect()
    }

    /// One card per producing hex around a vertex (second setup settlement)
    pub fn starting_resources(&self, vertex: VertexId) -> Vec<Resource> {
        self.hexes_of_vertex(vertex)
            .iter()
            .filter_map(|h| self.hex(*h).and_then(|hex| hex.resource()))
            .collect()
    }

    // ==================== Placement Rules ====================

    /// No building on the vertex or on any vertex one edge away
    pub fn satisfies_distance_rule(&self, vertex: VertexId) -> bool {
        self.building_at(vertex).is_none()
            && self
                .neighbors_of_vertex(vertex)
                .iter()
                .all(|n| self.building_at(*n).is_none())
    }

    /// A vertex joins the network when one of the player's roads ends there
    pub fn vertex_connected(&self, vertex: VertexId, player: PlayerId) -> bool {
        self.edges_of_vertex(vertex)
            .iter()
            .any(|e| self.road_at(*e) == Some(player))
    }

    /// An edge joins the network through an endpoint holding the player's
    /// building, or through another of the player's roads at an endpoint not
    /// occupied by an opponent.
    pub fn edge_connected(&self, edge: EdgeId, player: PlayerId) -> bool {
        let Some(edge) = self.edge(edge) else {
            return false;
        };
        edge.vertices.iter().any(|&end| match self.building_at(end) {
            Some(b) if b.owner == player => true,
            Some(_) => false,
            None => self
                .edges_of_vertex(end)
                .iter()
                .any(|e| *e != edge.id && self.road_at(*e) == Some(player)),
        })
    }

    /// Vertices where the player could put a settlement
    pub fn valid_settlement_spots(&self, player: PlayerId, is_setup: bool) -> Vec<VertexId> {
        self.vertices()
            .filter(|v| {
                self.satisfies_distance_rule(v.id) && (is_setup || self.vertex_connected(v.id, player))
            })
            .map(|v| v.id)
            .collect()
    }

    /// Empty edges connected to the player's network
    pub fn valid_road_spots(&self, player: PlayerId) -> Vec<EdgeId> {
        self.edges()
            .filter(|e| e.road.is_none() && self.edge_connected(e.id, player))
            .map(|e| e.id)
            .collect()
    }

    /// Empty edges touching a just-placed setup settlement
    pub fn setup_road_spots(&self, settlement: VertexId) -> Vec<EdgeId> {
        self.edges_of_vertex(settlement)
            .iter()
            .copied()
            .filter(|e| self.road_at(*e).is_none())
            .collect()
    }

    /// The player's settlements, which can be upgraded
    pub fn valid_city_spots(&self, player: PlayerId) -> Vec<VertexId> {
        self.vertices()
            .filter(|v| v.building == Some(Building::settlement(player)))
            .map(|v| v.id)
            .collect()
    }

    // ==================== Ports ====================

    /// Ports the player has a building on, without repeats
    pub fn player_ports(&self, player: PlayerId) -> Vec<PortKind> {
        let mut kinds = Vec::new();
        for port in self.ports() {
            let owned = port
                .vertices
                .iter()
                .any(|v| self.building_at(*v).is_some_and(|b| b.owner == player));
            if owned && !kinds.contains(&port.kind) {
                kinds.push(port.kind);
            }
        }
        kinds
    }

    /// Best maritime rate the player gets for giving `resource`
    pub fn maritime_rate(&self, player: PlayerId, resource: Resource, bank_ratio: u32) -> u32 {
        self.player_ports(player)
            .into_iter()
            .filter(|k| matches!(k, PortKind::Generic) || *k == PortKind::Specific(resource))
            .map(|k| k.rate())
            .fold(bank_ratio, u32::min)
    }

    // ==================== Longest Road ====================

    /// Length of the player's longest road.
    ///
    /// Depth-first search from every vertex the player's roads touch; a path
    /// never reuses an edge and may not pass through a vertex holding an
    /// opponent's building (it may end there).
    pub fn longest_road(&self, player: PlayerId) -> u32 {
        let starts: BTreeSet<VertexId> = self
            .edges()
            .filter(|e| e.road == Some(player))
            .flat_map(|e| e.vertices)
            .collect();

        let mut used = HashSet::new();
        starts
            .into_iter()
            .map(|v| self.walk_road(player, v, &mut used))
            .max()
            .unwrap_or(0)
    }

    fn walk_road(&self, player: PlayerId, at: VertexId, used: &mut HashSet<EdgeId>) -> u32 {
        let mut best = 0;
        for &edge_id in self.edges_of_vertex(at) {
            if used.contains(&edge_id) || self.road_at(edge_id) != Some(player) {
                continue;
            }
            let Some(edge) = self.edge(edge_id) else {
                continue;
            };
            let next = edge.other_end(at);

            used.insert(edge_id);
            let blocked = self.building_at(next).is_some_and(|b| b.owner != player);
            let further = if blocked {
                0
            } else {
                self.walk_road(player, next, used)
            };
            used.remove(&edge_id);

            best = best.max(1 + further);
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Terrain;
    use crate::generator::generate;
    use crate::settings::GameSettings;

    fn board() -> Board {
        let settings = GameSettings {
            randomize_board: false,
            ..GameSettings::default()
        };
        generate(&settings, 0).unwrap()
    }

    /// A simple path of `len` edges starting at `start`, never revisiting a vertex
    fn path(board: &Board, start: VertexId, len: usize) -> Vec<EdgeId> {
        let mut seen = vec![start];
        let mut at = start;
        let mut edges = Vec::new();
        while edges.len() < len {
            let (edge, next) = board
                .edges_of_vertex(at)
                .iter()
                .map(|e| (*e, board.edge(*e).unwrap().other_end(at)))
                .find(|(_, next)| !seen.contains(next))
                .expect("board too small for path");
            edges.push(edge);
            seen.push(next);
            at = next;
        }
        edges
    }

    fn end_of(board: &Board, start: VertexId, edges: &[EdgeId]) -> VertexId {
        edges
            .iter()
            .fold(start, |at, e| board.edge(*e).unwrap().other_end(at))
    }

    #[test]
    fn test_vertex_hex_adjacency_is_symmetric() {
        let board = board();
        for hex in board.hexes() {
            for v in board.vertices_of_hex(hex.id) {
                assert!(board.hexes_of_vertex(v).contains(&hex.id));
            }
            for e in board.edges_of_hex(hex.id) {
                assert!(board.hexes_of_edge(e).contains(&hex.id));
            }
        }
    }

    #[test]
    fn test_distance_rule() {
        let mut board = board();
        let vertex = VertexId(0);
        assert!(board.satisfies_distance_rule(vertex));

        board.place_building(vertex, Building::settlement(0));
        assert!(!board.satisfies_distance_rule(vertex));
        for n in board.neighbors_of_vertex(vertex).to_vec() {
            assert!(
                !board.satisfies_distance_rule(n),
                "Adjacent vertex should fail distance rule"
            );
        }
    }

    #[test]
    fn test_road_connectivity() {
        let mut board = board();
        let vertex = VertexId(0);
        board.place_building(vertex, Building::settlement(0));

        let valid = board.valid_road_spots(0);
        for edge in board.edges_of_vertex(vertex) {
            assert!(valid.contains(edge), "Road next to own settlement is connected");
        }
        assert!(board.valid_road_spots(1).is_empty());

        let first = board.edges_of_vertex(vertex)[0];
        board.place_road(first, 0);
        let far = board.edge(first).unwrap().other_end(vertex);
        assert!(board.vertex_connected(far, 0));
        assert!(!board.vertex_connected(far, 1));
    }

    #[test]
    fn test_opponent_building_blocks_connection() {
        let mut board = board();
        let start = VertexId(0);
        let edges = path(&board, start, 2);
        board.place_road(edges[0], 0);
        let middle = end_of(&board, start, &edges[..1]);

        assert!(board.edge_connected(edges[1], 0));
        board.place_building(middle, Building::settlement(1));
        assert!(!board.edge_connected(edges[1], 0));
    }

    #[test]
    fn test_settlement_spots_require_road_outside_setup() {
        let mut board = board();
        assert_eq!(board.valid_settlement_spots(0, true).len(), 54);
        assert!(board.valid_settlement_spots(0, false).is_empty());

        let start = VertexId(0);
        board.place_building(start, Building::settlement(0));
        for e in path(&board, start, 2) {
            board.place_road(e, 0);
        }
        let spots = board.valid_settlement_spots(0, false);
        assert_eq!(spots.len(), 1);
    }

    #[test]
    fn test_production_for_roll() {
        let mut board = board();
        let hex = board
            .hexes()
            .find(|h| h.terrain == Terrain::Fields && h.token.is_some())
            .unwrap()
            .clone();
        let sum = hex.token.unwrap();
        board.place_building(hex.vertices[0], Building::settlement(0));
        board.place_building(hex.vertices[3], Building::city(1));

        let production = board.production_for_roll(sum);
        assert!(production.contains(&(0, Resource::Wheat, 1)));
        assert!(production.contains(&(1, Resource::Wheat, 2)));
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = board();
        let hex = board.hexes().find(|h| h.token == Some(6)).unwrap().clone();
        let resource = hex.resource().unwrap();
        board.place_building(hex.vertices[0], Building::settlement(0));

        let produced = |board: &Board| {
            board
                .production_for_roll(6)
                .into_iter()
                .find(|(p, r, _)| *p == 0 && *r == resource)
                .map(|(_, _, n)| n)
                .unwrap_or(0)
        };
        let before = produced(&board);
        assert!(before >= 1);

        board.move_robber(hex.id);
        assert_eq!(produced(&board), before - 1, "Robbed hex should not produce");
    }

    #[test]
    fn test_players_adjacent_to_hex() {
        let mut board = board();
        let hex = board.hex(HexId(0)).unwrap().clone();
        board.place_building(hex.vertices[0], Building::settlement(2));
        board.place_building(hex.vertices[2], Building::settlement(1));
        board.place_building(hex.vertices[4], Building::city(2));
        assert_eq!(board.players_adjacent_to_hex(hex.id), vec![1, 2]);
        assert_eq!(board.buildings_adjacent_to_hex(hex.id).len(), 3);
    }

    #[test]
    fn test_longest_road_chain() {
        let mut board = board();
        assert_eq!(board.longest_road(0), 0);

        let edges = path(&board, VertexId(0), 6);
        board.place_road(edges[0], 0);
        assert_eq!(board.longest_road(0), 1);

        for e in &edges[1..] {
            board.place_road(*e, 0);
        }
        assert_eq!(board.longest_road(0), 6);
    }

    #[test]
    fn test_longest_road_branch_counts_longest_arm() {
        let mut board = board();
        let start = VertexId(0);
        let trunk = path(&board, start, 4);
        for e in &trunk {
            board.place_road(*e, 0);
        }
        // A one-edge spur off the second vertex does not lengthen the road
        let junction = end_of(&board, start, &trunk[..1]);
        let spur = board
            .edges_of_vertex(junction)
            .iter()
            .copied()
            .find(|e| !trunk.contains(e));
        if let Some(spur) = spur {
            board.place_road(spur, 0);
        }
        assert_eq!(board.longest_road(0), 4);
    }

    #[test]
    fn test_longest_road_cut_by_opponent_settlement() {
        let mut board = board();
        let start = VertexId(0);
        let edges = path(&board, start, 5);
        for e in &edges {
            board.place_road(*e, 0);
        }
        assert_eq!(board.longest_road(0), 5);

        let cut = end_of(&board, start, &edges[..2]);
        board.place_building(cut, Building::settlement(1));
        assert_eq!(board.longest_road(0), 3);
        assert_eq!(board.longest_road(1), 0);
    }

    #[test]
    fn test_longest_road_around_a_hex() {
        let mut board = board();
        let hex = board.hex(HexId(0)).unwrap().clone();
        for e in hex.edges {
            board.place_road(e, 0);
        }
        assert_eq!(board.longest_road(0), 6);
    }

    #[test]
    fn test_port_access() {
        let mut board = board();
        let port = *board.ports().iter().next().unwrap();
        assert!(board.player_ports(0).is_empty());

        board.place_building(port.vertices[0], Building::settlement(0));
        assert_eq!(board.player_ports(0), vec![port.kind]);

        let expected = match port.kind {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        };
        let resource = match port.kind {
            PortKind::Specific(r) => r,
            PortKind::Generic => Resource::Ore,
        };
        assert_eq!(board.maritime_rate(0, resource, 4), expected);
        assert_eq!(board.maritime_rate(1, resource, 4), 4);
    }

    #[test]
    fn test_starting_resources_skip_desert() {
        let board = board();
        let desert = board.hex(board.robber()).unwrap();
        let vertex = desert.vertices[0];
        let resources = board.starting_resources(vertex);
        assert_eq!(resources.len(), board.hexes_of_vertex(vertex).len() - 1);
    }
}
