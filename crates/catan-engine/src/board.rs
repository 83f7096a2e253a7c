//! Game board representation including hexes, buildings, and ports.
//!
//! This module contains:
//! - Resource and terrain types
//! - Integer ids for hexes, vertices and edges
//! - Building types (settlements, cities, roads)
//! - Port trading bonuses
//! - The `Board` itself: persistent maps from id to entity plus the robber
//!
//! Adjacency is stored on the entities when the board is generated (see
//! [`crate::generator`]) and never changes afterwards; only buildings, roads
//! and the robber move. Queries over that adjacency live in [`crate::graph`].

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hex::HexCoord;

/// Player identifier (0-3 for a 4-player game, 0 is the host)
pub type PlayerId = u8;

macro_rules! board_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u16);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

board_id!(
    /// Index of a hex tile
    HexId,
    "h"
);
board_id!(
    /// Index of a vertex (corner) where settlements and cities go
    VertexId,
    "v"
);
board_id!(
    /// Index of an edge (side) where roads go
    EdgeId,
    "e"
);

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// Terrain of a hex tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Terrain {
    Forest,
    Pasture,
    Fields,
    Hills,
    Mountains,
    Desert,
}

impl Terrain {
    /// The resource this terrain produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Wood),
            Terrain::Pasture => Some(Resource::Sheep),
            Terrain::Fields => Some(Resource::Wheat),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Desert => None,
        }
    }

    /// The standard 19-tile terrain multiset
    pub fn standard_set() -> Vec<Terrain> {
        let mut set = Vec::with_capacity(19);
        set.extend(std::iter::repeat(Terrain::Forest).take(4));
        set.extend(std::iter::repeat(Terrain::Pasture).take(4));
        set.extend(std::iter::repeat(Terrain::Fields).take(4));
        set.extend(std::iter::repeat(Terrain::Hills).take(3));
        set.extend(std::iter::repeat(Terrain::Mountains).take(3));
        set.push(Terrain::Desert);
        set
    }
}

/// What kind of building stands on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingType {
    /// 1 VP, 1 resource per adjacent producing hex
    Settlement,
    /// 2 VP, 2 resources per adjacent producing hex
    City,
}

impl BuildingType {
    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        match self {
            BuildingType::Settlement => 1,
            BuildingType::City => 2,
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            BuildingType::Settlement => 1,
            BuildingType::City => 2,
        }
    }
}

/// A settlement or city and its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "type")]
    pub kind: BuildingType,
    pub owner: PlayerId,
}

impl Building {
    pub fn settlement(owner: PlayerId) -> Self {
        Self {
            kind: BuildingType::Settlement,
            owner,
        }
    }

    pub fn city(owner: PlayerId) -> Self {
        Self {
            kind: BuildingType::City,
            owner,
        }
    }
}

/// Port types for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortKind {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl PortKind {
    /// The exchange rate for this port
    pub fn rate(&self) -> u32 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }

    /// The standard nine ports: four generic, one specific per resource
    pub fn standard_set() -> Vec<PortKind> {
        let mut set = vec![PortKind::Generic; 4];
        set.extend(Resource::ALL.map(PortKind::Specific));
        set
    }
}

/// A port covering the two vertices of one coastal edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub kind: PortKind,
    pub vertices: [VertexId; 2],
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hex {
    pub id: HexId,
    /// Position on the hex grid
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Dice number that triggers production (2-12 except 7; none for desert)
    pub token: Option<u8>,
    /// Whether the robber is currently on this tile
    pub has_robber: bool,
    /// Corners, counter-clockwise
    pub vertices: [VertexId; 6],
    /// Sides, counter-clockwise
    pub edges: [EdgeId; 6],
}

impl Hex {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }

    /// Whether this hex produces on a roll of `sum`
    pub fn produces_on(&self, sum: u8) -> bool {
        self.token == Some(sum) && !self.has_robber && self.resource().is_some()
    }
}

/// A corner where settlements and cities are placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    /// Land hexes touching this vertex (1 to 3)
    pub hexes: Vec<HexId>,
    /// Edges ending at this vertex (2 or 3)
    pub edges: Vec<EdgeId>,
    /// Vertices one edge away
    pub neighbors: Vec<VertexId>,
    pub building: Option<Building>,
    pub port: Option<PortKind>,
}

/// A side where roads are placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: [VertexId; 2],
    /// Land hexes bordering this edge (1 or 2)
    pub hexes: Vec<HexId>,
    pub road: Option<PlayerId>,
}

impl Edge {
    /// The endpoint that isn't `vertex`
    pub fn other_end(&self, vertex: VertexId) -> VertexId {
        if self.vertices[0] == vertex {
            self.vertices[1]
        } else {
            self.vertices[0]
        }
    }
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(with = "crate::wire::pairs")]
    hexes: OrdMap<HexId, Hex>,
    #[serde(with = "crate::wire::pairs")]
    vertices: OrdMap<VertexId, Vertex>,
    #[serde(with = "crate::wire::pairs")]
    edges: OrdMap<EdgeId, Edge>,
    ports: Vector<Port>,
    robber: HexId,
}

impl Board {
    /// Assemble a board from generated parts
    pub(crate) fn from_parts(
        hexes: OrdMap<HexId, Hex>,
        vertices: OrdMap<VertexId, Vertex>,
        edges: OrdMap<EdgeId, Edge>,
        ports: Vector<Port>,
        robber: HexId,
    ) -> Self {
        Self {
            hexes,
            vertices,
            edges,
            ports,
            robber,
        }
    }

    // ==================== Query Methods ====================

    pub fn hex(&self, id: HexId) -> Option<&Hex> {
        self.hexes.get(&id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// All hexes in id order
    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    /// All vertices in id order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All edges in id order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn ports(&self) -> &Vector<Port> {
        &self.ports
    }

    /// Get the robber's current location
    pub fn robber(&self) -> HexId {
        self.robber
    }

    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }

    /// Building at a vertex, if any
    pub fn building_at(&self, vertex: VertexId) -> Option<Building> {
        self.vertices.get(&vertex).and_then(|v| v.building)
    }

    /// Road owner at an edge, if any
    pub fn road_at(&self, edge: EdgeId) -> Option<PlayerId> {
        self.edges.get(&edge).and_then(|e| e.road)
    }

    // ==================== Mutation Methods ====================
    //
    // These operate on a board value that has already been cloned out of the
    // previous snapshot; `im` copies only the touched path.

    /// Put a building on a vertex (assumes validation already done)
    pub fn place_building(&mut self, vertex: VertexId, building: Building) {
        let slot = self
            .vertices
            .get_mut(&vertex)
            .unwrap_or_else(|| panic!("no vertex {vertex} on this board"));
        slot.building = Some(building);
    }

    /// Place a road (assumes validation already done)
    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) {
        let slot = self
            .edges
            .get_mut(&edge)
            .unwrap_or_else(|| panic!("no edge {edge} on this board"));
        slot.road = Some(player);
    }

    /// Move the robber to a new hex
    pub fn move_robber(&mut self, to: HexId) {
        let from = self.robber;
        if let Some(hex) = self.hexes.get_mut(&from) {
            hex.has_robber = false;
        }
        let target = self
            .hexes
            .get_mut(&to)
            .unwrap_or_else(|| panic!("no hex {to} on this board"));
        target.has_robber = true;
        self.robber = to;

        let robbers = self.hexes.values().filter(|h| h.has_robber).count();
        assert_eq!(robbers, 1, "board must carry exactly one robber");
    }
}
