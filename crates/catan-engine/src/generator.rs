//! Board generation.
//!
//! Hexes are laid out in a spiral from the center. Vertices and edges are
//! derived from hex corners and sides and numbered in discovery order, and
//! every adjacency table the rules need is written onto the entities here,
//! once. Terrain and number tokens are dealt from fixed multisets; with
//! `randomize_board` they are shuffled with a stream derived from the seed,
//! so the same seed always yields the same board.

use im::{OrdMap, Vector};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::board::{Board, Edge, EdgeId, Hex, HexId, Port, PortKind, Terrain, Vertex, VertexId};
use crate::error::BoardError;
use crate::hex::{CornerKey, HexCoord, SideKey};
use crate::rng;
use crate::settings::{BoardLayout, GameSettings};

/// Radius of the standard board
pub const STANDARD_RADIUS: u32 = 2;

/// Standard number tokens: 2 and 12 once, 3-6 and 8-11 twice
pub const STANDARD_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Fixed beginner terrain, in spiral order (desert in the middle)
const BEGINNER_TERRAINS: [Terrain; 19] = [
    Terrain::Desert,
    Terrain::Forest,
    Terrain::Pasture,
    Terrain::Fields,
    Terrain::Hills,
    Terrain::Mountains,
    Terrain::Forest,
    Terrain::Pasture,
    Terrain::Fields,
    Terrain::Hills,
    Terrain::Mountains,
    Terrain::Forest,
    Terrain::Pasture,
    Terrain::Fields,
    Terrain::Hills,
    Terrain::Mountains,
    Terrain::Forest,
    Terrain::Pasture,
    Terrain::Fields,
];

/// Fixed beginner tokens, dealt onto the non-desert hexes in spiral order
const BEGINNER_TOKENS: [u8; 18] = [5, 2, 8, 3, 6, 10, 9, 12, 11, 4, 8, 10, 9, 4, 5, 6, 3, 11];

/// Number of ports placed around the coast
const PORT_COUNT: usize = 9;

const MAX_TOKEN_ATTEMPTS: usize = 100;

/// Largest radius whose edge count (9r^2 + 15r + 6) still fits a 16-bit id
pub const MAX_RADIUS: u32 = 84;

/// Build a board from the settings
pub fn generate(settings: &GameSettings, seed: u64) -> Result<Board, BoardError> {
    let (radius, mut terrains, mut tokens) = match &settings.board_layout {
        BoardLayout::Standard if settings.randomize_board => (
            STANDARD_RADIUS,
            Terrain::standard_set(),
            STANDARD_TOKENS.to_vec(),
        ),
        BoardLayout::Standard => (
            STANDARD_RADIUS,
            BEGINNER_TERRAINS.to_vec(),
            BEGINNER_TOKENS.to_vec(),
        ),
        BoardLayout::Custom(custom) => (custom.radius, custom.terrains.clone(), custom.tokens.clone()),
    };

    if radius == 0 {
        return Err(BoardError::EmptyLayout);
    }
    if radius > MAX_RADIUS {
        return Err(BoardError::TooLarge {
            radius,
            max: MAX_RADIUS,
        });
    }
    let coords = HexCoord::new(0, 0).spiral(radius);
    check_multisets(coords.len(), &terrains, &tokens)?;

    let mut ports = PortKind::standard_set();
    if settings.randomize_board {
        let mut rng = rng::setup_stream(seed);
        terrains.shuffle(&mut rng);
        ports.shuffle(&mut rng);
        tokens = deal_tokens(&coords, &terrains, &tokens, &mut rng);
    }

    let board = build(&coords, &terrains, &tokens, &ports);
    debug!(
        "Generated board: {} hexes, {} vertices, {} edges (seed {})",
        board.hex_count(),
        board.vertices().count(),
        board.edges().count(),
        seed
    );
    Ok(board)
}

fn check_multisets(hexes: usize, terrains: &[Terrain], tokens: &[u8]) -> Result<(), BoardError> {
    if terrains.len() != hexes {
        return Err(BoardError::TerrainCountMismatch {
            hexes,
            terrains: terrains.len(),
        });
    }
    let deserts = terrains.iter().filter(|t| **t == Terrain::Desert).count();
    if deserts != 1 {
        return Err(BoardError::DesertCount(deserts));
    }
    if tokens.len() != hexes - deserts {
        return Err(BoardError::TokenCountMismatch {
            producing: hexes - deserts,
            tokens: tokens.len(),
        });
    }
    if let Some(bad) = tokens.iter().find(|t| !(2..=12).contains(*t) || **t == 7) {
        return Err(BoardError::InvalidToken(*bad));
    }
    Ok(())
}

/// Shuffle tokens, retrying to keep 6 and 8 off neighbouring hexes
fn deal_tokens<R: Rng>(
    coords: &[HexCoord],
    terrains: &[Terrain],
    tokens: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    let producing: Vec<HexCoord> = coords
        .iter()
        .zip(terrains)
        .filter(|(_, t)| **t != Terrain::Desert)
        .map(|(c, _)| *c)
        .collect();

    let mut shuffled = tokens.to_vec();
    for _ in 0..MAX_TOKEN_ATTEMPTS {
        shuffled.shuffle(rng);
        if !has_adjacent_red_numbers(&producing, &shuffled) {
            return shuffled;
        }
    }

    warn!(
        "No token layout without adjacent 6/8 after {} attempts, keeping the last shuffle",
        MAX_TOKEN_ATTEMPTS
    );
    shuffled
}

fn has_adjacent_red_numbers(coords: &[HexCoord], tokens: &[u8]) -> bool {
    let by_coord: HashMap<HexCoord, u8> = coords.iter().copied().zip(tokens.iter().copied()).collect();
    let is_red = |n: u8| n == 6 || n == 8;

    by_coord.iter().any(|(coord, &number)| {
        is_red(number)
            && coord
                .neighbors()
                .iter()
                .any(|n| by_coord.get(n).is_some_and(|&other| is_red(other)))
    })
}

fn build(coords: &[HexCoord], terrains: &[Terrain], tokens: &[u8], port_kinds: &[PortKind]) -> Board {
    let hex_ids: HashMap<HexCoord, HexId> = coords
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, HexId(i as u16)))
        .collect();

    // Corners -> vertices
    let mut corner_ids: BTreeMap<CornerKey, VertexId> = BTreeMap::new();
    let mut vertex_hexes: Vec<Vec<HexId>> = Vec::new();
    let mut hex_vertices: Vec<[VertexId; 6]> = Vec::with_capacity(coords.len());
    for (i, coord) in coords.iter().enumerate() {
        let corners = coord.corners().map(|corner| {
            *corner_ids.entry(corner).or_insert_with(|| {
                vertex_hexes.push(Vec::new());
                VertexId((vertex_hexes.len() - 1) as u16)
            })
        });
        for v in corners {
            vertex_hexes[v.0 as usize].push(HexId(i as u16));
        }
        hex_vertices.push(corners);
    }

    // Sides -> edges
    let mut side_ids: BTreeMap<SideKey, EdgeId> = BTreeMap::new();
    let mut edge_sides: Vec<SideKey> = Vec::new();
    let mut edge_ends: Vec<[VertexId; 2]> = Vec::new();
    let mut edge_hexes: Vec<Vec<HexId>> = Vec::new();
    let mut hex_edges: Vec<[EdgeId; 6]> = Vec::with_capacity(coords.len());
    for (i, coord) in coords.iter().enumerate() {
        let sides = coord.sides().map(|side| {
            *side_ids.entry(side).or_insert_with(|| {
                edge_sides.push(side);
                edge_ends.push(side.endpoints().map(|corner| corner_ids[&corner]));
                edge_hexes.push(Vec::new());
                EdgeId((edge_ends.len() - 1) as u16)
            })
        });
        for e in sides {
            edge_hexes[e.0 as usize].push(HexId(i as u16));
        }
        hex_edges.push(sides);
    }

    let mut vertex_edges: Vec<Vec<EdgeId>> = vec![Vec::new(); vertex_hexes.len()];
    let mut vertex_neighbors: Vec<Vec<VertexId>> = vec![Vec::new(); vertex_hexes.len()];
    for (i, [a, b]) in edge_ends.iter().enumerate() {
        vertex_edges[a.0 as usize].push(EdgeId(i as u16));
        vertex_edges[b.0 as usize].push(EdgeId(i as u16));
        vertex_neighbors[a.0 as usize].push(*b);
        vertex_neighbors[b.0 as usize].push(*a);
    }

    // Hexes, dealing tokens in placement order
    let mut hexes = OrdMap::new();
    let mut remaining_tokens = tokens.iter().copied();
    let mut robber = HexId(0);
    for (i, coord) in coords.iter().enumerate() {
        let id = hex_ids[coord];
        let terrain = terrains[i];
        let is_desert = terrain == Terrain::Desert;
        if is_desert {
            robber = id;
        }
        hexes.insert(
            id,
            Hex {
                id,
                coord: *coord,
                terrain,
                token: if is_desert { None } else { remaining_tokens.next() },
                has_robber: is_desert,
                vertices: hex_vertices[i],
                edges: hex_edges[i],
            },
        );
    }

    // Ports on evenly spaced coastal edges, walking around the coast
    let mut coastal: Vec<(f64, usize)> = edge_hexes
        .iter()
        .enumerate()
        .filter(|(_, hexes)| hexes.len() == 1)
        .map(|(i, _)| {
            let [a, b] = edge_sides[i].endpoints();
            let (ax, ay) = a.to_pixel(1.0);
            let (bx, by) = b.to_pixel(1.0);
            (((ay + by) / 2.0).atan2((ax + bx) / 2.0), i)
        })
        .collect();
    coastal.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut vertex_ports: Vec<Option<PortKind>> = vec![None; vertex_hexes.len()];
    let mut ports = Vector::new();
    let port_count = PORT_COUNT.min(coastal.len());
    for (n, kind) in port_kinds.iter().take(port_count).enumerate() {
        let (_, edge_index) = coastal[n * coastal.len() / port_count];
        let ends = edge_ends[edge_index];
        for v in ends {
            vertex_ports[v.0 as usize] = Some(*kind);
        }
        ports.push_back(Port {
            kind: *kind,
            vertices: ends,
        });
    }

    let mut vertices = OrdMap::new();
    for (i, hexes) in vertex_hexes.into_iter().enumerate() {
        let id = VertexId(i as u16);
        vertices.insert(
            id,
            Vertex {
                id,
                hexes,
                edges: vertex_edges[i].clone(),
                neighbors: vertex_neighbors[i].clone(),
                building: None,
                port: vertex_ports[i],
            },
        );
    }

    let mut edges = OrdMap::new();
    for (i, hexes) in edge_hexes.into_iter().enumerate() {
        let id = EdgeId(i as u16);
        edges.insert(
            id,
            Edge {
                id,
                vertices: edge_ends[i],
                hexes,
                road: None,
            },
        );
    }

    Board::from_parts(hexes, vertices, edges, ports, robber)
}
