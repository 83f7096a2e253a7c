//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the geometric vocabulary the board generator works in:
//! - `HexCoord`: identifies individual hex tiles
//! - `CornerKey`: identifies a corner by the three hexes that meet there
//! - `SideKey`: identifies a side by the two hexes it separates
//!
//! Corners and sides are keyed by the (sorted) hexes that touch them, so the
//! same corner reached from any of its hexes produces an identical key. The
//! keys only exist while the board is being built; afterwards everything is
//! addressed by the integer ids in [`crate::board`].

use serde::{Deserialize, Serialize};

/// Direction of a neighbouring hex, counter-clockwise starting from East.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// All directions in counter-clockwise order starting from East
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third cube coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes, in [`HexDirection::ALL`] order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: HexDirection) -> HexCoord {
        match direction {
            HexDirection::East => HexCoord::new(self.q + 1, self.r),
            HexDirection::NorthEast => HexCoord::new(self.q + 1, self.r - 1),
            HexDirection::NorthWest => HexCoord::new(self.q, self.r - 1),
            HexDirection::West => HexCoord::new(self.q - 1, self.r),
            HexDirection::SouthWest => HexCoord::new(self.q - 1, self.r + 1),
            HexDirection::SouthEast => HexCoord::new(self.q, self.r + 1),
        }
    }

    /// Move `steps` hexes in one direction
    fn step(&self, direction: HexDirection, steps: i32) -> HexCoord {
        let unit = HexCoord::new(0, 0).neighbor(direction);
        HexCoord::new(self.q + unit.q * steps, self.r + unit.r * steps)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// The hexes exactly `radius` steps away, walking counter-clockwise from
    /// the south-west corner of the ring.
    pub fn ring(&self, radius: u32) -> Vec<HexCoord> {
        if radius == 0 {
            return vec![*self];
        }
        let radius = radius as i32;
        let mut ring = Vec::with_capacity(6 * radius as usize);
        let mut hex = self.step(HexDirection::SouthWest, radius);
        for dir in HexDirection::ALL {
            for _ in 0..radius {
                ring.push(hex);
                hex = hex.neighbor(dir);
            }
        }
        ring
    }

    /// All hexes within `radius`, center first then ring by ring
    pub fn spiral(&self, radius: u32) -> Vec<HexCoord> {
        (0..=radius).flat_map(|k| self.ring(k)).collect()
    }

    /// The six corners of this hex, counter-clockwise.
    ///
    /// Corner `i` sits between the neighbours in directions `i` and `i + 1`.
    pub fn corners(&self) -> [CornerKey; 6] {
        let n = self.neighbors();
        [0, 1, 2, 3, 4, 5].map(|i| CornerKey::new(*self, n[i], n[(i + 1) % 6]))
    }

    /// The six sides of this hex, one per neighbour, in [`HexDirection::ALL`] order
    pub fn sides(&self) -> [SideKey; 6] {
        self.neighbors().map(|n| SideKey::new(*self, n))
    }

    /// Convert to pixel coordinates (center of hex).
    /// Uses pointy-top orientation with the given hex size (radius)
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let x = hex_size * (3.0_f64.sqrt() * self.q as f64 + 3.0_f64.sqrt() / 2.0 * self.r as f64);
        let y = hex_size * (3.0 / 2.0 * self.r as f64);
        (x, y)
    }
}

/// A hex corner, keyed by the three hexes that meet there (sorted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CornerKey([HexCoord; 3]);

impl CornerKey {
    fn new(a: HexCoord, b: HexCoord, c: HexCoord) -> Self {
        let mut hexes = [a, b, c];
        hexes.sort();
        Self(hexes)
    }

    /// The three hexes touching this corner (some may be off the board)
    pub fn hexes(&self) -> [HexCoord; 3] {
        self.0
    }

    /// Pixel position of the corner: the centroid of its three hexes
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let (sx, sy) = self.0.iter().fold((0.0, 0.0), |(ax, ay), h| {
            let (x, y) = h.to_pixel(hex_size);
            (ax + x, ay + y)
        });
        (sx / 3.0, sy / 3.0)
    }
}

/// A hex side, keyed by the two hexes it separates (sorted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SideKey([HexCoord; 2]);

impl SideKey {
    fn new(a: HexCoord, b: HexCoord) -> Self {
        if a <= b {
            Self([a, b])
        } else {
            Self([b, a])
        }
    }

    /// The two hexes sharing this side
    pub fn hexes(&self) -> [HexCoord; 2] {
        self.0
    }

    /// The two corners at the ends of this side
    pub fn endpoints(&self) -> [CornerKey; 2] {
        let [a, b] = self.0;
        // The two hexes adjacent to both a and b close the two corners.
        let shared: Vec<HexCoord> = a
            .neighbors()
            .into_iter()
            .filter(|h| h.distance_to(&b) == 1)
            .collect();
        [
            CornerKey::new(a, b, shared[0]),
            CornerKey::new(a, b, shared[1]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::new(0, 0);
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        assert_eq!(a.distance_to(&HexCoord::new(2, -1)), 2);
        assert_eq!(a.distance_to(&HexCoord::new(-3, 3)), 3);
    }

    #[test]
    fn test_spiral_sizes() {
        let center = HexCoord::new(0, 0);
        assert_eq!(center.spiral(0).len(), 1);
        assert_eq!(center.spiral(1).len(), 7);
        assert_eq!(center.spiral(2).len(), 19);

        let unique: HashSet<_> = center.spiral(2).into_iter().collect();
        assert_eq!(unique.len(), 19);
        assert!(unique.iter().all(|h| h.distance_to(&center) <= 2));
    }

    #[test]
    fn test_ring_is_at_radius() {
        let center = HexCoord::new(0, 0);
        let ring = center.ring(2);
        assert_eq!(ring.len(), 12);
        assert!(ring.iter().all(|h| h.distance_to(&center) == 2));
    }

    #[test]
    fn test_corner_shared_between_hexes() {
        // The corner between (0,0), its East and NorthEast neighbours must be
        // the same key whichever of the three hexes we start from.
        let a = HexCoord::new(0, 0);
        let from_a = a.corners();
        let east = a.neighbor(HexDirection::East);
        let from_east = east.corners();

        let shared: Vec<_> = from_a.iter().filter(|c| from_east.contains(c)).collect();
        assert_eq!(shared.len(), 2, "Adjacent hexes share exactly two corners");
    }

    #[test]
    fn test_side_endpoints_are_corners_of_both_hexes() {
        let a = HexCoord::new(0, 0);
        for side in a.sides() {
            let [h1, h2] = side.hexes();
            for corner in side.endpoints() {
                assert!(h1.corners().contains(&corner));
                assert!(h2.corners().contains(&corner));
            }
        }
    }

    #[test]
    fn test_corner_pixel_is_on_hex_boundary() {
        let hex = HexCoord::new(1, -1);
        let (cx, cy) = hex.to_pixel(1.0);
        for corner in hex.corners() {
            let (x, y) = corner.to_pixel(1.0);
            let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            assert!((dist - 1.0).abs() < 1e-9, "Corner should be one radius away");
        }
    }
}
