/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! # The Hexagon
//! A planar hexagon described by its center, the direction of its northern
//! vertex and its side length. Vertices are generated by scaling the north
//! direction and rotating it five times by pi/3, so they come out in the
//! order N, NE, SE, S, SW, NW (clockwise with y pointing north).
//!
//! The seven-way subdivision solves `M * n' = n_ne` with `M = 2*R(pi/3) + I`
//! for the child north direction `n'`; its magnitude is the child side
//! length (`side / sqrt(7)`) and the six ring children sit at the central
//! child's edge-neighbor centers.

use crate::errors::{HexGridError, HexGridResult};
use crate::point::Point;
use crate::{NUM_CHILDREN, NUM_SIDES};
use log::trace;

/// The north unit vector of the global frame. Children at even depths snap
/// back to this orientation; see [`ChildOrientation`].
pub const GLOBAL_NORTH: Point = Point { x: 0.0, y: 1.0 };

/// Orientation rule for one subdivision step.
///
/// The solved child north direction is rotated roughly 19 degrees clockwise
/// from the parent's. Alternating between keeping that computed direction
/// (odd depths) and snapping back to the global north (even depths) keeps
/// the tile aligned across levels; the alternation is part of the observable
/// tree shape and must not be changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChildOrientation {
    /// Children keep the computed `n'` direction.
    Computed,
    /// Children are built with [`GLOBAL_NORTH`].
    GlobalNorth,
}

/// The edge neighbor opposite to neighbor `i`: a hexagon is its neighbor's
/// neighbor three slots around.
pub fn opposite_neighbor(i: usize) -> usize {
    (i + 3) % NUM_SIDES
}

/// A planar hexagon in Cartesian coordinates.
#[derive(Debug, Clone)]
pub struct Hexagon {
    center: Point,
    north_unit: Point,
    side_length: f64,
    /// Scaled direction vectors from the center to each vertex, N first.
    vertex_dirs: [Point; 6],
    vertices: [Point; 6],
}

/// One clockwise rotation by pi/3.
#[inline]
fn rotate_cw(v: Point) -> Point {
    let pi_d_3 = std::f64::consts::FRAC_PI_3;
    let sin = pi_d_3.sin();
    let cos = pi_d_3.cos();
    Point::new(cos * v.x + sin * v.y, -sin * v.x + cos * v.y)
}

/// The five accumulated rotations of `v`, with `v` itself in slot 0.
#[inline]
fn rotations_of(v: Point) -> [Point; 6] {
    let mut dirs = [v; 6];
    for i in 1..NUM_SIDES {
        dirs[i] = rotate_cw(dirs[i - 1]);
    }
    dirs
}

impl Hexagon {
    /// Builds a hexagon from its center, the direction of its northern-most
    /// vertex and its side length. The direction is normalized; a zero or
    /// non-finite direction and a non-positive or non-finite side length are
    /// rejected with `InvalidGeometry`.
    pub fn new(center: Point, north_dir: Point, side_length: f64) -> HexGridResult<Hexagon> {
        if !side_length.is_finite() || side_length <= 0.0 {
            return Err(HexGridError::invalid("side length must be positive"));
        }
        if !center.is_finite() || !north_dir.is_finite() {
            return Err(HexGridError::invalid("coordinates must be finite"));
        }
        let norm = north_dir.norm();
        if norm < 1e-12 {
            return Err(HexGridError::invalid("north direction is degenerate"));
        }
        let north_unit = north_dir * (1.0 / norm);
        let vertex_dirs = rotations_of(north_unit * side_length);
        let mut vertices = [Point::default(); 6];
        for (vertex, dir) in vertices.iter_mut().zip(vertex_dirs.iter()) {
            *vertex = center + *dir;
        }
        Ok(Hexagon {
            center,
            north_unit,
            side_length,
            vertex_dirs,
            vertices,
        })
    }

    ///
    pub fn center(&self) -> Point {
        self.center
    }

    ///
    pub fn north_unit(&self) -> Point {
        self.north_unit
    }

    ///
    pub fn side_length(&self) -> f64 {
        self.side_length
    }

    /// Absolute vertex coordinates in the order N, NE, SE, S, SW, NW.
    pub fn vertices(&self) -> &[Point; 6] {
        &self.vertices
    }

    /// Point-in-convex-polygon by edge cross products. The boundary is
    /// inclusive: a point on an edge or vertex is contained. Exclusive leaf
    /// assignment is the caller's business (first containing cell in
    /// enumeration order wins). Degenerate inputs are never contained.
    pub fn contains(&self, p: Point) -> bool {
        if !p.is_finite() {
            return false;
        }
        // The vertices wind clockwise, so every interior point sits on the
        // non-positive side of every edge.
        let tol = self.side_length * 1e-9;
        for i in 0..NUM_SIDES {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % NUM_SIDES];
            let edge = b - a;
            let to_p = p - a;
            let cross = edge.x * to_p.y - edge.y * to_p.x;
            if cross > tol {
                return false;
            }
        }
        true
    }

    /// Center of the i-th edge neighbor, in the order NE, E, SE, SW, W, NW.
    /// Two adjacent vertex vectors sum to the neighbor offset, so the
    /// neighbor center is `sqrt(3) * side` away.
    pub fn neighbor_center(&self, i: usize) -> Point {
        assert!(i < NUM_SIDES, "neighbor index {} out of range", i);
        self.center + self.vertex_dirs[i] + self.vertex_dirs[(i + 1) % NUM_SIDES]
    }

    /// The seven inner hexagons: six ring children in the (rotated) order
    /// N, NE, SE, S, SW, NW followed by the central child, which shares this
    /// hexagon's center. The ring centers always follow the computed `n'`
    /// direction; `orientation` only decides which north the children
    /// themselves are built with.
    pub fn child_hexagons(&self, orientation: ChildOrientation) -> HexGridResult<Vec<Hexagon>> {
        let sqrt_3 = 3f64.sqrt();
        let n_ne = self.vertex_dirs[1];
        // n' = M^-1 * n_ne with M = 2*R(pi/3) + I, det(M) = 7.
        let n_prime = Point::new(
            (2.0 * n_ne.x - sqrt_3 * n_ne.y) / 7.0,
            (sqrt_3 * n_ne.x + 2.0 * n_ne.y) / 7.0,
        );
        let child_side = n_prime.norm();
        let child_north = match orientation {
            ChildOrientation::Computed => n_prime * (1.0 / child_side),
            ChildOrientation::GlobalNorth => GLOBAL_NORTH,
        };
        trace!(
            "subdividing hexagon at ({:.3}, {:.3}): child side {:.4}, orientation {:?}",
            self.center.x,
            self.center.y,
            child_side,
            orientation
        );
        let ring_dirs = rotations_of(n_prime);
        let mut children = Vec::with_capacity(NUM_CHILDREN);
        for i in 0..NUM_SIDES {
            let center = self.center + ring_dirs[i] + ring_dirs[(i + 1) % NUM_SIDES];
            children.push(Hexagon::new(center, child_north, child_side)?);
        }
        children.push(Hexagon::new(self.center, child_north, child_side)?);
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn unit_north() -> Point {
        Point::new(0.0, 1.0)
    }

    #[test]
    fn vertices_are_the_five_rotations() {
        let hex = Hexagon::new(Point::new(0.0, 0.0), unit_north(), 2.0).unwrap();
        let sqrt_3 = 3f64.sqrt();
        let expected = [
            (0.0, 2.0),
            (sqrt_3, 1.0),
            (sqrt_3, -1.0),
            (0.0, -2.0),
            (-sqrt_3, -1.0),
            (-sqrt_3, 1.0),
        ];
        for (v, (x, y)) in hex.vertices().iter().zip(expected.iter()) {
            assert_approx_eq!(v.x, *x, 1e-10);
            assert_approx_eq!(v.y, *y, 1e-10);
        }
    }

    #[test]
    fn offset_center_shifts_vertices() {
        let hex = Hexagon::new(Point::new(10.0, -4.0), unit_north(), 2.0).unwrap();
        assert_approx_eq!(hex.vertices()[0].x, 10.0, 1e-10);
        assert_approx_eq!(hex.vertices()[0].y, -2.0, 1e-10);
    }

    #[test]
    fn containment() {
        let hex = Hexagon::new(Point::new(0.0, 0.0), unit_north(), 2.0).unwrap();
        assert!(hex.contains(Point::new(0.0, 0.0)));
        assert!(hex.contains(Point::new(1.0, 0.5)));
        assert!(!hex.contains(Point::new(0.0, 2.1)));
        assert!(!hex.contains(Point::new(5.0, 0.0)));
        // the boundary is inclusive
        assert!(hex.contains(Point::new(0.0, 2.0)));
        assert!(hex.contains(Point::new(3f64.sqrt(), 0.0)));
        // degenerate queries are never contained
        assert!(!hex.contains(Point::new(f64::NAN, 0.0)));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        assert!(Hexagon::new(Point::new(0.0, 0.0), unit_north(), 0.0).is_err());
        assert!(Hexagon::new(Point::new(0.0, 0.0), unit_north(), -1.0).is_err());
        assert!(Hexagon::new(Point::new(0.0, 0.0), unit_north(), f64::NAN).is_err());
        assert!(Hexagon::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0), 1.0).is_err());
    }

    #[test]
    fn non_unit_north_is_normalized() {
        let hex = Hexagon::new(Point::new(0.0, 0.0), Point::new(0.0, 4.0), 2.0).unwrap();
        assert_approx_eq!(hex.north_unit().y, 1.0, 1e-12);
        assert_approx_eq!(hex.vertices()[0].y, 2.0, 1e-10);
    }

    #[test]
    fn neighbor_centers_sit_a_lattice_step_away() {
        let side = 2.0;
        let hex = Hexagon::new(Point::new(0.0, 0.0), unit_north(), side).unwrap();
        let expected = side * 3f64.sqrt();
        for i in 0..NUM_SIDES {
            let c = hex.neighbor_center(i);
            assert_approx_eq!(c.norm(), expected, 1e-10);
        }
        // the NE neighbor is the sum of the N and NE vertex directions
        let ne = hex.neighbor_center(0);
        assert_approx_eq!(ne.x, 3f64.sqrt(), 1e-10);
        assert_approx_eq!(ne.y, 3.0, 1e-10);
    }

    #[test]
    fn opposite_neighbors_pair_up() {
        for i in 0..NUM_SIDES {
            assert_eq!(opposite_neighbor(opposite_neighbor(i)), i);
        }
        assert_eq!(opposite_neighbor(0), 3);
        assert_eq!(opposite_neighbor(5), 2);
    }

    #[test]
    fn subdivision_shrinks_by_sqrt_seven() {
        let hex = Hexagon::new(Point::new(0.0, 0.0), unit_north(), 2.0).unwrap();
        let children = hex.child_hexagons(ChildOrientation::Computed).unwrap();
        assert_eq!(children.len(), NUM_CHILDREN);
        let expected_side = 2.0 / 7f64.sqrt();
        for child in &children {
            assert_approx_eq!(child.side_length(), expected_side, 1e-10);
        }
        // the central child shares the parent center
        let central = &children[NUM_CHILDREN - 1];
        assert_approx_eq!(central.center().x, 0.0, 1e-12);
        assert_approx_eq!(central.center().y, 0.0, 1e-12);
        // ring children are one child-scale lattice step out
        let expected_offset = expected_side * 3f64.sqrt();
        for child in children.iter().take(NUM_SIDES) {
            assert_approx_eq!(child.center().norm(), expected_offset, 1e-10);
        }
    }

    #[test]
    fn orientation_rule() {
        let hex = Hexagon::new(Point::new(0.0, 0.0), unit_north(), 2.0).unwrap();
        let computed = hex.child_hexagons(ChildOrientation::Computed).unwrap();
        // the computed child north is tilted clockwise off the parent's
        let north = computed[0].north_unit();
        assert!(north.x > 0.0);
        assert!(north.y > 0.9);
        assert_approx_eq!(north.norm(), 1.0, 1e-12);

        let snapped = hex.child_hexagons(ChildOrientation::GlobalNorth).unwrap();
        for child in &snapped {
            assert_approx_eq!(child.north_unit().x, 0.0, 1e-12);
            assert_approx_eq!(child.north_unit().y, 1.0, 1e-12);
        }
    }

    #[test]
    fn children_cover_the_parent_center_region() {
        let hex = Hexagon::new(Point::new(0.0, 0.0), unit_north(), 2.0).unwrap();
        let children = hex.child_hexagons(ChildOrientation::Computed).unwrap();
        // each child contains its own center and the centers are distinct
        for (i, a) in children.iter().enumerate() {
            assert!(a.contains(a.center()));
            for b in children.iter().skip(i + 1) {
                assert!(a.center().distance(b.center()) > 1e-6);
            }
        }
    }
}
