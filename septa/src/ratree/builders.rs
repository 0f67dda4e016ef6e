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

use super::layer::RaLayer;
use super::tree::{RaTree, RaTreeParameters};
use crate::errors::SeptaResult;
use crate::policies::Policy;
use hexgrid::{
    opposite_neighbor, ChildOrientation, HexGridError, Hexagon, Point, GLOBAL_NORTH,
    NUM_CHILDREN, NUM_SIDES,
};
use log::info;
use std::fs::read_to_string;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

/// A construction object for a registration-area tree. See
/// [`crate::ratree::RaTreeParameters`] for docs
#[derive(Debug)]
pub struct RaTreeBuilder {
    pub(crate) center_x: f64,
    pub(crate) center_y: f64,
    pub(crate) side_length: f64,
    pub(crate) levels: usize,
    pub(crate) policy: Policy,
    pub(crate) s_min: f64,
    pub(crate) s_max: f64,
}

impl Default for RaTreeBuilder {
    fn default() -> RaTreeBuilder {
        RaTreeBuilder {
            center_x: 320.0,
            center_y: 240.0,
            side_length: 220.0,
            levels: 3,
            policy: Policy::BasicPointer,
            s_min: 2.0,
            s_max: 2.0,
        }
    }
}

/// yaml-rust keeps integers and reals apart; config files write both.
fn yaml_f64(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|i| i as f64))
}

impl RaTreeBuilder {
    /// Creates a new builder with the reference configuration: a root
    /// hexagon of side 220 centered at (320, 240) subdivided into three
    /// levels, basic pointer policy, replica thresholds at 2.
    pub fn new() -> RaTreeBuilder {
        RaTreeBuilder::default()
    }

    /// Creates a builder from a yaml config file.
    ///
    /// ```yaml
    /// ---
    /// side_length: 220
    /// center_x: 320
    /// center_y: 240
    /// levels: 3
    /// policy: 0
    /// s_max: 2
    /// ```
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Self {
        let config = read_to_string(&path).expect("Unable to read config file");
        let params_files = YamlLoader::load_from_str(&config).unwrap();
        let mut builder = RaTreeBuilder::new();
        builder.apply_yaml(&params_files[0]);
        builder
    }

    pub(crate) fn apply_yaml(&mut self, params: &Yaml) -> &mut Self {
        self.side_length = yaml_f64(&params["side_length"]).unwrap_or(self.side_length);
        self.center_x = yaml_f64(&params["center_x"]).unwrap_or(self.center_x);
        self.center_y = yaml_f64(&params["center_y"]).unwrap_or(self.center_y);
        self.levels = params["levels"].as_i64().unwrap_or(self.levels as i64) as usize;
        self.s_min = yaml_f64(&params["s_min"]).unwrap_or(self.s_min);
        self.s_max = yaml_f64(&params["s_max"]).unwrap_or(self.s_max);
        if let Some(index) = params["policy"].as_i64() {
            if let Some(policy) = Policy::from_index(index as usize) {
                self.policy = policy;
            }
        }
        self
    }

    /// See [`crate::ratree::RaTreeParameters`] for docs
    pub fn set_center(&mut self, x: f64, y: f64) -> &mut Self {
        self.center_x = x;
        self.center_y = y;
        self
    }
    /// See [`crate::ratree::RaTreeParameters`] for docs
    pub fn set_side_length(&mut self, x: f64) -> &mut Self {
        self.side_length = x;
        self
    }
    /// See [`crate::ratree::RaTreeParameters`] for docs
    pub fn set_levels(&mut self, x: usize) -> &mut Self {
        self.levels = x;
        self
    }
    /// See [`crate::ratree::RaTreeParameters`] for docs
    pub fn set_policy(&mut self, x: Policy) -> &mut Self {
        self.policy = x;
        self
    }
    /// See [`crate::ratree::RaTreeParameters`] for docs
    pub fn set_s_min(&mut self, x: f64) -> &mut Self {
        self.s_min = x;
        self
    }
    /// See [`crate::ratree::RaTreeParameters`] for docs
    pub fn set_s_max(&mut self, x: f64) -> &mut Self {
        self.s_max = x;
        self
    }

    /// Builds the tree: the root hexagon is subdivided level by level, each
    /// node records its parent and children, and every layer links its
    /// same-size edge neighbors. Fails with `InvalidGeometry` on degenerate
    /// inputs.
    pub fn build(&self) -> SeptaResult<RaTree> {
        if self.levels == 0 {
            return Err(HexGridError::invalid("tree needs at least one level").into());
        }
        let center = Point::new(self.center_x, self.center_y);
        let root_hexagon = Hexagon::new(center, GLOBAL_NORTH, self.side_length)?;

        let mut layers: Vec<RaLayer> = (0..self.levels).map(|d| RaLayer::new(d as u8)).collect();
        let root_address = layers[0].push_node(None, root_hexagon);

        let mut frontier = vec![root_address];
        for depth in 1..self.levels {
            // children snap back to the global north at even depths and
            // keep the solved direction at odd depths
            let orientation = if depth % 2 == 0 {
                ChildOrientation::GlobalNorth
            } else {
                ChildOrientation::Computed
            };
            let mut next = Vec::with_capacity(frontier.len() * NUM_CHILDREN);
            for parent in frontier {
                let parent_hexagon = layers[depth - 1].node(parent.index()).hexagon().clone();
                for child_hexagon in parent_hexagon.child_hexagons(orientation)? {
                    let child_address = layers[depth].push_node(Some(parent), child_hexagon);
                    layers[depth - 1]
                        .node_mut(parent.index())
                        .push_child(child_address);
                    next.push(child_address);
                }
            }
            frontier = next;
        }

        let leaf_addresses = layers[self.levels - 1].node_addresses();
        for layer in layers.iter_mut() {
            link_neighbors(layer);
        }

        info!(
            "built a {}-level registration-area tree with {} nodes and {} cells under {}",
            self.levels,
            layers.iter().map(|l| l.len()).sum::<usize>(),
            leaf_addresses.len(),
            self.policy
        );

        Ok(RaTree {
            parameters: RaTreeParameters {
                policy: self.policy,
                s_min: self.s_min,
                s_max: self.s_max,
                center,
                side_length: self.side_length,
                levels: self.levels,
            },
            layers,
            root_address,
            leaf_addresses,
        })
    }
}

/// Links the edge neighbors of one layer. All nodes of a layer share a side
/// length and sit on the same hexagonal lattice, so neighbors are exactly
/// one `sqrt(3) * side` step apart. The slot is the nearest of the six
/// neighbor centers; a snapped orientation twists the slot axes off the
/// lattice, but never past the 30 degree slot half-width, so the nearest
/// slot is unambiguous and reciprocal links land three slots around.
fn link_neighbors(layer: &mut RaLayer) {
    let n = layer.len();
    if n < 2 {
        return;
    }
    let centers: Vec<Point> = (0..n).map(|i| layer.node(i).hexagon().center()).collect();
    let step = layer.node(0).hexagon().side_length() * 3f64.sqrt();

    let mut links: Vec<(usize, usize, usize)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = centers[i].distance(centers[j]);
            if (d - step).abs() > step * 0.35 {
                continue;
            }
            let mut best = 0;
            let mut best_d = f64::MAX;
            for k in 0..NUM_SIDES {
                let dk = layer.node(i).hexagon().neighbor_center(k).distance(centers[j]);
                if dk < best_d {
                    best_d = dk;
                    best = k;
                }
            }
            links.push((i, best, j));
        }
    }
    for (i, k, j) in links {
        let i_address = layer.node(i).address();
        let j_address = layer.node(j).address();
        layer.node_mut(i).set_neighbor(k, j_address);
        layer.node_mut(j).set_neighbor(opposite_neighbor(k), i_address);
    }
}
