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

//! # The Registration-Area Tree
//! A fixed tree built once by recursive subdivision of the root hexagon.
//! The reference configuration is three levels: the root, its seven
//! children, and 49 leaf PCS cells. Nodes are stored per layer and
//! addressed by (depth, index) pairs; every cross-reference in the record
//! tables is such an address.
//!
//! The tree carries the policy chosen at construction. All event handling
//! (registration, dark-spot deregistration, search) enters through the
//! methods defined in [`crate::policies`]; this module only owns the shape
//! and the read access.

use super::layer::RaLayer;
use super::node::RaNode;
use crate::policies::Policy;
use core_septa::RaAddress;
use hexgrid::Point;

/// Container for the parameters governing the construction of the tree and
/// the behavior of the active policy.
#[derive(Debug, Clone)]
pub struct RaTreeParameters {
    /// The location-management policy every node follows.
    pub policy: Policy,
    /// Replica eviction threshold of the replication policy.
    pub s_min: f64,
    /// Replica admission threshold of the replication policy.
    pub s_max: f64,
    /// Center of the root hexagon.
    pub center: Point,
    /// Side length of the root hexagon.
    pub side_length: f64,
    /// Number of tree levels; 3 gives 1 + 7 + 49 nodes.
    pub levels: usize,
}

/// The registration-area tree.
pub struct RaTree {
    pub(crate) parameters: RaTreeParameters,
    pub(crate) layers: Vec<RaLayer>,
    pub(crate) root_address: RaAddress,
    pub(crate) leaf_addresses: Vec<RaAddress>,
}

impl RaTree {
    ///
    pub fn parameters(&self) -> &RaTreeParameters {
        &self.parameters
    }

    /// The policy the whole tree was built for.
    pub fn policy(&self) -> Policy {
        self.parameters.policy
    }

    /// The root of the tree.
    pub fn root_address(&self) -> RaAddress {
        self.root_address
    }

    /// The PCS cells in construction order. This order is the containment
    /// tie-break: the first leaf containing a point wins.
    pub fn leaf_addresses(&self) -> &[RaAddress] {
        &self.leaf_addresses
    }

    /// Borrowed access to a single layer.
    pub fn layer(&self, depth: usize) -> &RaLayer {
        &self.layers[depth]
    }

    /// Returns the number of layers in the tree.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    ///
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// This is the total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }

    /// Read only access to the internals of a node.
    pub fn get_node_and<F, T>(&self, address: RaAddress, f: F) -> Option<T>
    where
        F: FnOnce(&RaNode) -> T,
    {
        self.layers
            .get(address.depth() as usize)
            .and_then(|l| l.get_node_and(address.index(), f))
    }

    /// Read only access to every node, layer by layer from the root down.
    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&RaNode),
    {
        for layer in &self.layers {
            layer.for_each_node(&mut f);
        }
    }

    /// The chain from `address` up to and including the root.
    pub fn ancestors(&self, address: RaAddress) -> Vec<RaAddress> {
        let mut out = Vec::with_capacity(self.layers.len());
        let mut cursor = Some(address);
        while let Some(addr) = cursor {
            out.push(addr);
            cursor = self.node(addr).parent_address();
        }
        out
    }

    /// The leaf whose hexagon contains `position`, or none for a dark spot.
    ///
    /// The hinted cell is probed first, then its linked edge neighbors (a
    /// phone moves one step at a time, so it almost always lands next
    /// door), then the full leaf list in construction order.
    pub fn containing_leaf(&self, position: Point, hint: Option<RaAddress>) -> Option<RaAddress> {
        if let Some(hint) = hint {
            let node = self.node(hint);
            if node.hexagon().contains(position) {
                return Some(hint);
            }
            for neighbor in node.neighbors().iter().flatten() {
                if self.node(*neighbor).hexagon().contains(position) {
                    return Some(*neighbor);
                }
            }
        }
        self.leaf_addresses
            .iter()
            .copied()
            .find(|a| self.node(*a).hexagon().contains(position))
    }

    pub(crate) fn node(&self, address: RaAddress) -> &RaNode {
        self.layers[address.depth() as usize].node(address.index())
    }

    pub(crate) fn node_mut(&mut self, address: RaAddress) -> &mut RaNode {
        self.layers[address.depth() as usize].node_mut(address.index())
    }

    pub(crate) fn layers_mut(&mut self) -> impl Iterator<Item = &mut RaLayer> {
        self.layers.iter_mut()
    }
}
