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

//! # The Layers
//! One layer holds every registration area of a single depth; the low bits
//! of an address index straight into the layer's vector. The tree is built
//! once and never edited, and the core is single-threaded, so plain `Vec`
//! storage is all the structure a layer needs. Readers still go through the
//! closure accessors so the mutation surface stays inside the policy code.

use super::node::RaNode;
use core_septa::RaAddress;
use hexgrid::Hexagon;

/// The registration areas of one depth.
#[derive(Debug)]
pub struct RaLayer {
    depth: u8,
    nodes: Vec<RaNode>,
}

impl RaLayer {
    pub(crate) fn new(depth: u8) -> RaLayer {
        RaLayer {
            depth,
            nodes: Vec::new(),
        }
    }

    ///
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Total number of nodes on this layer
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    ///
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node and hands back the address it ended up with.
    pub(crate) fn push_node(
        &mut self,
        parent_address: Option<RaAddress>,
        hexagon: Hexagon,
    ) -> RaAddress {
        let address = RaAddress::from((self.depth, self.nodes.len()));
        self.nodes.push(RaNode::new(parent_address, address, hexagon));
        address
    }

    /// Read only access to a single node.
    pub fn get_node_and<F, T>(&self, index: usize, f: F) -> Option<T>
    where
        F: FnOnce(&RaNode) -> T,
    {
        self.nodes.get(index).map(f)
    }

    /// Read only access to all nodes.
    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&RaNode),
    {
        for node in &self.nodes {
            f(node);
        }
    }

    /// Addresses of every node on the layer.
    pub fn node_addresses(&self) -> Vec<RaAddress> {
        self.nodes.iter().map(|n| n.address()).collect()
    }

    pub(crate) fn node(&self, index: usize) -> &RaNode {
        &self.nodes[index]
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut RaNode {
        &mut self.nodes[index]
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut RaNode> {
        self.nodes.iter_mut()
    }
}
