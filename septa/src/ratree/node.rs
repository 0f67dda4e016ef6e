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

//! # The Node
//! One registration area: its hexagon, its place in the tree, and the
//! policy tables. Leaves double as PCS cells. All references to other areas
//! are layer addresses, never owning pointers, so the parent/child cycle of
//! the tree never materializes in the ownership graph.

use crate::phone::PhoneIndex;
use core_septa::RaAddress;
use fxhash::FxHashMap;
use hexgrid::{Hexagon, NUM_SIDES};
use smallvec::SmallVec;

/// What a registration area knows about one phone. Pointer-style policies
/// store the next hop toward the phone, the value policy stores the leaf
/// itself, and the area that physically hosts the phone stores the phone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Record {
    /// The next registration area on the path to the phone. Under the
    /// forwarding policy this may point sideways rather than down.
    Child(RaAddress),
    /// The absolute leaf cell hosting the phone (value policy).
    Leaf(RaAddress),
    /// The phone itself; only leaves hold this.
    Phone(PhoneIndex),
}

/// A registration area.
#[derive(Debug)]
pub struct RaNode {
    /// Parent address
    parent_address: Option<RaAddress>,
    /// Node address
    address: RaAddress,
    hexagon: Hexagon,
    /// Children, empty at a PCS cell
    children: SmallVec<[RaAddress; 7]>,
    /// Same-layer edge neighbors in the order NE, E, SE, SW, W, NW
    neighbors: [Option<RaAddress>; NUM_SIDES],
    registered: FxHashMap<PhoneIndex, Record>,
    local_calls: FxHashMap<PhoneIndex, u64>,
    phone_mobility: FxHashMap<PhoneIndex, u64>,
    replicas: FxHashMap<PhoneIndex, Option<RaAddress>>,
    record_instantiated: FxHashMap<PhoneIndex, bool>,
}

impl RaNode {
    /// Creates a new blank node
    pub(crate) fn new(
        parent_address: Option<RaAddress>,
        address: RaAddress,
        hexagon: Hexagon,
    ) -> RaNode {
        RaNode {
            parent_address,
            address,
            hexagon,
            children: SmallVec::new(),
            neighbors: [None; NUM_SIDES],
            registered: FxHashMap::default(),
            local_calls: FxHashMap::default(),
            phone_mobility: FxHashMap::default(),
            replicas: FxHashMap::default(),
            record_instantiated: FxHashMap::default(),
        }
    }

    ///
    pub fn address(&self) -> RaAddress {
        self.address
    }

    ///
    pub fn parent_address(&self) -> Option<RaAddress> {
        self.parent_address
    }

    ///
    pub fn hexagon(&self) -> &Hexagon {
        &self.hexagon
    }

    /// A node with no children is a PCS cell.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Child addresses: six ring children then the central child.
    pub fn children(&self) -> &[RaAddress] {
        &self.children
    }

    /// Same-layer edge neighbors; fringe nodes keep `None` slots.
    pub fn neighbors(&self) -> &[Option<RaAddress>; NUM_SIDES] {
        &self.neighbors
    }

    pub(crate) fn push_child(&mut self, child: RaAddress) {
        self.children.push(child);
    }

    pub(crate) fn set_neighbor(&mut self, i: usize, addr: RaAddress) {
        self.neighbors[i] = Some(addr);
    }

    /// The record this area keeps for a phone, if any.
    pub fn record(&self, p: PhoneIndex) -> Option<Record> {
        self.registered.get(&p).copied()
    }

    ///
    pub fn has_record(&self, p: PhoneIndex) -> bool {
        self.registered.contains_key(&p)
    }

    /// Number of phones with a record here.
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub(crate) fn insert_record(&mut self, p: PhoneIndex, record: Record) {
        self.registered.insert(p, record);
    }

    pub(crate) fn remove_record(&mut self, p: PhoneIndex) -> Option<Record> {
        self.registered.remove(&p)
    }

    /// The cached replica target: `Some(Some(leaf))` resolves the callee,
    /// `Some(None)` is a cached "out of coverage" answer.
    pub fn replica(&self, p: PhoneIndex) -> Option<Option<RaAddress>> {
        self.replicas.get(&p).copied()
    }

    pub(crate) fn insert_replica(&mut self, p: PhoneIndex, target: Option<RaAddress>) {
        self.replicas.insert(p, target);
    }

    pub(crate) fn remove_replica(&mut self, p: PhoneIndex) {
        self.replicas.remove(&p);
    }

    /// Calls to `p` that originated from this area's subtree.
    pub fn local_calls_for(&self, p: PhoneIndex) -> u64 {
        self.local_calls.get(&p).copied().unwrap_or(0)
    }

    pub(crate) fn bump_local_calls(&mut self, p: PhoneIndex) {
        *self.local_calls.entry(p).or_insert(0) += 1;
    }

    /// Last movement count trickled down for `p`, if any.
    pub fn mobility_for(&self, p: PhoneIndex) -> Option<u64> {
        self.phone_mobility.get(&p).copied()
    }

    pub(crate) fn set_mobility(&mut self, p: PhoneIndex, mobility: u64) {
        self.phone_mobility.insert(p, mobility);
    }

    /// Local call-to-mobility ratio for `p`; zero until a movement count
    /// has trickled down (a phone that never moved cannot be called).
    pub fn lcmr(&self, p: PhoneIndex) -> f64 {
        match self.phone_mobility.get(&p) {
            Some(&m) if m > 0 => self.local_calls_for(p) as f64 / m as f64,
            _ => 0.0,
        }
    }

    /// Whether a record has been written here since the last full purge
    /// (forwarding policy bookkeeping).
    pub fn is_instantiated(&self, p: PhoneIndex) -> bool {
        self.record_instantiated.get(&p).copied().unwrap_or(false)
    }

    pub(crate) fn set_instantiated(&mut self, p: PhoneIndex) {
        self.record_instantiated.insert(p, true);
    }

    pub(crate) fn clear_instantiated(&mut self, p: PhoneIndex) {
        self.record_instantiated.remove(&p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexgrid::Point;

    fn test_node() -> RaNode {
        let hexagon =
            Hexagon::new(Point::new(0.0, 0.0), Point::new(0.0, 1.0), 10.0).unwrap();
        RaNode::new(None, RaAddress::from((0u8, 0)), hexagon)
    }

    #[test]
    fn record_table() {
        let mut node = test_node();
        assert!(node.record(0).is_none());
        node.insert_record(0, Record::Phone(0));
        assert_eq!(node.record(0), Some(Record::Phone(0)));
        assert_eq!(node.registered_count(), 1);
        assert_eq!(node.remove_record(0), Some(Record::Phone(0)));
        assert!(!node.has_record(0));
    }

    #[test]
    fn lcmr_guards_against_missing_mobility() {
        let mut node = test_node();
        node.bump_local_calls(3);
        assert_eq!(node.lcmr(3), 0.0);
        node.set_mobility(3, 2);
        node.bump_local_calls(3);
        assert!((node.lcmr(3) - 1.0).abs() < 1e-12);
    }
}
