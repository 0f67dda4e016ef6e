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

//! # The Location-Management Policies
//! All four policies share the event surface (register on movement,
//! deregister on leaving coverage, search on a call) and differ in the
//! records they keep per registration area and in how far an update has to
//! propagate. The policy is fixed at tree construction, so dispatch is a
//! plain match, never per-node dynamic dispatch.
//!
//! ## The accounting convention
//! Reads and writes of the record tables are the currency the policies are
//! compared in, so the charging rules are uniform:
//!
//! * a search charges one read per area probed while ascending from the
//!   caller's cell; following records (or a replica) toward the callee is
//!   free;
//! * register and unregister walks charge one read per probe or fetch;
//! * one write per record created, one per record deleted with no immediate
//!   replacement; rewriting an existing key in place rides on the paired
//!   deletion. A movement whose lowest common ancestor sits at depth `k`
//!   therefore costs exactly `2 * (leaf_depth - k)` writes under both the
//!   pointer and the value policy;
//! * the forwarding policy charges its lateral rewrite and the new leaf
//!   install only; its prunes and backfills are uncharged maintenance;
//! * the replication policy additionally charges one write per node for the
//!   mobility trickle, one read and one write per node on the local-calls
//!   pass, and one write per replica installed along a search path.

pub(crate) mod forwarding;
pub(crate) mod pointer;
pub(crate) mod replication;
pub(crate) mod value;

use crate::errors::{SeptaError, SeptaResult};
use crate::phone::{PhoneDirectory, PhoneIndex};
use crate::ratree::node::Record;
use crate::ratree::RaTree;
use core_septa::RaAddress;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The interchangeable location-management policies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// Every ancestor points at the child on the path to the phone.
    BasicPointer,
    /// Every ancestor stores the absolute leaf cell.
    BasicValue,
    /// Basic pointer plus LCMR-driven replica caches.
    Replication,
    /// Basic pointer, but stale hops get lateral forwarding pointers
    /// instead of being torn down.
    ForwardingPointer,
}

impl Policy {
    /// The command-line encoding: 0 pointer, 1 value, 2 replication,
    /// 3 forwarding.
    pub fn from_index(index: usize) -> Option<Policy> {
        match index {
            0 => Some(Policy::BasicPointer),
            1 => Some(Policy::BasicValue),
            2 => Some(Policy::Replication),
            3 => Some(Policy::ForwardingPointer),
            _ => None,
        }
    }

    ///
    pub fn index(&self) -> usize {
        match self {
            Policy::BasicPointer => 0,
            Policy::BasicValue => 1,
            Policy::Replication => 2,
            Policy::ForwardingPointer => 3,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Policy::BasicPointer => "BasicPointerLocationManager",
            Policy::BasicValue => "BasicValueLocationManager",
            Policy::Replication => "ReplicationLocationManager",
            Policy::ForwardingPointer => "ForwardingPointerLocationManager",
        };
        write!(f, "{}", name)
    }
}

/// How a search ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The callee was located at this leaf cell and the call connects.
    Connected(RaAddress),
    /// No record anywhere (or a cached out-of-coverage answer): voicemail.
    Voicemail,
}

impl RaTree {
    /// True iff the phone's position has left its current cell, or the
    /// phone has no cell and some leaf now contains it.
    pub fn has_moved_to_new_cell(&self, phones: &PhoneDirectory, p: PhoneIndex) -> bool {
        let phone = phones.phone(p);
        match phone.pcs_cell() {
            Some(cell) => self
                .get_node_and(cell, |n| !n.hexagon().contains(phone.position()))
                .unwrap_or(true),
            None => self.containing_leaf(phone.position(), None).is_some(),
        }
    }

    /// Applies one of the three location transitions: entering coverage,
    /// crossing into another cell (which prunes the stale path at the
    /// lowest common ancestor), or dropping into a dark spot. Each
    /// transition counts one mobility step. After the record walk the
    /// phone's movement count is refreshed at the root; the replication
    /// policy trickles it to every node.
    pub fn update_location(
        &mut self,
        phones: &mut PhoneDirectory,
        p: PhoneIndex,
    ) -> SeptaResult<()> {
        let position = phones.phone(p).position();
        match phones.phone(p).pcs_cell() {
            None => {
                if let Some(leaf) = self.containing_leaf(position, None) {
                    debug!("phone {} entered coverage at {}", phones.phone(p).id(), leaf);
                    phones.set_cell(p, Some(leaf));
                    phones.bump_mobility(p);
                    self.leaf_register(phones, p, leaf)?;
                    self.refresh_mobility(phones, p);
                }
            }
            Some(old) => match self.containing_leaf(position, Some(old)) {
                Some(new_leaf) if new_leaf == old => {}
                Some(new_leaf) => {
                    debug!(
                        "phone {} moved {} -> {}",
                        phones.phone(p).id(),
                        old,
                        new_leaf
                    );
                    phones.set_cell(p, Some(new_leaf));
                    phones.bump_mobility(p);
                    self.leaf_register(phones, p, new_leaf)?;
                    self.refresh_mobility(phones, p);
                }
                None => {
                    debug!("phone {} left coverage from {}", phones.phone(p).id(), old);
                    phones.set_cell(p, None);
                    phones.bump_mobility(p);
                    self.dark_spot_deregister(phones, p, old)?;
                    self.refresh_mobility(phones, p);
                }
            },
        }
        Ok(())
    }

    /// Places a call. The search starts at the caller's cell; a caller
    /// outside coverage has no cell to search from.
    pub fn call(
        &mut self,
        phones: &mut PhoneDirectory,
        caller: PhoneIndex,
        callee: PhoneIndex,
    ) -> SeptaResult<SearchOutcome> {
        let from = phones
            .phone(caller)
            .pcs_cell()
            .ok_or_else(|| SeptaError::OutOfCoverage(phones.phone(caller).id().to_string()))?;
        let outcome = self.search_from(phones, caller, callee, from)?;
        match outcome {
            SearchOutcome::Connected(leaf) => debug!(
                "call {} -> {} connected at {}",
                phones.phone(caller).id(),
                phones.phone(callee).id(),
                leaf
            ),
            SearchOutcome::Voicemail => debug!(
                "call {} -> {} went to voicemail",
                phones.phone(caller).id(),
                phones.phone(callee).id()
            ),
        }
        Ok(outcome)
    }

    /// The leaf half of a registration: the cell stores the phone itself,
    /// then the policy's upward walk takes over from the parent.
    fn leaf_register(
        &mut self,
        phones: &mut PhoneDirectory,
        p: PhoneIndex,
        leaf: RaAddress,
    ) -> SeptaResult<()> {
        if self.parameters.policy == Policy::ForwardingPointer {
            // the new cell may still hold a lateral from a past stay;
            // prune the chain behind it before the phone lands on top
            if let Some(Record::Child(stale)) = self.node(leaf).record(p) {
                forwarding::prune_chain(self, phones, p, stale)?;
            }
        }
        phones.charge_write(p);
        self.node_mut(leaf).insert_record(p, Record::Phone(p));
        if self.parameters.policy == Policy::ForwardingPointer {
            self.node_mut(leaf).set_instantiated(p);
        }
        match self.node(leaf).parent_address() {
            Some(parent) => match self.parameters.policy {
                Policy::BasicPointer | Policy::Replication => {
                    pointer::register_up(self, phones, p, parent, leaf)
                }
                Policy::BasicValue => value::register_up(self, phones, p, parent, leaf),
                Policy::ForwardingPointer => {
                    forwarding::register_up(self, phones, p, parent, leaf)
                }
            },
            None => Ok(()),
        }
    }

    /// Full unregistration when a phone drops out of coverage. The chain
    /// policies delete the ancestor path; forwarding sweeps the whole tree
    /// because lateral records can live off the ancestor chain.
    fn dark_spot_deregister(
        &mut self,
        phones: &mut PhoneDirectory,
        p: PhoneIndex,
        leaf: RaAddress,
    ) -> SeptaResult<()> {
        match self.parameters.policy {
            Policy::ForwardingPointer => forwarding::dark_spot_sweep(self, phones, p),
            _ => {
                let mut cursor = Some(leaf);
                while let Some(addr) = cursor {
                    phones.charge_write(p);
                    if self.node_mut(addr).remove_record(p).is_none() {
                        return Err(SeptaError::corrupt(addr, p));
                    }
                    cursor = self.node(addr).parent_address();
                }
                Ok(())
            }
        }
    }

    fn refresh_mobility(&mut self, phones: &mut PhoneDirectory, p: PhoneIndex) {
        let mobility = phones.phone(p).mobility();
        if self.parameters.policy == Policy::Replication {
            let cell = phones.phone(p).pcs_cell();
            replication::trickle_down_update_mobility(self, phones, p, mobility, cell);
        } else {
            let root = self.root_address;
            self.node_mut(root).set_mobility(p, mobility);
        }
    }

    /// The shared search walk: ascend with one charged probe per area until
    /// a record (or, under replication, a replica) answers, then follow the
    /// records to the callee without further charges. Reaching the root
    /// empty-handed is voicemail, not an error; a broken chain below a
    /// found record is.
    fn search_from(
        &mut self,
        phones: &mut PhoneDirectory,
        caller: PhoneIndex,
        callee: PhoneIndex,
        from: RaAddress,
    ) -> SeptaResult<SearchOutcome> {
        let replication = self.parameters.policy == Policy::Replication;
        let mut visited: Vec<RaAddress> = Vec::new();

        let mut found: Option<(RaAddress, Record)> = None;
        let mut replica_hit: Option<Option<RaAddress>> = None;
        let mut cursor = Some(from);
        while let Some(addr) = cursor {
            phones.charge_read(caller);
            visited.push(addr);
            if replication {
                if let Some(target) = self.node(addr).replica(callee) {
                    replica_hit = Some(target);
                    break;
                }
            }
            if let Some(record) = self.node(addr).record(callee) {
                found = Some((addr, record));
                break;
            }
            cursor = self.node(addr).parent_address();
        }

        let outcome = if let Some(target) = replica_hit {
            // a replica answers immediately, stale or not; the next
            // movement's trickle repairs staleness
            match target {
                Some(leaf) => SearchOutcome::Connected(leaf),
                None => SearchOutcome::Voicemail,
            }
        } else if let Some((mut at, mut record)) = found {
            loop {
                match record {
                    Record::Phone(resident) => {
                        if resident != callee {
                            return Err(SeptaError::corrupt(at, callee));
                        }
                        break SearchOutcome::Connected(at);
                    }
                    Record::Leaf(leaf) => break SearchOutcome::Connected(leaf),
                    Record::Child(next) => {
                        visited.push(next);
                        record = self
                            .node(next)
                            .record(callee)
                            .ok_or_else(|| SeptaError::corrupt(next, callee))?;
                        at = next;
                    }
                }
            }
        } else {
            SearchOutcome::Voicemail
        };

        if replication {
            replication::account_call(self, phones, caller, callee, from, &visited, outcome);
        }
        Ok(outcome)
    }
}
