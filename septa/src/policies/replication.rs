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

//! # Replication
//! Basic pointer registrations plus a per-area replica cache driven by the
//! local call-to-mobility ratio: areas whose subtrees call a phone much
//! more often than the phone moves get a direct answer cached. A replica
//! terminates a search on the spot, stale or not; every movement trickles
//! the phone's mobility count down the whole tree, refreshing or evicting
//! replicas as the ratio shifts.

use super::SearchOutcome;
use crate::phone::{PhoneDirectory, PhoneIndex};
use crate::ratree::RaTree;
use core_septa::RaAddress;
use log::debug;

/// After every movement the root pushes the phone's new mobility count to
/// every registration area, one charged write each. Areas above the
/// admission threshold get a fresh replica of the phone's cell (repairing
/// any staleness); areas that fell below the eviction threshold drop
/// theirs.
pub(crate) fn trickle_down_update_mobility(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    mobility: u64,
    cell: Option<RaAddress>,
) {
    let s_max = tree.parameters().s_max;
    for layer in tree.layers_mut() {
        for node in layer.nodes_mut() {
            phones.charge_write(p);
            node.set_mobility(p, mobility);
            let lcmr = node.lcmr(p);
            if lcmr > s_max {
                node.insert_replica(p, cell);
            } else if lcmr < s_max && node.replica(p).is_some() {
                node.remove_replica(p);
            }
        }
    }
}

/// Post-search bookkeeping. The call statistic is incremented from the
/// caller's cell up to the root (one read and one write per area), then
/// every area the search visited re-evaluates its ratio and caches the
/// resolved destination if it now clears the admission threshold. A
/// voicemail result is cached as an out-of-coverage replica.
pub(crate) fn account_call(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    caller: PhoneIndex,
    callee: PhoneIndex,
    caller_leaf: RaAddress,
    visited: &[RaAddress],
    outcome: SearchOutcome,
) {
    let mut cursor = Some(caller_leaf);
    while let Some(address) = cursor {
        phones.charge_read(caller);
        phones.charge_write(caller);
        tree.node_mut(address).bump_local_calls(callee);
        cursor = tree.node(address).parent_address();
    }

    let destination = match outcome {
        SearchOutcome::Connected(leaf) => Some(leaf),
        SearchOutcome::Voicemail => None,
    };
    let s_max = tree.parameters().s_max;
    for &address in visited {
        let install = {
            let node = tree.node(address);
            node.lcmr(callee) > s_max && node.replica(callee).is_none()
        };
        if install {
            debug!(
                "replicating the profile of phone {} (cell {:?}) at {}",
                callee, destination, address
            );
            phones.charge_write(caller);
            tree.node_mut(address).insert_replica(callee, destination);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::phone::{PhoneDirectory, PhoneIndex};
    use crate::policies::tests::*;
    use crate::policies::{Policy, SearchOutcome};
    use crate::ratree::{RaTree, RaTreeBuilder};
    use core_septa::RaAddress;
    use hexgrid::Point;

    fn replica_at(
        tree: &RaTree,
        address: RaAddress,
        p: PhoneIndex,
    ) -> Option<Option<RaAddress>> {
        tree.get_node_and(address, |n| n.replica(p)).unwrap()
    }

    #[test]
    fn third_call_installs_replicas_along_the_caller_chain() {
        let mut tree = build_tree(Policy::Replication);
        let mut phones = PhoneDirectory::new();
        let leaf_a = grandchild(&tree, 0, 3);
        let leaf_b = grandchild(&tree, 6, 0);
        let a = place_phone(&mut tree, &mut phones, "a", leaf_a);
        let b = place_phone(&mut tree, &mut phones, "b", leaf_b);

        // S_max = 2 and a's mobility is 1, so two calls stay below the
        // admission threshold and the third crosses it
        for _ in 0..2 {
            assert_eq!(
                tree.call(&mut phones, b, a).unwrap(),
                SearchOutcome::Connected(leaf_a)
            );
        }
        for address in tree.ancestors(leaf_b) {
            assert!(replica_at(&tree, address, a).is_none());
        }

        tree.call(&mut phones, b, a).unwrap();
        for address in tree.ancestors(leaf_b) {
            assert_eq!(replica_at(&tree, address, a), Some(Some(leaf_a)));
        }
    }

    #[test]
    fn replica_terminates_the_search_immediately() {
        let mut tree = build_tree(Policy::Replication);
        let mut phones = PhoneDirectory::new();
        let leaf_a = grandchild(&tree, 0, 3);
        let leaf_b = grandchild(&tree, 6, 0);
        let a = place_phone(&mut tree, &mut phones, "a", leaf_a);
        let b = place_phone(&mut tree, &mut phones, "b", leaf_b);

        for _ in 0..3 {
            tree.call(&mut phones, b, a).unwrap();
        }
        // replica at b's own cell: one charged probe plus the local-calls
        // pass over the three-node chain
        let reads_before = phones.phone(b).num_reads();
        assert_eq!(
            tree.call(&mut phones, b, a).unwrap(),
            SearchOutcome::Connected(leaf_a)
        );
        assert_eq!(phones.phone(b).num_reads() - reads_before, 1 + 3);
    }

    #[test]
    fn movement_trickles_mobility_everywhere_and_evicts() {
        let mut tree = build_tree(Policy::Replication);
        let mut phones = PhoneDirectory::new();
        let leaf_a = grandchild(&tree, 0, 3);
        let a = place_phone(&mut tree, &mut phones, "a", leaf_a);
        let leaf_b = grandchild(&tree, 6, 0);
        let b = place_phone(&mut tree, &mut phones, "b", leaf_b);

        for _ in 0..3 {
            tree.call(&mut phones, b, a).unwrap();
        }
        let new_leaf = grandchild(&tree, 0, 4);
        move_to(&mut tree, &mut phones, a, new_leaf);

        // every area saw the new count and the root matches exactly
        let mobility = phones.phone(a).mobility();
        assert_eq!(mobility, 2);
        tree.for_each_node(|n| {
            assert_eq!(n.mobility_for(a), Some(mobility));
        });
        // 3 calls / 2 moves dropped below the threshold: replicas are gone
        tree.for_each_node(|n| {
            assert!(n.replica(a).is_none());
        });
    }

    #[test]
    fn trickle_refreshes_stale_replicas_when_still_admitted() {
        // a low threshold keeps the replicas admitted across the move
        let mut tree = RaTreeBuilder::new()
            .set_policy(Policy::Replication)
            .set_s_max(0.4)
            .build()
            .unwrap();
        let mut phones = PhoneDirectory::new();
        let leaf_a = grandchild(&tree, 0, 3);
        let leaf_b = grandchild(&tree, 6, 0);
        let a = place_phone(&mut tree, &mut phones, "a", leaf_a);
        let b = place_phone(&mut tree, &mut phones, "b", leaf_b);

        tree.call(&mut phones, b, a).unwrap();
        assert_eq!(replica_at(&tree, leaf_b, a), Some(Some(leaf_a)));

        let new_leaf = grandchild(&tree, 0, 4);
        move_to(&mut tree, &mut phones, a, new_leaf);
        // 1 call / 2 moves = 0.5 is still above the threshold, so the
        // replica was refreshed, not evicted
        assert_eq!(replica_at(&tree, leaf_b, a), Some(Some(new_leaf)));
    }

    #[test]
    fn out_of_coverage_answers_are_cached_as_voicemail() {
        // a threshold of 1 keeps the replicas admitted after the dark-spot
        // move (3 calls over 2 moves), so they flip to the cached answer
        let mut tree = RaTreeBuilder::new()
            .set_policy(Policy::Replication)
            .set_s_max(1.0)
            .build()
            .unwrap();
        let mut phones = PhoneDirectory::new();
        let leaf_a = grandchild(&tree, 0, 3);
        let leaf_b = grandchild(&tree, 6, 0);
        let a = place_phone(&mut tree, &mut phones, "a", leaf_a);
        let b = place_phone(&mut tree, &mut phones, "b", leaf_b);

        for _ in 0..3 {
            tree.call(&mut phones, b, a).unwrap();
        }
        // a walks into a dark spot; the trickle flips the replicas to the
        // cached out-of-coverage answer
        phones.set_position(a, Point::new(5000.0, 5000.0));
        tree.update_location(&mut phones, a).unwrap();
        assert_eq!(replica_at(&tree, leaf_b, a), Some(None));

        assert_eq!(
            tree.call(&mut phones, b, a).unwrap(),
            SearchOutcome::Voicemail
        );
    }

    #[test]
    fn local_calls_accumulate_on_the_caller_chain_only() {
        let mut tree = build_tree(Policy::Replication);
        let mut phones = PhoneDirectory::new();
        let leaf_a = grandchild(&tree, 0, 3);
        let leaf_b = grandchild(&tree, 6, 0);
        let a = place_phone(&mut tree, &mut phones, "a", leaf_a);
        let b = place_phone(&mut tree, &mut phones, "b", leaf_b);

        tree.call(&mut phones, b, a).unwrap();
        tree.call(&mut phones, b, a).unwrap();

        for address in tree.ancestors(leaf_b) {
            let count = tree.get_node_and(address, |n| n.local_calls_for(a)).unwrap();
            assert_eq!(count, 2);
        }
        // areas outside the caller chain never saw the calls
        assert_eq!(
            tree.get_node_and(leaf_a, |n| n.local_calls_for(a)).unwrap(),
            0
        );
    }
}
