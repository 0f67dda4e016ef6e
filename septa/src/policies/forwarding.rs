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

//! # Forwarding Pointer
//! Registration is the cheap side here. When the upward walk meets the
//! lowest common ancestor it does not tear the old path down to rebuild it:
//! the records strictly below the stale next hop are pruned, and the stale
//! hop itself receives a lateral pointer into the new subtree. Searches may
//! therefore traverse a chain of lateral hops before turning downward, and
//! records can live at areas that are no longer ancestors of the phone.
//! A full purge (dark spot) must sweep the whole tree for the same reason.

use crate::errors::{SeptaError, SeptaResult};
use crate::phone::{PhoneDirectory, PhoneIndex};
use crate::ratree::node::Record;
use crate::ratree::RaTree;
use core_septa::RaAddress;
use log::debug;

/// The upward half of a registration. The charged cost of a movement is
/// the new-leaf install plus the lateral rewrite; the prune below the stale
/// hop and the first-visit backfills are maintenance outside the
/// comparison currency.
pub(crate) fn register_up(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    address: RaAddress,
    child_caller: RaAddress,
) -> SeptaResult<()> {
    phones.charge_read(p);
    match tree.node(address).record(p) {
        Some(Record::Child(stale_hop)) => {
            prune_below(tree, phones, p, stale_hop)?;
            if stale_hop == child_caller {
                // the hop already leads into the new subtree (the phone
                // came back to a cell it once forwarded from); no lateral
                // is needed
                debug!("register met its own hop for phone {} at {}", p, address);
            } else {
                debug!(
                    "register found the LCA for phone {} at {}; forwarding {} into the new subtree",
                    p, address, stale_hop
                );
                phones.charge_write(p);
                tree.node_mut(stale_hop)
                    .insert_record(p, Record::Child(child_caller));
                tree.node_mut(stale_hop).set_instantiated(p);
                // this area's own record still points at the stale hop,
                // which now forwards; nothing above changes
            }
        }
        Some(_) => return Err(SeptaError::corrupt(address, p)),
        None => {
            if let Some(parent) = tree.node(address).parent_address() {
                register_up(tree, phones, p, parent, address)?;
            }
        }
    }
    if !tree.node(address).is_instantiated(p) {
        // first record ever written here: backfill so searches can route
        // down through this area
        tree.node_mut(address).set_instantiated(p);
        tree.node_mut(address)
            .insert_record(p, Record::Child(child_caller));
    }
    Ok(())
}

/// Removes the records strictly below the stale hop `s`: whatever chain its
/// record leads to. `s` keeps a record (it is about to be rewritten
/// laterally), so a hop that is itself the old cell has nothing to prune.
fn prune_below(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    s: RaAddress,
) -> SeptaResult<()> {
    phones.charge_read(p);
    match tree.node(s).record(p) {
        Some(Record::Child(below)) => prune_chain(tree, phones, p, below),
        Some(Record::Phone(_)) => Ok(()),
        _ => Err(SeptaError::corrupt(s, p)),
    }
}

pub(crate) fn prune_chain(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    address: RaAddress,
) -> SeptaResult<()> {
    phones.charge_read(p);
    match tree.node(address).record(p) {
        Some(Record::Child(next)) => prune_chain(tree, phones, p, next)?,
        Some(Record::Phone(_)) => {}
        _ => return Err(SeptaError::corrupt(address, p)),
    }
    tree.node_mut(address).remove_record(p);
    // a pruned area may be written again on a later visit
    tree.node_mut(address).clear_instantiated(p);
    Ok(())
}

/// Dark-spot deregistration: lateral chains can leave records anywhere, so
/// the purge visits every area, deleting its record (one charged write
/// each) and resetting the instantiation flag so a phone that re-enters
/// coverage can be recorded again.
pub(crate) fn dark_spot_sweep(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
) -> SeptaResult<()> {
    for layer in tree.layers_mut() {
        for node in layer.nodes_mut() {
            if node.remove_record(p).is_some() {
                phones.charge_write(p);
            }
            node.clear_instantiated(p);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::phone::PhoneDirectory;
    use crate::policies::tests::*;
    use crate::policies::{Policy, SearchOutcome};
    use crate::ratree::node::Record;
    use hexgrid::Point;

    #[test]
    fn cross_root_move_installs_a_lateral_and_costs_two_writes() {
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let old_leaf = grandchild(&tree, 0, 3);
        let new_leaf = grandchild(&tree, 6, 0);
        let a = place_phone(&mut tree, &mut phones, "a", old_leaf);

        let root = tree.root_address();
        let old_parent = tree.get_node_and(old_leaf, |n| n.parent_address()).unwrap().unwrap();
        let new_parent = tree.get_node_and(new_leaf, |n| n.parent_address()).unwrap().unwrap();
        let root_record_before = tree.get_node_and(root, |n| n.record(a)).unwrap();

        let writes_before = phones.phone(a).num_writes();
        move_to(&mut tree, &mut phones, a, new_leaf);
        assert_eq!(phones.phone(a).num_writes() - writes_before, 2);

        // the root still points at the old subtree, whose head forwards
        // laterally into the new one
        assert_eq!(tree.get_node_and(root, |n| n.record(a)).unwrap(), root_record_before);
        assert_eq!(
            tree.get_node_and(old_parent, |n| n.record(a)).unwrap(),
            Some(Record::Child(new_parent))
        );
        assert_eq!(
            tree.get_node_and(new_parent, |n| n.record(a)).unwrap(),
            Some(Record::Child(new_leaf))
        );
        assert_eq!(
            tree.get_node_and(new_leaf, |n| n.record(a)).unwrap(),
            Some(Record::Phone(a))
        );
        assert!(tree.get_node_and(old_leaf, |n| n.record(a)).unwrap().is_none());
    }

    #[test]
    fn searches_traverse_the_lateral_chain() {
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let a_leaf = grandchild(&tree, 0, 3);
        let a = place_phone(&mut tree, &mut phones, "a", a_leaf);
        let b_leaf = grandchild(&tree, 3, 1);
        let b = place_phone(&mut tree, &mut phones, "b", b_leaf);

        let new_leaf = grandchild(&tree, 6, 0);
        move_to(&mut tree, &mut phones, a, new_leaf);

        let outcome = tree.call(&mut phones, b, a).unwrap();
        assert_eq!(outcome, SearchOutcome::Connected(new_leaf));
    }

    #[test]
    fn sibling_move_forwards_from_the_old_cell() {
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let old_leaf = grandchild(&tree, 2, 1);
        let new_leaf = grandchild(&tree, 2, 5);
        let a = place_phone(&mut tree, &mut phones, "a", old_leaf);

        let writes_before = phones.phone(a).num_writes();
        move_to(&mut tree, &mut phones, a, new_leaf);
        assert_eq!(phones.phone(a).num_writes() - writes_before, 2);

        // the old cell itself becomes the forwarding hop
        assert_eq!(
            tree.get_node_and(old_leaf, |n| n.record(a)).unwrap(),
            Some(Record::Child(new_leaf))
        );
        let outcome = {
            let b_leaf = grandchild(&tree, 2, 1);
            let b = place_phone(&mut tree, &mut phones, "b", b_leaf);
            tree.call(&mut phones, b, a).unwrap()
        };
        assert_eq!(outcome, SearchOutcome::Connected(new_leaf));
    }

    #[test]
    fn every_move_costs_at_most_two_writes() {
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let a_leaf = grandchild(&tree, 0, 0);
        let a = place_phone(&mut tree, &mut phones, "a", a_leaf);

        let hops = [
            grandchild(&tree, 0, 5),
            grandchild(&tree, 1, 2),
            grandchild(&tree, 6, 6),
            grandchild(&tree, 1, 2),
            grandchild(&tree, 4, 3),
        ];
        for (i, &hop) in hops.iter().enumerate() {
            let writes_before = phones.phone(a).num_writes();
            move_to(&mut tree, &mut phones, a, hop);
            let delta = phones.phone(a).num_writes() - writes_before;
            assert!(delta <= 2, "movement cost {} writes", delta);
            // the phone stays reachable through the forwarding chains
            let b = phones
                .add(&format!("probe-{}", i), center_of(&tree, grandchild(&tree, 5, 5)))
                .unwrap();
            tree.update_location(&mut phones, b).unwrap();
            assert_eq!(
                tree.call(&mut phones, b, a).unwrap(),
                SearchOutcome::Connected(hop)
            );
        }
    }

    #[test]
    fn dark_spot_sweeps_laterals_and_reentry_is_searchable() {
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let a_leaf = grandchild(&tree, 0, 3);
        let a = place_phone(&mut tree, &mut phones, "a", a_leaf);
        let b_leaf = grandchild(&tree, 3, 1);
        let b = place_phone(&mut tree, &mut phones, "b", b_leaf);

        // build up a lateral, then drop out of coverage
        let lateral_leaf = grandchild(&tree, 6, 0);
        move_to(&mut tree, &mut phones, a, lateral_leaf);
        phones.set_position(a, Point::new(5000.0, 5000.0));
        tree.update_location(&mut phones, a).unwrap();
        assert!(records_for(&tree, a).is_empty());
        assert_eq!(tree.call(&mut phones, b, a).unwrap(), SearchOutcome::Voicemail);

        // re-entering coverage rebuilds a searchable chain
        let back = grandchild(&tree, 1, 4);
        phones.set_position(a, center_of(&tree, back));
        tree.update_location(&mut phones, a).unwrap();
        assert_eq!(phones.phone(a).pcs_cell(), Some(back));
        assert_eq!(
            tree.call(&mut phones, b, a).unwrap(),
            SearchOutcome::Connected(back)
        );
    }

    #[test]
    fn returning_to_a_forwarding_cell_stays_searchable() {
        // a once hosted the phone and forwards from there; coming back must
        // not leave the cell pointing at itself
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let first = grandchild(&tree, 2, 1);
        let second = grandchild(&tree, 2, 5);
        let a = place_phone(&mut tree, &mut phones, "a", first);
        let b_leaf = grandchild(&tree, 3, 1);
        let b = place_phone(&mut tree, &mut phones, "b", b_leaf);

        move_to(&mut tree, &mut phones, a, second);
        assert_eq!(
            tree.get_node_and(first, |n| n.record(a)).unwrap(),
            Some(Record::Child(second))
        );

        move_to(&mut tree, &mut phones, a, first);
        assert_eq!(
            tree.get_node_and(first, |n| n.record(a)).unwrap(),
            Some(Record::Phone(a))
        );
        // the abandoned cell was cleaned up behind the lateral
        assert!(tree.get_node_and(second, |n| n.record(a)).unwrap().is_none());
        assert_eq!(
            tree.call(&mut phones, b, a).unwrap(),
            SearchOutcome::Connected(first)
        );
    }

    #[test]
    fn repeated_subtree_revisits_stay_searchable() {
        // moving away and back again exercises the backfill after a prune
        let mut tree = build_tree(Policy::ForwardingPointer);
        let mut phones = PhoneDirectory::new();
        let a_leaf = grandchild(&tree, 0, 3);
        let a = place_phone(&mut tree, &mut phones, "a", a_leaf);
        let b_leaf = grandchild(&tree, 3, 1);
        let b = place_phone(&mut tree, &mut phones, "b", b_leaf);

        let hop1 = grandchild(&tree, 6, 0);
        move_to(&mut tree, &mut phones, a, hop1);
        let hop2 = grandchild(&tree, 1, 3);
        move_to(&mut tree, &mut phones, a, hop2);
        let hop3 = grandchild(&tree, 6, 4);
        move_to(&mut tree, &mut phones, a, hop3);

        assert_eq!(
            tree.call(&mut phones, b, a).unwrap(),
            SearchOutcome::Connected(grandchild(&tree, 6, 4))
        );
    }
}
