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

//! # Basic Value
//! Every ancestor stores the absolute leaf cell, so a search resolves in a
//! single hop once any ancestor answers. Movements are the expensive side:
//! the whole ancestor chain of the new cell has to be brought up to date.
//! The overwrites at and above the lowest common ancestor ride on the
//! unregister deletions, so the charged cost still comes out at two writes
//! per level under the LCA.

use crate::errors::{SeptaError, SeptaResult};
use crate::phone::{PhoneDirectory, PhoneIndex};
use crate::ratree::node::Record;
use crate::ratree::RaTree;
use core_septa::RaAddress;
use log::debug;

/// The upward half of a registration: walk to the root overwriting every
/// ancestor with the new leaf. The lowest ancestor that already had a
/// record is the LCA; its old value names the stale leaf, and the old path
/// is unwound from there exactly once.
pub(crate) fn register_up(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    start: RaAddress,
    new_leaf: RaAddress,
) -> SeptaResult<()> {
    let mut cursor = Some(start);
    let mut torn_down = false;
    while let Some(address) = cursor {
        phones.charge_read(p);
        match tree.node(address).record(p) {
            None => {
                phones.charge_write(p);
                tree.node_mut(address)
                    .insert_record(p, Record::Leaf(new_leaf));
            }
            Some(Record::Leaf(old_leaf)) => {
                // overwrite first so the unwind below stops here
                tree.node_mut(address)
                    .insert_record(p, Record::Leaf(new_leaf));
                if !torn_down {
                    debug!("register found the LCA for phone {} at {}", p, address);
                    unregister(tree, phones, p, old_leaf)?;
                    torn_down = true;
                }
            }
            Some(_) => return Err(SeptaError::corrupt(address, p)),
        }
        cursor = tree.node(address).parent_address();
    }
    Ok(())
}

/// Unwinds a stale path: delete the old cell's record, then keep deleting
/// upward while the parent still names the old cell. The walk stops at the
/// first ancestor that no longer matches, which the new registration has
/// already rewritten (or soon will).
pub(crate) fn unregister(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    old_leaf: RaAddress,
) -> SeptaResult<()> {
    phones.charge_read(p);
    match tree.node(old_leaf).record(p) {
        Some(Record::Phone(_)) => {}
        _ => return Err(SeptaError::corrupt(old_leaf, p)),
    }
    phones.charge_write(p);
    tree.node_mut(old_leaf).remove_record(p);

    let mut cursor = tree.node(old_leaf).parent_address();
    while let Some(address) = cursor {
        phones.charge_read(p);
        match tree.node(address).record(p) {
            Some(Record::Leaf(leaf)) if leaf == old_leaf => {
                phones.charge_write(p);
                tree.node_mut(address).remove_record(p);
                cursor = tree.node(address).parent_address();
            }
            _ => break,
        }
    }
    Ok(())
}
