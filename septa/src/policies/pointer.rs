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

//! # Basic Pointer
//! Every ancestor of a phone's cell keeps a pointer to the child on the
//! path toward it. The first ancestor that already has a record for a
//! registering phone is exactly the lowest common ancestor of the old and
//! new paths: everything below it on the old path is torn down, the LCA is
//! repointed at the new subtree, and nothing above it is touched. This
//! bounds a movement's update cost to the two path stubs under the LCA.

use crate::errors::{SeptaError, SeptaResult};
use crate::phone::{PhoneDirectory, PhoneIndex};
use crate::ratree::node::Record;
use crate::ratree::RaTree;
use core_septa::RaAddress;
use log::debug;

/// The upward half of a registration, entered at the new cell's parent.
pub(crate) fn register_up(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    address: RaAddress,
    child_caller: RaAddress,
) -> SeptaResult<()> {
    phones.charge_read(p);
    match tree.node(address).record(p) {
        Some(Record::Child(stale)) => {
            debug!("register found the LCA for phone {} at {}", p, address);
            unregister(tree, phones, p, stale)?;
            // the repoint rides on the deletions below
            tree.node_mut(address)
                .insert_record(p, Record::Child(child_caller));
        }
        Some(_) => return Err(SeptaError::corrupt(address, p)),
        None => {
            if let Some(parent) = tree.node(address).parent_address() {
                register_up(tree, phones, p, parent, address)?;
            }
            phones.charge_write(p);
            tree.node_mut(address)
                .insert_record(p, Record::Child(child_caller));
        }
    }
    Ok(())
}

/// Tears down the chain from `address` to the old cell, deleting one record
/// per area.
pub(crate) fn unregister(
    tree: &mut RaTree,
    phones: &mut PhoneDirectory,
    p: PhoneIndex,
    address: RaAddress,
) -> SeptaResult<()> {
    phones.charge_read(p);
    match tree.node(address).record(p) {
        Some(Record::Child(next)) => unregister(tree, phones, p, next)?,
        Some(Record::Phone(_)) => {}
        _ => return Err(SeptaError::corrupt(address, p)),
    }
    phones.charge_write(p);
    tree.node_mut(address).remove_record(p);
    Ok(())
}
