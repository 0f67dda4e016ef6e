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

#![allow(dead_code)]
#![warn(missing_docs)]

//! # Septa
//! A simulator for mobile-phone location management over a hierarchical
//! cellular network. A region is tiled by a recursive seven-way hexagonal
//! decomposition; the resulting tree of registration areas records, at every
//! level, enough metadata to route a call from any leaf cell to any phone in
//! coverage.
//!
//! ## Policies
//! Four interchangeable policies share the tree shape and the event surface
//! but differ in what each registration area stores and how registration,
//! unregistration and search walk the tree:
//!
//! * **Basic pointer**: each ancestor points at the child on the path to
//!   the phone; updates stop at the lowest common ancestor of the old and
//!   new leaves.
//! * **Basic value**: each ancestor stores the absolute leaf, so a search
//!   resolves in one hop once any ancestor record is found.
//! * **Replication**: pointer registration plus per-area replica caches,
//!   admitted and evicted by the local call-to-mobility ratio.
//! * **Forwarding pointer**: instead of tearing the stale path down, the
//!   stale next hop receives a lateral pointer into the new subtree.
//!
//! Every policy charges reads and writes to the phones it manipulates with
//! one shared convention, which is what makes the policies comparable.

extern crate fxhash;
extern crate smallvec;

pub mod errors;
pub use errors::{SeptaError, SeptaResult};

mod ratree;
pub use ratree::*;

pub mod phone;
pub use phone::{Phone, PhoneDirectory, PhoneIndex};

pub mod policies;
pub use policies::{Policy, SearchOutcome};

/// The tree addresses nodes by layer; the addressing schema is the pair of
/// the depth and the node index within that depth.
pub use core_septa::*;
