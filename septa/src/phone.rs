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

//! # The Phone Model
//! Phones live in a dense directory; record tables throughout the tree key
//! on the directory index rather than the id string. The per-phone read and
//! write counters accumulated here are the currency every policy is
//! compared in, so all charging funnels through the directory.

use crate::errors::{SeptaError, SeptaResult};
use core_septa::RaAddress;
use fxhash::FxHashMap;
use hexgrid::Point;

/// To make things more obvious, we type the index into the phone directory.
pub type PhoneIndex = usize;

/// One mobile phone: its identity, physical position, the PCS cell that
/// currently contains it (if any), and its accumulated counters.
#[derive(Debug, Clone)]
pub struct Phone {
    id: String,
    position: Point,
    pcs_cell: Option<RaAddress>,
    mobility: u64,
    num_reads: u64,
    num_writes: u64,
}

impl Phone {
    pub(crate) fn new(id: String, position: Point) -> Phone {
        Phone {
            id,
            position,
            pcs_cell: None,
            mobility: 0,
            num_reads: 0,
            num_writes: 0,
        }
    }

    ///
    pub fn id(&self) -> &str {
        &self.id
    }

    ///
    pub fn position(&self) -> Point {
        self.position
    }

    /// The leaf registration area currently containing this phone, or none
    /// when the phone sits in a dark spot.
    pub fn pcs_cell(&self) -> Option<RaAddress> {
        self.pcs_cell
    }

    /// Successful cell transitions, including entering and leaving coverage.
    pub fn mobility(&self) -> u64 {
        self.mobility
    }

    /// Record-table reads charged to this phone. Monotone.
    pub fn num_reads(&self) -> u64 {
        self.num_reads
    }

    /// Record-table writes charged to this phone. Monotone.
    pub fn num_writes(&self) -> u64 {
        self.num_writes
    }
}

/// The phone directory: dense storage plus the id-to-index map.
#[derive(Debug, Default)]
pub struct PhoneDirectory {
    phones: Vec<Phone>,
    names: FxHashMap<String, PhoneIndex>,
}

impl PhoneDirectory {
    ///
    pub fn new() -> PhoneDirectory {
        PhoneDirectory {
            phones: Vec::new(),
            names: FxHashMap::default(),
        }
    }

    /// Adds a phone at a physical position. The phone starts out of
    /// coverage; route it through `RaTree::update_location` to register it.
    pub fn add(&mut self, id: &str, position: Point) -> SeptaResult<PhoneIndex> {
        if self.names.contains_key(id) {
            return Err(SeptaError::DuplicatePhone(id.to_string()));
        }
        let index = self.phones.len();
        self.phones.push(Phone::new(id.to_string(), position));
        self.names.insert(id.to_string(), index);
        Ok(index)
    }

    /// Looks an id up, failing with `UnknownPhone` for strangers.
    pub fn index_of(&self, id: &str) -> SeptaResult<PhoneIndex> {
        self.names
            .get(id)
            .copied()
            .ok_or_else(|| SeptaError::UnknownPhone(id.to_string()))
    }

    ///
    pub fn phone(&self, p: PhoneIndex) -> &Phone {
        &self.phones[p]
    }

    ///
    pub fn len(&self) -> usize {
        self.phones.len()
    }

    ///
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    /// Phones in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &Phone> {
        self.phones.iter()
    }

    /// Moves the phone's physical position without touching any records.
    pub fn set_position(&mut self, p: PhoneIndex, position: Point) {
        self.phones[p].position = position;
    }

    /// Total searches across all phones, for the aggregate report.
    pub fn total_reads(&self) -> u64 {
        self.phones.iter().map(|p| p.num_reads).sum()
    }

    /// Total updates across all phones, for the aggregate report.
    pub fn total_writes(&self) -> u64 {
        self.phones.iter().map(|p| p.num_writes).sum()
    }

    pub(crate) fn set_cell(&mut self, p: PhoneIndex, cell: Option<RaAddress>) {
        self.phones[p].pcs_cell = cell;
    }

    pub(crate) fn bump_mobility(&mut self, p: PhoneIndex) {
        self.phones[p].mobility += 1;
    }

    pub(crate) fn charge_read(&mut self, p: PhoneIndex) {
        self.phones[p].num_reads += 1;
    }

    pub(crate) fn charge_write(&mut self, p: PhoneIndex) {
        self.phones[p].num_writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_round_trip() {
        let mut phones = PhoneDirectory::new();
        let a = phones.add("a", Point::new(1.0, 2.0)).unwrap();
        let b = phones.add("b", Point::new(3.0, 4.0)).unwrap();
        assert_eq!(phones.len(), 2);
        assert_eq!(phones.index_of("a").unwrap(), a);
        assert_eq!(phones.index_of("b").unwrap(), b);
        assert_eq!(phones.phone(a).id(), "a");
        assert!(phones.phone(a).pcs_cell().is_none());
    }

    #[test]
    fn unknown_and_duplicate_ids() {
        let mut phones = PhoneDirectory::new();
        phones.add("a", Point::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            phones.index_of("nobody"),
            Err(SeptaError::UnknownPhone(_))
        ));
        assert!(matches!(
            phones.add("a", Point::new(1.0, 1.0)),
            Err(SeptaError::DuplicatePhone(_))
        ));
    }

    #[test]
    fn counters_are_monotone() {
        let mut phones = PhoneDirectory::new();
        let a = phones.add("a", Point::new(0.0, 0.0)).unwrap();
        phones.charge_read(a);
        phones.charge_write(a);
        phones.charge_write(a);
        phones.bump_mobility(a);
        assert_eq!(phones.phone(a).num_reads(), 1);
        assert_eq!(phones.phone(a).num_writes(), 2);
        assert_eq!(phones.phone(a).mobility(), 1);
        assert_eq!(phones.total_reads(), 1);
        assert_eq!(phones.total_writes(), 2);
    }
}
