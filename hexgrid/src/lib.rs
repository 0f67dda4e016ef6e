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
//! # Hex Grid
//! Planar hexagon geometry: vertex generation, point containment, the
//! seven-way subdivision that underpins the registration-area hierarchy,
//! and edge-neighbor centers.

#![allow(dead_code)]
#![warn(missing_docs)]

mod point;
#[doc(inline)]
pub use point::Point;

mod hexagon;
pub use hexagon::{opposite_neighbor, ChildOrientation, Hexagon, GLOBAL_NORTH};

pub mod errors;
pub use errors::{HexGridError, HexGridResult};

/// A hexagon has six of everything: vertices, edges and edge neighbors.
pub const NUM_SIDES: usize = 6;
/// One subdivision produces six ring children plus the central child.
pub const NUM_CHILDREN: usize = 7;
