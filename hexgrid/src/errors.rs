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

//! The errors that can occur when a hexagon is constructed or subdivided.
use std::error::Error;
use std::fmt;

///
pub type HexGridResult<T> = Result<T, HexGridError>;

/// Error type for the geometry kernel.
#[derive(Debug)]
pub enum HexGridError {
    /// A hexagon was requested with a non-positive or non-finite side
    /// length, or with a degenerate direction vector.
    InvalidGeometry {
        /// What exactly was off about the inputs
        reason: &'static str,
    },
}

impl fmt::Display for HexGridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HexGridError::InvalidGeometry { reason } => {
                write!(f, "invalid hexagon geometry: {}", reason)
            }
        }
    }
}

impl Error for HexGridError {}

impl HexGridError {
    /// Shorthand used by the constructors.
    pub fn invalid(reason: &'static str) -> HexGridError {
        HexGridError::InvalidGeometry { reason }
    }
}
