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

//! The errors that can occur while the tree is built or while the policies
//! walk it. Geometry problems are floated up from `hexgrid`.

use crate::phone::PhoneIndex;
use core_septa::RaAddress;
use hexgrid::HexGridError;
use std::error::Error;
use std::fmt;
use std::io;

/// Helper type for a call that could go wrong.
pub type SeptaResult<T> = Result<T, SeptaError>;

/// Error type for the simulator core. A `CorruptRecord` is an invariant
/// violation: a record the active policy guarantees to exist is missing or
/// has the wrong shape, which indicates a policy bug and fails fast.
#[derive(Debug)]
pub enum SeptaError {
    /// A geometry failure during tree construction.
    HexGridError(HexGridError),
    /// An event referenced a phone id that is not in the directory.
    UnknownPhone(String),
    /// Two phones were registered under the same id.
    DuplicatePhone(String),
    /// The phone is in no cell, so the requested operation has no anchor.
    OutOfCoverage(String),
    /// A record expected by the active policy is missing or malformed.
    CorruptRecord {
        /// The registration area holding (or missing) the record
        address: RaAddress,
        /// The phone the record is keyed by
        phone: PhoneIndex,
    },
    /// IO error when writing the result report
    IoError(io::Error),
}

impl fmt::Display for SeptaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SeptaError::HexGridError(ref e) => write!(f, "{}", e),
            SeptaError::IoError(ref e) => write!(f, "{}", e),
            SeptaError::UnknownPhone(ref id) => {
                write!(f, "phone {:?} is not in the directory", id)
            }
            SeptaError::DuplicatePhone(ref id) => {
                write!(f, "phone {:?} is already in the directory", id)
            }
            SeptaError::OutOfCoverage(ref id) => {
                write!(f, "phone {:?} is outside the coverage area", id)
            }
            SeptaError::CorruptRecord { address, phone } => write!(
                f,
                "registration area {} holds a missing or malformed record for phone {}",
                address, phone
            ),
        }
    }
}

impl Error for SeptaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            SeptaError::HexGridError(ref e) => Some(e),
            SeptaError::IoError(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<HexGridError> for SeptaError {
    fn from(err: HexGridError) -> Self {
        SeptaError::HexGridError(err)
    }
}

impl From<io::Error> for SeptaError {
    fn from(err: io::Error) -> Self {
        SeptaError::IoError(err)
    }
}

impl SeptaError {
    /// Shorthand for the fail-fast invariant violation.
    pub(crate) fn corrupt(address: RaAddress, phone: PhoneIndex) -> SeptaError {
        SeptaError::CorruptRecord { address, phone }
    }
}
