// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Atlas Core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Physical quantities used throughout the geodesy, navaid and flight-track
//! code. Mirrors the measurement-newtype pattern rather than passing around
//! bare `f64`s, so a metres/feet or nautical-mile/metre mixup is a type
//! error instead of a runtime bug.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod angle;
pub(crate) mod constants;
mod length;

pub use angle::{Angle, AngleUnit};
pub use length::{Length, LengthUnit};

/// A unit of measure for a physical quantity, convertible to and from its SI
/// base unit.
pub trait UnitOfMeasure<T>: Copy {
    fn si() -> Self;
    fn from_si(value: T, to: &Self) -> T;
    fn to_si(&self, value: &T) -> T;
}

/// A value tagged with the unit it is expressed in.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement<T, U> {
    pub(crate) value: T,
    pub(crate) unit: U,
}

impl<T, U> Measurement<T, U>
where
    T: Copy,
    U: UnitOfMeasure<T>,
{
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn unit(&self) -> &U {
        &self.unit
    }

    /// Returns the value expressed in the SI base unit.
    pub fn to_si(&self) -> T {
        self.unit.to_si(&self.value)
    }

    /// Converts this measurement to another unit of the same quantity.
    pub fn convert_to(&self, unit: U) -> Self {
        let si = self.to_si();
        Self {
            value: U::from_si(si, &unit),
            unit,
        }
    }
}
