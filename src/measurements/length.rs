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

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{constants, Measurement, UnitOfMeasure};

/// Length unit with _m_ (metres) as the SI unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub enum LengthUnit {
    Meters,
    Feet,
    NauticalMiles,
}

impl UnitOfMeasure<f64> for LengthUnit {
    fn si() -> Self {
        Self::Meters
    }

    fn from_si(value: f64, to: &Self) -> f64 {
        match to {
            Self::Meters => value,
            Self::Feet => value / constants::FEET_IN_METER,
            Self::NauticalMiles => value / constants::NAUTICAL_MILE_IN_METER,
        }
    }

    fn to_si(&self, value: &f64) -> f64 {
        match self {
            Self::Meters => *value,
            Self::Feet => value * constants::FEET_IN_METER,
            Self::NauticalMiles => value * constants::NAUTICAL_MILE_IN_METER,
        }
    }
}

/// A length, distance or radius.
pub type Length = Measurement<f64, LengthUnit>;

impl Length {
    pub fn m(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Meters,
        }
    }

    pub fn ft(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Feet,
        }
    }

    pub fn nm(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::NauticalMiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_nm_to_m() {
        let l = Length::nm(1.0).convert_to(LengthUnit::Meters);
        assert!((l.value() - 1852.0).abs() < 1e-9);
    }

    #[test]
    fn convert_m_to_ft() {
        let l = Length::m(1.0).convert_to(LengthUnit::Feet);
        assert!((l.value() - 3.280_839_895).abs() < 1e-6);
    }
}
