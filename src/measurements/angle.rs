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

use super::{Measurement, UnitOfMeasure};

/// Angle unit with radians as the SI unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

impl UnitOfMeasure<f64> for AngleUnit {
    fn si() -> Self {
        Self::Radians
    }

    fn from_si(value: f64, to: &Self) -> f64 {
        match to {
            Self::Radians => value,
            Self::Degrees => value.to_degrees(),
        }
    }

    fn to_si(&self, value: &f64) -> f64 {
        match self {
            Self::Radians => *value,
            Self::Degrees => value.to_radians(),
        }
    }
}

/// An angle, e.g. a bearing, heading or latitude/longitude offset.
pub type Angle = Measurement<f64, AngleUnit>;

impl Angle {
    pub fn deg(value: f64) -> Self {
        Self {
            value,
            unit: AngleUnit::Degrees,
        }
    }

    pub fn rad(value: f64) -> Self {
        Self {
            value,
            unit: AngleUnit::Radians,
        }
    }

    /// Normalizes the angle to the half-open range `[0, 360)` degrees.
    pub fn normalized(&self) -> Self {
        let deg = *self.convert_to(AngleUnit::Degrees).value();
        let wrapped = ((deg % 360.0) + 360.0) % 360.0;
        Self::deg(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_negative_angle() {
        assert!((Angle::deg(-10.0).normalized().value() - 350.0).abs() < 1e-9);
    }

    #[test]
    fn normalizes_angle_over_360() {
        assert!((Angle::deg(370.0).normalized().value() - 10.0).abs() < 1e-9);
    }
}
