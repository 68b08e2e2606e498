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

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{geo_inverse, Vec3};

/// A geographic point in degrees. Latitude is positive north, longitude
/// positive east; southern/western values are negative.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in metres, via Vincenty's formula.
    pub fn distance_to(&self, other: &LatLon) -> f64 {
        geo_inverse(*self, *other).2
    }

    /// Initial true bearing from this point to `other`, in degrees.
    pub fn bearing_to(&self, other: &LatLon) -> f64 {
        geo_inverse(*self, *other).0
    }

    /// Converts to WGS84 ECEF cartesian coordinates at the given elevation.
    pub fn to_cart(&self, elev_m: f64) -> Vec3 {
        super::geod_to_cart(self.lat, self.lon, elev_m)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = LatLon::new(48.0, 11.0);
        assert_eq!(p.distance_to(&p), 0.0);
    }
}
