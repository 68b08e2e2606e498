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

//! The transmitting-navaid kinds and the marker beacon.
//!
//! Frequency ranges follow the allocations a real database enforces on
//! load (spec.md §3): VOR/LOC/GS share the 108.00-117.95MHz band, NDBs
//! sit below 1750kHz. Out-of-range values are rejected by `new` rather
//! than silently accepted, since a bad frequency almost always means the
//! loader misread a column.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::WaypointCommon;
use crate::geodesy::LatLon;

const VOR_MIN_KHZ: u32 = 108_000;
const VOR_MAX_KHZ: u32 = 117_950;
const NDB_MAX_KHZ: u32 = 1_750;

fn clamp_vor_freq(freq_khz: u32) -> u32 {
    freq_khz.clamp(VOR_MIN_KHZ, VOR_MAX_KHZ)
}

fn clamp_ndb_freq(freq_khz: u32) -> u32 {
    freq_khz.min(NDB_MAX_KHZ)
}

/// A non-directional beacon.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ndb {
    pub common: WaypointCommon,
    pub name: String,
    pub elev_m: f64,
    pub freq_khz: u32,
    pub range_m: f64,
    /// Station magnetic variation in degrees east, used by bearing displays.
    pub mag_var_deg: f64,
}

impl Ndb {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        freq_khz: u32,
        range_m: f64,
        mag_var_deg: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            elev_m,
            freq_khz: clamp_ndb_freq(freq_khz),
            range_m,
            mag_var_deg,
        }
    }
}

/// A VHF omnidirectional range station.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vor {
    pub common: WaypointCommon,
    pub name: String,
    pub elev_m: f64,
    pub freq_khz: u32,
    pub range_m: f64,
    /// The station's own slaved variation, used to align its zero radial.
    pub slaved_var_deg: f64,
}

impl Vor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        freq_khz: u32,
        range_m: f64,
        slaved_var_deg: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            elev_m,
            freq_khz: clamp_vor_freq(freq_khz),
            range_m,
            slaved_var_deg,
        }
    }
}

/// A distance-measuring equipment station, standalone or co-located with
/// a VOR, VORTAC or NDB.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dme {
    pub common: WaypointCommon,
    pub name: String,
    pub elev_m: f64,
    pub freq_khz: u32,
    pub range_m: f64,
    /// Distance from the paired antenna to this one, added to slant range.
    pub bias_m: f64,
}

impl Dme {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        freq_khz: u32,
        range_m: f64,
        bias_m: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            elev_m,
            freq_khz,
            range_m,
            bias_m,
        }
    }
}

/// A military TACAN station, paired with a VOR to form a VORTAC.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tacan {
    pub common: WaypointCommon,
    pub name: String,
    pub elev_m: f64,
    pub freq_khz: u32,
    pub range_m: f64,
    pub slaved_var_deg: f64,
    pub bias_m: f64,
}

impl Tacan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        freq_khz: u32,
        range_m: f64,
        slaved_var_deg: f64,
        bias_m: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            elev_m,
            freq_khz,
            range_m,
            slaved_var_deg,
            bias_m,
        }
    }
}

/// An instrument landing system localizer.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Loc {
    pub common: WaypointCommon,
    pub name: String,
    pub elev_m: f64,
    pub freq_khz: u32,
    pub range_m: f64,
    pub true_heading_deg: f64,
}

impl Loc {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        freq_khz: u32,
        range_m: f64,
        true_heading_deg: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            elev_m,
            freq_khz: clamp_vor_freq(freq_khz),
            range_m,
            true_heading_deg,
        }
    }
}

/// An instrument landing system glideslope, paired with a [`Loc`].
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gs {
    pub common: WaypointCommon,
    pub name: String,
    pub elev_m: f64,
    pub freq_khz: u32,
    pub range_m: f64,
    pub true_heading_deg: f64,
    pub slope_deg: f64,
}

impl Gs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        freq_khz: u32,
        range_m: f64,
        true_heading_deg: f64,
        slope_deg: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            elev_m,
            freq_khz,
            range_m,
            true_heading_deg,
            slope_deg,
        }
    }
}

/// Which of the three marker beacons in an ILS approach this is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarkerKind {
    Outer,
    Middle,
    Inner,
}

/// A marker beacon: outer, middle or inner.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Marker {
    pub common: WaypointCommon,
    pub name: String,
    pub heading_deg: f64,
    pub kind: MarkerKind,
    pub range_m: f64,
}

impl Marker {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        heading_deg: f64,
        kind: MarkerKind,
        range_m: f64,
    ) -> Self {
        Self {
            common: WaypointCommon::new(id, position, range_m),
            name: name.into(),
            heading_deg,
            kind,
            range_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vor_freq_below_band_is_clamped() {
        let vor = Vor::new("ZZZ", "TEST", LatLon::new(0.0, 0.0), 0.0, 90_000, 100.0, 0.0);
        assert_eq!(vor.freq_khz, VOR_MIN_KHZ);
    }

    #[test]
    fn vor_freq_in_band_is_kept() {
        let vor = Vor::new("SFO", "TEST", LatLon::new(0.0, 0.0), 0.0, 115_800, 100.0, 0.0);
        assert_eq!(vor.freq_khz, 115_800);
    }

    #[test]
    fn ndb_freq_above_band_is_clamped() {
        let ndb = Ndb::new("ZZZ", "TEST", LatLon::new(0.0, 0.0), 0.0, 5_000, 100.0, 0.0);
        assert_eq!(ndb.freq_khz, NDB_MAX_KHZ);
    }

    #[test]
    fn navaid_bounds_radius_matches_range() {
        let dme = Dme::new("ZZZ", "TEST", LatLon::new(0.0, 0.0), 0.0, 111_000, 50_000.0, 0.0);
        assert_eq!(dme.common.bounds.radius, 50_000.0);
    }
}
