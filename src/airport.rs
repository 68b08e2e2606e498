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

//! Airports: runways, ATC frequency tables, and the bounding sphere that
//! covers both.
//!
//! Runway corner geometry and the ATC-frequency digit-repair rule
//! (spec.md §4.4, "frequencies ending in digit 2 or 7 gain a trailing
//! 5") live on [`Runway::new`] and [`AtcFrequencies::insert_raw`]
//! respectively, so the loader only has to hand over raw field values.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geodesy::{LatLon, Sphere, Vec3};
use crate::waypoint::Searchable;

/// The seven ATC service categories an airport may publish frequencies for.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AtcKind {
    Weather,
    Unicom,
    Delivery,
    Ground,
    Tower,
    Approach,
    Departure,
}

/// `AtcKind -> label -> set<frequency in Hz>`, e.g. Tower -> "TWR" ->
/// {118300000}.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AtcFrequencies {
    by_kind: BTreeMap<AtcKind, BTreeMap<String, BTreeSet<u32>>>,
}

impl AtcFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raw loader-format frequency (hundredths of a MHz, with
    /// the trailing-digit repair applied) under `kind`/`label`.
    ///
    /// Values whose last digit is 2 or 7 are missing a trailing 5 (a
    /// quirk of the source database's encoding); every raw value gains
    /// one more digit (the repaired 5, or a bare trailing zero) before
    /// the result is scaled from hundredths of a MHz to Hz.
    pub fn insert_raw(&mut self, kind: AtcKind, label: impl Into<String>, raw: u32) {
        let repaired = match raw % 10 {
            2 | 7 => raw * 10 + 5,
            _ => raw * 10,
        };
        let freq_hz = repaired * 1000;
        self.by_kind
            .entry(kind)
            .or_default()
            .entry(label.into())
            .or_default()
            .insert(freq_hz);
    }

    pub fn get(&self, kind: AtcKind, label: &str) -> Option<&BTreeSet<u32>> {
        self.by_kind.get(&kind)?.get(label)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &AtcKind> {
        self.by_kind.keys()
    }
}

/// One physical runway, identified by its two reciprocal labels.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Runway {
    pub label: String,
    pub other_label: String,
    pub center: LatLon,
    pub heading_deg: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub bounds: Sphere,
}

impl Runway {
    /// Builds a runway from centre, heading and dimensions, computing the
    /// four corner points of the oriented rectangle and a bounding sphere
    /// that contains them.
    pub fn new(
        label: impl Into<String>,
        other_label: impl Into<String>,
        center: LatLon,
        heading_deg: f64,
        length_m: f64,
        width_m: f64,
    ) -> Self {
        let corners = runway_corners(center, heading_deg, length_m, width_m);
        let mut bounds = Sphere::empty();
        bounds.extend_point(center.to_cart(0.0));
        for corner in &corners {
            bounds.extend_point(corner.to_cart(0.0));
        }
        Self {
            label: label.into(),
            other_label: other_label.into(),
            center,
            heading_deg,
            length_m,
            width_m,
            bounds,
        }
    }

    pub fn corners(&self) -> [LatLon; 4] {
        runway_corners(self.center, self.heading_deg, self.length_m, self.width_m)
    }
}

/// The four corners of the runway's oriented rectangle, offset from the
/// centre along the heading (length) and cross-heading (width) axes.
fn runway_corners(center: LatLon, heading_deg: f64, length_m: f64, width_m: f64) -> [LatLon; 4] {
    let half_len = length_m / 2.0;
    let half_wid = width_m / 2.0;
    let along = heading_deg.to_radians();
    let across = (heading_deg + 90.0).to_radians();

    let corner = |len_sign: f64, wid_sign: f64| -> LatLon {
        let dx = len_sign * half_len * along.sin() + wid_sign * half_wid * across.sin();
        let dy = len_sign * half_len * along.cos() + wid_sign * half_wid * across.cos();
        offset_latlon(center, dx, dy)
    };
    [
        corner(1.0, 1.0),
        corner(1.0, -1.0),
        corner(-1.0, -1.0),
        corner(-1.0, 1.0),
    ]
}

/// Offsets `origin` by `east_m`/`north_m` using a flat-earth local
/// approximation; adequate for runway-sized (sub-5km) displacements.
fn offset_latlon(origin: LatLon, east_m: f64, north_m: f64) -> LatLon {
    const METERS_PER_DEG_LAT: f64 = 111_320.0;
    let dlat = north_m / METERS_PER_DEG_LAT;
    let meters_per_deg_lon = METERS_PER_DEG_LAT * origin.lat.to_radians().cos();
    let dlon = if meters_per_deg_lon.abs() < 1e-6 {
        0.0
    } else {
        east_m / meters_per_deg_lon
    };
    LatLon::new(origin.lat + dlat, origin.lon + dlon)
}

/// A fixed ground installation: airport, seaport or heliport. Only
/// land airports (loader code 1) are kept; seaports/heliports (16/17)
/// are filtered by the loader before reaching this type.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub elev_m: f64,
    pub controlled: bool,
    pub lighting: bool,
    pub beacon: Option<LatLon>,
    pub runways: Vec<Runway>,
    pub freqs: AtcFrequencies,
    pub bounds: Sphere,
}

impl Airport {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        position: LatLon,
        elev_m: f64,
        controlled: bool,
        lighting: bool,
    ) -> Self {
        let mut bounds = Sphere::empty();
        bounds.extend_point(position.to_cart(elev_m));
        Self {
            code: code.into(),
            name: name.into(),
            elev_m,
            controlled,
            lighting,
            beacon: None,
            runways: Vec::new(),
            freqs: AtcFrequencies::new(),
            bounds,
        }
    }

    /// Adds a runway and extends the airport's bounding sphere by its
    /// centre and corners.
    pub fn add_runway(&mut self, runway: Runway) {
        self.bounds.extend_sphere(&runway.bounds);
        self.runways.push(runway);
    }

    pub fn set_beacon(&mut self, beacon: LatLon) {
        self.bounds.extend_point(beacon.to_cart(self.elev_m));
        self.beacon = Some(beacon);
    }

    pub fn location(&self) -> Vec3 {
        self.bounds.center
    }
}

impl Searchable for Airport {
    fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![self.code.clone(), "air:".to_string()];
        tokens.extend(self.name.split_whitespace().map(str::to_string));
        tokens
    }

    fn location(&self) -> Vec3 {
        self.bounds.center
    }

    fn as_string(&self) -> String {
        format!("AIR: {} {}", self.code, self.name)
    }
}
