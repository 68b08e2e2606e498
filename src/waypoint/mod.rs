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

//! The common node type on the globe: fixes and the various flavours of
//! navaid. Rather than a deep `Waypoint -> Fix/Navaid -> NDB/VOR/...` class
//! hierarchy, this is a tagged variant with a small shared struct for the
//! id/position/bounds every kind carries (spec.md §9, "Deep inheritance
//! hierarchy").

mod navaid;
mod system;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use navaid::{Dme, Gs, Loc, Marker, MarkerKind, Ndb, Tacan, Vor};
pub use system::{NavaidSystem, NavaidSystemKind, NavaidSystemRegistry};

use crate::culler::Cullable;
use crate::geodesy::{LatLon, Sphere, Vec3};

/// Fields shared by every waypoint kind: its (non-globally-unique) id, its
/// position, and its bounding sphere (radius zero for a [`Fix`], radius
/// equal to range for a transmitting navaid).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaypointCommon {
    pub id: String,
    pub position: LatLon,
    pub bounds: Sphere,
}

impl WaypointCommon {
    pub fn new(id: impl Into<String>, position: LatLon, radius_m: f64) -> Self {
        let mut bounds = Sphere::empty();
        bounds.extend_point(position.to_cart(0.0));
        bounds.radius = radius_m;
        Self {
            id: id.into(),
            position,
            bounds,
        }
    }
}

/// A named geographic point used for navigation, with no transmitting
/// equipment of its own.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fix {
    pub common: WaypointCommon,
    /// Whether this fix is used by at least one low-altitude airway. Set by
    /// the airway loader (spec.md §4.4); defaults to terminal-only.
    enroute: bool,
}

impl Fix {
    pub fn new(id: impl Into<String>, position: LatLon) -> Self {
        Self {
            common: WaypointCommon::new(id, position, 0.0),
            enroute: false,
        }
    }

    pub fn is_enroute(&self) -> bool {
        self.enroute
    }

    pub fn set_enroute(&mut self, enroute: bool) {
        self.enroute = enroute;
    }
}

/// Any entity on the globe: a plain fix, or a transmitting navaid.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Waypoint {
    Fix(Fix),
    Ndb(Ndb),
    Vor(Vor),
    Dme(Dme),
    Tacan(Tacan),
    Loc(Loc),
    Gs(Gs),
    Marker(Marker),
}

impl Waypoint {
    pub fn common(&self) -> &WaypointCommon {
        match self {
            Self::Fix(w) => &w.common,
            Self::Ndb(w) => &w.common,
            Self::Vor(w) => &w.common,
            Self::Dme(w) => &w.common,
            Self::Tacan(w) => &w.common,
            Self::Loc(w) => &w.common,
            Self::Gs(w) => &w.common,
            Self::Marker(w) => &w.common,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn position(&self) -> LatLon {
        self.common().position
    }

    pub fn bounds(&self) -> Sphere {
        self.common().bounds
    }

    /// The type tag used by the searcher, e.g. `"VOR:"`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Fix(_) => "FIX:",
            Self::Ndb(_) => "NDB:",
            Self::Vor(_) => "VOR:",
            Self::Dme(_) => "DME:",
            Self::Tacan(_) => "TAC:",
            Self::Loc(_) => "ILS:",
            Self::Gs(_) => "ILS:",
            Self::Marker(m) => match m.kind {
                MarkerKind::Outer => "OM:",
                MarkerKind::Middle => "MM:",
                MarkerKind::Inner => "IM:",
            },
        }
    }

    /// The navaid's tuned frequency in kHz, if it transmits one.
    pub fn frequency_khz(&self) -> Option<u32> {
        match self {
            Self::Fix(_) | Self::Marker(_) => None,
            Self::Ndb(w) => Some(w.freq_khz),
            Self::Vor(w) => Some(w.freq_khz),
            Self::Dme(w) => Some(w.freq_khz),
            Self::Tacan(w) => Some(w.freq_khz),
            Self::Loc(w) => Some(w.freq_khz),
            Self::Gs(w) => Some(w.freq_khz),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Fix(_) => None,
            Self::Ndb(w) => Some(&w.name),
            Self::Vor(w) => Some(&w.name),
            Self::Dme(w) => Some(&w.name),
            Self::Tacan(w) => Some(&w.name),
            Self::Loc(w) => Some(&w.name),
            Self::Gs(w) => Some(&w.name),
            Self::Marker(w) => Some(&w.name),
        }
    }
}

/// The capability set a searchable entity needs: tokens to index, a
/// location to sort by distance, and a display string. Spec.md §9 calls
/// this out explicitly as the replacement for dynamic dispatch over a
/// vector of heterogeneous objects.
pub trait Searchable {
    fn tokens(&self) -> Vec<String>;
    fn location(&self) -> Vec3;
    fn as_string(&self) -> String;

    fn distance_squared(&self, from: Vec3) -> f64 {
        let loc = self.location();
        let dx = loc.x - from.x;
        let dy = loc.y - from.y;
        let dz = loc.z - from.z;
        dx * dx + dy * dy + dz * dz
    }
}

impl Searchable for Waypoint {
    fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![self.id().to_string(), self.type_tag().to_lowercase()];
        if let Some(name) = self.name() {
            tokens.extend(name.split_whitespace().map(str::to_string));
        }
        tokens
    }

    fn location(&self) -> Vec3 {
        self.position().to_cart(0.0)
    }

    fn as_string(&self) -> String {
        match self.name() {
            Some(name) => format!("{} {} {}", self.type_tag(), self.id(), name),
            None => format!("{} {}", self.type_tag(), self.id()),
        }
    }
}

impl Cullable for Waypoint {
    fn bounds(&self) -> Sphere {
        self.common().bounds
    }

    fn latitude(&self) -> f64 {
        self.common().position.lat
    }

    fn longitude(&self) -> f64 {
        self.common().position.lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_has_zero_radius_bounds() {
        let fix = Fix::new("FOO", LatLon::new(40.0, -120.0));
        assert_eq!(fix.common.bounds.radius, 0.0);
    }

    #[test]
    fn fix_defaults_to_not_enroute() {
        let fix = Fix::new("FOO", LatLon::new(40.0, -120.0));
        assert!(!fix.is_enroute());
    }

    #[test]
    fn waypoint_as_string_matches_vor_format() {
        let vor = Vor::new(
            "SFO",
            "SAN FRANCISCO VOR",
            LatLon::new(37.61899, -122.37408),
            130.0,
            115800,
            130_000.0,
            17.0,
        );
        let wp = Waypoint::Vor(vor);
        assert!(wp.as_string().starts_with("VOR: SFO SAN FRANCISCO VOR"));
    }
}
