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

//! Airways: ordered chains of segments between resolved waypoints.
//!
//! The loader (spec.md §4.4) is the only writer of segment endpoints;
//! [`Airway::prepend`]/[`Airway::append`] trust the caller to add
//! segments in connectivity order and do not re-validate it, matching
//! the original `Culler.hxx`-adjacent `airway.?xx` loader contract.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geodesy::Sphere;
use crate::waypoint::{Searchable, Waypoint};

/// One leg of an airway, between two resolved waypoints.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirwaySegment {
    pub name: String,
    pub start: Waypoint,
    pub end: Waypoint,
    pub base_fl: u32,
    pub top_fl: u32,
    pub is_low: bool,
    pub length_m: f64,
    pub bounds: Sphere,
}

impl AirwaySegment {
    pub fn new(
        name: impl Into<String>,
        start: Waypoint,
        end: Waypoint,
        base_fl: u32,
        top_fl: u32,
        is_low: bool,
    ) -> Self {
        let length_m = start.position().distance_to(&end.position());
        let mut bounds = Sphere::empty();
        bounds.extend_point(start.location());
        bounds.extend_point(end.location());
        Self {
            name: name.into(),
            start,
            end,
            base_fl,
            top_fl,
            is_low,
            length_m,
            bounds,
        }
    }
}

/// A named airway: a low- or high-altitude ordered chain of segments.
///
/// A single segment may participate in more than one airway (two airways
/// sharing a leg); segments are owned by value here, so shared legs are
/// duplicated rather than referenced, matching how the loader builds
/// each airway's deque independently.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Airway {
    pub name: String,
    pub is_low: bool,
    segments: VecDeque<AirwaySegment>,
}

impl Airway {
    pub fn new(name: impl Into<String>, is_low: bool) -> Self {
        Self {
            name: name.into(),
            is_low,
            segments: VecDeque::new(),
        }
    }

    pub fn prepend(&mut self, segment: AirwaySegment) {
        self.segments.push_front(segment);
    }

    pub fn append(&mut self, segment: AirwaySegment) {
        self.segments.push_back(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &AirwaySegment> {
        self.segments.iter()
    }

    /// The `i`-th waypoint along the chain: `segments[i-1].end`, with
    /// `nth_waypoint(0) == segments[0].start`.
    pub fn nth_waypoint(&self, i: usize) -> Option<&Waypoint> {
        if i == 0 {
            self.segments.front().map(|s| &s.start)
        } else {
            self.segments.get(i - 1).map(|s| &s.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::LatLon;
    use crate::waypoint::Fix;

    fn fix(id: &str, lat: f64, lon: f64) -> Waypoint {
        Waypoint::Fix(Fix::new(id, LatLon::new(lat, lon)))
    }

    #[test]
    fn nth_waypoint_zero_is_first_segment_start() {
        let mut airway = Airway::new("V23", true);
        airway.append(AirwaySegment::new(
            "V23",
            fix("AAA", 10.0, 10.0),
            fix("BBB", 11.0, 11.0),
            0,
            180,
            true,
        ));
        assert_eq!(airway.nth_waypoint(0).unwrap().id(), "AAA");
        assert_eq!(airway.nth_waypoint(1).unwrap().id(), "BBB");
    }

    #[test]
    fn prepend_puts_segment_before_existing() {
        let mut airway = Airway::new("V23", true);
        airway.append(AirwaySegment::new(
            "V23",
            fix("BBB", 11.0, 11.0),
            fix("CCC", 12.0, 12.0),
            0,
            180,
            true,
        ));
        airway.prepend(AirwaySegment::new(
            "V23",
            fix("AAA", 10.0, 10.0),
            fix("BBB", 11.0, 11.0),
            0,
            180,
            true,
        ));
        assert_eq!(airway.nth_waypoint(0).unwrap().id(), "AAA");
        assert_eq!(airway.nth_waypoint(1).unwrap().id(), "BBB");
        assert_eq!(airway.nth_waypoint(2).unwrap().id(), "CCC");
    }

    #[test]
    fn segment_bounds_contain_both_endpoints() {
        let seg = AirwaySegment::new("V23", fix("AAA", 10.0, 10.0), fix("BBB", 11.0, 11.0), 0, 180, true);
        assert!(seg.bounds.contains(&fix("AAA", 10.0, 10.0).position().to_cart(0.0)));
        assert!(seg.bounds.contains(&fix("BBB", 11.0, 11.0).position().to_cart(0.0)));
    }
}
