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

//! Parses `Navaids/awy.dat.gz` (version 640): named chains of segments
//! between two endpoints given by id and (redundantly) by position.
//!
//! Endpoint resolution follows the original's two-pass lookup: among
//! every already-loaded fix/navaid sharing the endpoint's id, prefer
//! one whose position matches exactly; otherwise fall back to the
//! closest by great-circle distance. A low-altitude airway marks a
//! resolved [`Fix`] endpoint as enroute; an id with no match at all
//! falls back to a synthetic fix at the given position rather than
//! failing the whole record.

use std::collections::HashMap;
use std::path::Path;

use log::warn;

use crate::error::Error;
use crate::geodesy::LatLon;
use crate::waypoint::{Fix, Waypoint};

use super::{check_version, read_gzip_lines};
use crate::airway::{Airway, AirwaySegment};

struct RawSegment {
    start_id: String,
    start_lat: f64,
    start_lon: f64,
    end_id: String,
    end_lat: f64,
    end_lon: f64,
    is_low: bool,
    base_fl: u32,
    top_fl: u32,
    name: String,
}

fn parse_airway_line(line: &str) -> Option<RawSegment> {
    let mut fields = line.split_whitespace();
    let start_id = fields.next()?.to_string();
    let start_lat: f64 = fields.next()?.parse().ok()?;
    let start_lon: f64 = fields.next()?.parse().ok()?;
    let end_id = fields.next()?.to_string();
    let end_lat: f64 = fields.next()?.parse().ok()?;
    let end_lon: f64 = fields.next()?.parse().ok()?;
    let low_high: u32 = fields.next()?.parse().ok()?;
    let base_fl: u32 = fields.next()?.parse().ok()?;
    let top_fl: u32 = fields.next()?.parse().ok()?;
    let name: String = fields.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return None;
    }
    let is_low = match low_high {
        1 => true,
        2 => false,
        _ => return None,
    };
    Some(RawSegment {
        start_id,
        start_lat,
        start_lon,
        end_id,
        end_lat,
        end_lon,
        is_low,
        base_fl,
        top_fl,
        name,
    })
}

/// Maps an id to the indices of every waypoint sharing it, so an
/// airway endpoint (given only as id + position) can be resolved
/// against the already-loaded fix/navaid set.
fn build_id_index(waypoints: &[Waypoint]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, wp) in waypoints.iter().enumerate() {
        index.entry(wp.id().to_string()).or_default().push(i);
    }
    index
}

/// Resolves one airway endpoint: exact position match wins; otherwise
/// nearest by great-circle distance; otherwise a synthetic fix.
#[allow(clippy::too_many_arguments)]
fn resolve_endpoint(
    waypoints: &mut [Waypoint],
    index: &HashMap<String, Vec<usize>>,
    id: &str,
    lat: f64,
    lon: f64,
    is_low: bool,
    lineno: usize,
) -> Waypoint {
    let Some(candidates) = index.get(id) else {
        warn!("awy.dat:{lineno}: no candidate for endpoint {id:?}, leaving unresolved");
        return Waypoint::Fix(Fix::new(id, LatLon::new(lat, lon)));
    };

    for &i in candidates {
        let pos = waypoints[i].position();
        if pos.lat == lat && pos.lon == lon {
            if let Waypoint::Fix(fix) = &mut waypoints[i] {
                if is_low {
                    fix.set_enroute(true);
                }
            }
            return waypoints[i].clone();
        }
    }

    let target = LatLon::new(lat, lon);
    let closest = candidates
        .iter()
        .copied()
        .min_by(|&a, &b| {
            let da = waypoints[a].position().distance_to(&target);
            let db = waypoints[b].position().distance_to(&target);
            da.partial_cmp(&db).unwrap()
        });

    match closest {
        Some(i) => {
            if let Waypoint::Fix(fix) = &mut waypoints[i] {
                if is_low {
                    fix.set_enroute(true);
                }
            }
            waypoints[i].clone()
        }
        None => Waypoint::Fix(Fix::new(id, target)),
    }
}

pub fn parse_airways(path: &Path, waypoints: &mut [Waypoint]) -> Result<Vec<Airway>, Error> {
    let lines = read_gzip_lines(path)?;
    check_version(&lines, "awy.dat", "640")?;

    let index = build_id_index(waypoints);
    let mut by_name: HashMap<(String, bool), Airway> = HashMap::new();

    for (lineno, line) in lines.iter().enumerate().skip(2) {
        if line.is_empty() {
            continue;
        }
        if line == "99" {
            break;
        }

        let Some(raw) = parse_airway_line(line) else {
            warn!("awy.dat:{}: malformed line: {line:?}", lineno + 1);
            continue;
        };

        let start = resolve_endpoint(waypoints, &index, &raw.start_id, raw.start_lat, raw.start_lon, raw.is_low, lineno + 1);
        let end = resolve_endpoint(waypoints, &index, &raw.end_id, raw.end_lat, raw.end_lon, raw.is_low, lineno + 1);
        let segment = AirwaySegment::new(raw.name.clone(), start, end, raw.base_fl, raw.top_fl, raw.is_low);

        by_name
            .entry((raw.name.clone(), raw.is_low))
            .or_insert_with(|| Airway::new(raw.name, raw.is_low))
            .append(segment);
    }

    Ok(by_name.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, lat: f64, lon: f64) -> Waypoint {
        Waypoint::Fix(Fix::new(id, LatLon::new(lat, lon)))
    }

    #[test]
    fn exact_position_match_marks_low_fix_enroute() {
        let mut waypoints = vec![wp("AAA", 10.0, 10.0)];
        let index = build_id_index(&waypoints);
        let resolved = resolve_endpoint(&mut waypoints, &index, "AAA", 10.0, 10.0, true, 1);
        assert_eq!(resolved.id(), "AAA");
        match &waypoints[0] {
            Waypoint::Fix(f) => assert!(f.is_enroute()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn no_match_falls_back_to_synthetic_fix() {
        let mut waypoints: Vec<Waypoint> = vec![];
        let index = build_id_index(&waypoints);
        let resolved = resolve_endpoint(&mut waypoints, &index, "ZZZ", 1.0, 2.0, true, 1);
        assert_eq!(resolved.id(), "ZZZ");
    }

    #[test]
    fn mismatched_position_picks_closest_candidate() {
        let mut waypoints = vec![wp("AAA", 10.0, 10.0), wp("AAA", 50.0, 50.0)];
        let index = build_id_index(&waypoints);
        let resolved = resolve_endpoint(&mut waypoints, &index, "AAA", 10.1, 10.1, false, 1);
        assert_eq!(resolved.position(), LatLon::new(10.0, 10.0));
    }

    #[test]
    fn closest_candidate_match_marks_low_fix_enroute_too() {
        let mut waypoints = vec![wp("AAA", 10.0, 10.0), wp("AAA", 50.0, 50.0)];
        let index = build_id_index(&waypoints);
        resolve_endpoint(&mut waypoints, &index, "AAA", 10.1, 10.1, true, 1);
        match &waypoints[0] {
            Waypoint::Fix(f) => assert!(f.is_enroute()),
            _ => unreachable!(),
        }
        match &waypoints[1] {
            Waypoint::Fix(f) => assert!(!f.is_enroute()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn parse_airway_line_rejects_bad_low_high_code() {
        let line = "AAA 10.0 10.0 BBB 11.0 11.0 9 0 180 V23";
        assert!(parse_airway_line(line).is_none());
    }
}
