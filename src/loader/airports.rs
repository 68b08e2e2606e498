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

//! Parses `Airports/apt.dat.gz` (version 810): airports, their
//! runways, beacons and ATC frequency tables.
//!
//! Only land airports (record code 1) are kept; seaports (16) and
//! heliports (17) close out whatever airport record preceded them but
//! otherwise produce nothing, matching spec.md §4.4's "seaports and
//! heliports are recognised only insofar as they terminate the
//! current airport" scope.

use std::path::Path;

use log::warn;

use crate::airport::{Airport, AtcFrequencies, AtcKind, Runway};
use crate::error::Error;
use crate::geodesy::LatLon;
use crate::measurements::constants::FEET_IN_METER;

use super::{check_version, read_gzip_lines};

/// Record codes that open or close an airport/seaport/heliport block.
const CODE_LAND_AIRPORT: u32 = 1;
const CODE_RUNWAY: u32 = 10;
const CODE_BEACON: u32 = 18;
const CODE_SEAPORT: u32 = 16;
const CODE_HELIPORT: u32 = 17;

fn atc_kind_for_code(code: u32) -> Option<AtcKind> {
    match code {
        50 => Some(AtcKind::Weather),
        51 => Some(AtcKind::Unicom),
        52 => Some(AtcKind::Delivery),
        53 => Some(AtcKind::Ground),
        54 => Some(AtcKind::Tower),
        55 => Some(AtcKind::Approach),
        56 => Some(AtcKind::Departure),
        _ => None,
    }
}

pub fn parse_airports(path: &Path) -> Result<Vec<Airport>, Error> {
    let lines = read_gzip_lines(path)?;
    check_version(&lines, "apt.dat", "810")?;

    let mut airports = Vec::new();
    let mut current: Option<Airport> = None;

    for (lineno, line) in lines.iter().enumerate().skip(2) {
        if line.is_empty() {
            continue;
        }
        if line == "99" {
            break;
        }

        let mut fields = line.splitn(2, char::is_whitespace);
        let Some(code) = fields.next().and_then(|c| c.parse::<u32>().ok()) else {
            warn!("apt.dat:{}: malformed line: {line:?}", lineno + 1);
            continue;
        };
        let rest = fields.next().unwrap_or("").trim();

        match code {
            CODE_LAND_AIRPORT | CODE_SEAPORT | CODE_HELIPORT => {
                if let Some(airport) = current.take() {
                    airports.push(airport);
                }
                if code == CODE_LAND_AIRPORT {
                    match parse_airport_header(rest) {
                        Some(airport) => current = Some(airport),
                        None => warn!("apt.dat:{}: malformed airport header: {rest:?}", lineno + 1),
                    }
                }
            }
            CODE_RUNWAY => {
                if let Some(airport) = current.as_mut() {
                    match parse_runway(rest) {
                        Some((runway, lit)) => {
                            airport.lighting |= lit;
                            airport.add_runway(runway);
                        }
                        None => warn!("apt.dat:{}: malformed runway: {rest:?}", lineno + 1),
                    }
                }
            }
            CODE_BEACON => {
                if let Some(airport) = current.as_mut() {
                    if let Some(beacon) = parse_beacon(rest) {
                        airport.set_beacon(beacon);
                    }
                }
            }
            code if atc_kind_for_code(code).is_some() => {
                if let Some(airport) = current.as_mut() {
                    let kind = atc_kind_for_code(code).unwrap();
                    match parse_atc_frequency(rest) {
                        Some((freq_raw, label)) => airport.freqs.insert_raw(kind, label, freq_raw),
                        None => warn!("apt.dat:{}: malformed ATC frequency: {rest:?}", lineno + 1),
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(airport) = current.take() {
        airports.push(airport);
    }

    Ok(airports)
}

fn parse_airport_header(rest: &str) -> Option<Airport> {
    // Peeled off by hand rather than `splitn`: header fields may be
    // padded with a run of spaces, and `splitn` treats each individual
    // whitespace character as its own split point.
    let mut s = rest;
    let mut fields: [&str; 3] = [""; 3];
    for field in fields.iter_mut() {
        s = s.trim_start();
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        if end == 0 {
            return None;
        }
        *field = &s[..end];
        s = &s[end..];
    }
    let remainder = s.trim_start();
    if remainder.is_empty() {
        return None;
    }
    let elev_ft: f64 = fields[0].parse().ok()?;
    let controlled: u32 = fields[1].parse().ok()?;
    let _lighting_schedule: &str = fields[2];

    let mut remainder_fields = remainder.splitn(2, char::is_whitespace);
    let code = remainder_fields.next()?;
    let name = remainder_fields.next().unwrap_or("").trim();

    // A real position is only known once a runway/beacon extends the
    // bounds; seed with (0, 0) and let those calls move it.
    let airport = Airport::new(code, name, LatLon::new(0.0, 0.0), elev_ft * FEET_IN_METER, controlled == 1, false);
    Some(airport)
}

/// Parses one runway record, returning the runway and whether it
/// carries any runway lighting (digits 2 and 5 of the six-digit
/// lighting code, 1-indexed; `'1'` in either means none).
fn parse_runway(rest: &str) -> Option<(Runway, bool)> {
    let mut fields = rest.split_whitespace();
    let lat: f64 = fields.next()?.parse().ok()?;
    let lon: f64 = fields.next()?.parse().ok()?;
    let raw_id = fields.next()?;

    if raw_id == "xxx" || raw_id.starts_with('H') {
        return None;
    }
    let id = raw_id.trim_end_matches('x');

    let heading: f64 = fields.next()?.parse().ok()?;
    let length_ft: f64 = fields.next()?.parse().ok()?;
    let _unused1: f64 = fields.next()?.parse().ok()?;
    let _unused2: f64 = fields.next()?.parse().ok()?;
    let width_ft: f64 = fields.next()?.parse().ok()?;
    let lighting = fields.next().unwrap_or("000000").as_bytes();

    let center = LatLon::new(lat, lon);
    let other_label = reciprocal_runway_label(id);

    let runway = Runway::new(
        id,
        other_label,
        center,
        heading,
        length_ft * FEET_IN_METER,
        width_ft * FEET_IN_METER,
    );

    let lit = lighting.len() >= 6 && (lighting[1] != b'1' || lighting[4] != b'1');
    Some((runway, lit))
}

/// The reciprocal runway label for `id`, e.g. `"09"` -> `"27"`,
/// `"09L"` -> `"27R"`. Used only as a display label; the loader parses
/// each physical runway end as its own `10`-code record, so this isn't
/// load-bearing for lookups.
fn reciprocal_runway_label(id: &str) -> String {
    let (digits, suffix) = id.split_at(id.len() - id.chars().last().map_or(0, |c| if c.is_alphabetic() { 1 } else { 0 }));
    let number: u32 = digits.parse().unwrap_or(0);
    let reciprocal_number = (number + 18 - 1) % 36 + 1;
    let reciprocal_suffix = match suffix {
        "L" => "R",
        "R" => "L",
        other => other,
    };
    format!("{reciprocal_number:02}{reciprocal_suffix}")
}

fn parse_beacon(rest: &str) -> Option<LatLon> {
    let mut fields = rest.split_whitespace();
    let lat: f64 = fields.next()?.parse().ok()?;
    let lon: f64 = fields.next()?.parse().ok()?;
    let beacon_type: u32 = fields.next()?.parse().ok()?;
    if beacon_type == 0 {
        return None;
    }
    Some(LatLon::new(lat, lon))
}

fn parse_atc_frequency(rest: &str) -> Option<(u32, &str)> {
    let mut fields = rest.splitn(2, char::is_whitespace);
    let freq: u32 = fields.next()?.parse().ok()?;
    let label = fields.next()?.trim();
    Some((freq, label))
}
