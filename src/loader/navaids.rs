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

//! Parses `Navaids/nav.dat.gz` (version 810): NDBs, VORs, ILS
//! localizers/glideslopes, markers, and the DME/TACAN family, with the
//! component navaids of a co-located installation merged into a single
//! [`NavaidSystem`].
//!
//! Frequencies in the source file are tenths of a kHz for every type
//! except NDB, which is already kHz; ranges are nautical miles;
//! elevations are feet. Markers carry no range of their own and are
//! given a fixed one nautical mile out, just large enough to contain
//! their rendered size.

use std::collections::HashMap;
use std::path::Path;

use log::warn;

use crate::error::Error;
use crate::geodesy::LatLon;
use crate::measurements::constants::{FEET_IN_METER as FEET_TO_METERS, NAUTICAL_MILE_IN_METER as NM_TO_METERS};
use crate::waypoint::{Dme, Gs, Loc, Marker, MarkerKind, Ndb, NavaidSystem, Tacan, Vor, Waypoint};

use super::{check_version, parse_data_cycle, read_gzip_lines};

const MARKER_RANGE_NM: f64 = 1.0;
/// The data cycle after which DME/TACAN subtype tokens shifted one
/// position to the right in the source file (spec.md §4.2).
const DME_SHIFT_CYCLE: f64 = 2007.09;

struct RawLine<'a> {
    line_code: u32,
    lat: f64,
    lon: f64,
    elev_ft: f64,
    freq_raw: u32,
    range_nm: f64,
    magvar: f64,
    id: &'a str,
    rest: &'a str,
}

/// Splits a navaid-file record into its fixed leading columns and the
/// free-text tail (name plus embedded subtype token). Columns are
/// separated by a run of one or more spaces, not a single delimiter, so
/// each leading field is peeled off by hand rather than via `splitn`
/// (which treats every individual whitespace character as its own
/// split point and would hand back empty fields between them).
fn parse_raw_line(line: &str) -> Option<RawLine<'_>> {
    let mut s = line;
    let mut fields: [&str; 7] = [""; 7];
    for field in fields.iter_mut() {
        s = s.trim_start();
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        if end == 0 {
            return None;
        }
        *field = &s[..end];
        s = &s[end..];
    }
    let rest = s.trim_start();
    if rest.is_empty() {
        return None;
    }

    let line_code: u32 = fields[0].parse().ok()?;
    let lat: f64 = fields[1].parse().ok()?;
    let lon: f64 = fields[2].parse().ok()?;
    let elev_ft: f64 = fields[3].parse().ok()?;
    let freq_raw: u32 = fields[4].parse().ok()?;
    let range_nm: f64 = fields[5].parse().ok()?;
    let magvar: f64 = fields[6].parse().ok()?;

    let mut rest_fields = rest.splitn(2, char::is_whitespace);
    let id = rest_fields.next()?;
    let rest = rest_fields.next().unwrap_or("").trim();
    Some(RawLine {
        line_code,
        lat,
        lon,
        elev_ft,
        freq_raw,
        range_nm,
        magvar,
        id,
        rest,
    })
}

/// The last whitespace-delimited token of `s`, the embedded subtype.
fn last_token(s: &str) -> Option<&str> {
    s.split_whitespace().last()
}

/// The token immediately before `s`'s last token: used to recover the
/// real subtype of a post-2007.09 DME/TACAN line, where the subtype
/// moved one token to the right (spec.md §4.2, "great DME shift").
fn second_last_token(s: &str) -> Option<&str> {
    let mut it = s.split_whitespace().rev();
    it.next()?;
    it.next()
}

/// Strips the trailing subtype token (and the name text up to it) from
/// `rest`, returning the station/approach name alone.
fn strip_subtype<'a>(rest: &'a str, subtype: &str) -> &'a str {
    match rest.rfind(subtype) {
        Some(idx) => rest[..idx].trim_end(),
        None => rest,
    }
}

enum ParsedNavaid {
    Ndb(Ndb),
    Vor(Vor),
    Loc(Loc),
    Gs(Gs),
    Marker(Marker),
    /// A DME or TACAN record, tagged with the real subtype recovered
    /// from the shift heuristic.
    DmeLike { subtype: DmeSubtype, dme: Option<Dme>, tacan: Option<Tacan> },
}

#[derive(PartialEq, Eq, Debug)]
enum DmeSubtype {
    DmeIls,
    Tacan,
    VorDme,
    Vortac,
    Dme,
    NdbDme,
    Unknown,
}

/// Parses every navaid in `path`, returning the plain waypoints (NDB,
/// VOR, LOC, GS, markers, and standalone/ILS DMEs) and the co-located
/// systems assembled from paired VOR/DME, VOR/TACAN and NDB/DME
/// records.
///
/// A malformed record is logged and skipped; only an unreadable file
/// or a bad version header aborts the load.
pub fn parse_navaids(path: &Path) -> Result<(Vec<Waypoint>, Vec<NavaidSystem>), Error> {
    let lines = read_gzip_lines(path)?;
    check_version(&lines, "nav.dat", "810")?;
    let cycle = parse_data_cycle(&lines[1]);

    let mut waypoints = Vec::new();
    let mut vors: HashMap<String, Vor> = HashMap::new();
    let mut ndbs: HashMap<String, Ndb> = HashMap::new();
    let mut pending_dme: Vec<(String, Dme)> = Vec::new();
    let mut pending_tacan: Vec<(String, Tacan)> = Vec::new();
    let mut vor_dme_pairs: Vec<(Vor, Dme)> = Vec::new();
    let mut vortac_pairs: Vec<(Vor, Tacan)> = Vec::new();
    let mut ndb_dme_pairs: Vec<(Ndb, Dme)> = Vec::new();

    for (lineno, line) in lines.iter().enumerate().skip(2) {
        if line.is_empty() {
            continue;
        }
        if line == "99" {
            break;
        }

        match parse_navaid_line(line, cycle) {
            Ok(Some(parsed)) => match parsed {
                ParsedNavaid::Ndb(ndb) => {
                    ndbs.insert(ndb.common.id.clone(), ndb);
                }
                ParsedNavaid::Vor(vor) => {
                    vors.insert(vor.common.id.clone(), vor);
                }
                ParsedNavaid::Loc(loc) => waypoints.push(Waypoint::Loc(loc)),
                ParsedNavaid::Gs(gs) => waypoints.push(Waypoint::Gs(gs)),
                ParsedNavaid::Marker(marker) => waypoints.push(Waypoint::Marker(marker)),
                ParsedNavaid::DmeLike { subtype, dme, tacan } => match subtype {
                    DmeSubtype::DmeIls | DmeSubtype::Dme => {
                        if let Some(dme) = dme {
                            waypoints.push(Waypoint::Dme(dme));
                        }
                    }
                    DmeSubtype::Tacan => {
                        if let Some(tacan) = tacan {
                            waypoints.push(Waypoint::Tacan(tacan));
                        }
                    }
                    DmeSubtype::VorDme => {
                        if let Some(dme) = dme {
                            pending_dme.push((dme.common.id.clone(), dme));
                        }
                    }
                    DmeSubtype::Vortac => {
                        if let Some(tacan) = tacan {
                            pending_tacan.push((tacan.common.id.clone(), tacan));
                        }
                    }
                    DmeSubtype::NdbDme => {
                        if let Some(dme) = dme {
                            if let Some(ndb) = ndbs.get(&dme.common.id) {
                                ndb_dme_pairs.push((ndb.clone(), dme));
                            } else {
                                warn!("no matching NDB for NDB-DME {}", dme.common.id);
                            }
                        }
                    }
                    DmeSubtype::Unknown => {}
                },
            },
            Ok(None) => continue,
            Err(why) => {
                warn!("nav.dat:{}: {why}", lineno + 1);
                continue;
            }
        }
    }

    for (id, dme) in pending_dme {
        if let Some(vor) = vors.remove(&id) {
            vor_dme_pairs.push((vor, dme));
        } else {
            warn!("no matching VOR for VOR-DME {id}");
        }
    }
    for (id, tacan) in pending_tacan {
        if let Some(vor) = vors.remove(&id) {
            vortac_pairs.push((vor, tacan));
        } else {
            warn!("no matching VOR for VORTAC {id}");
        }
    }

    for (_, ndb) in ndbs {
        waypoints.push(Waypoint::Ndb(ndb));
    }
    for (_, vor) in vors {
        waypoints.push(Waypoint::Vor(vor));
    }

    let mut systems: Vec<NavaidSystem> = Vec::new();
    for (vor, dme) in vor_dme_pairs {
        systems.push(NavaidSystem::VorDme(vor, dme));
    }
    for (vor, tacan) in vortac_pairs {
        systems.push(NavaidSystem::Vortac(vor, tacan));
    }
    for (ndb, dme) in ndb_dme_pairs {
        systems.push(NavaidSystem::NdbDme(ndb, dme));
    }

    systems.extend(assemble_ils(&mut waypoints));

    Ok((waypoints, systems))
}

/// Pulls every [`Loc`] out of `waypoints` and reassembles it into an
/// [`NavaidSystem::Ils`], attaching any glideslope or DME-ILS that
/// shares its id, and any marker whose runway name suffix matches the
/// localizer's own. GS/DME share the LOC's id in the source file, but a
/// marker's id is a station identifier of its own (e.g. `"IAA"`),
/// completely unrelated to the LOC's; the two are tied together only by
/// the `<runway suffix>` left in each one's `name` field once the
/// airport token and subtype are stripped off.
fn assemble_ils(waypoints: &mut Vec<Waypoint>) -> Vec<NavaidSystem> {
    let mut locs = Vec::new();
    let mut gss: HashMap<String, Gs> = HashMap::new();
    let mut dmes: HashMap<String, Dme> = HashMap::new();
    let mut markers: HashMap<String, Vec<Marker>> = HashMap::new();
    let mut rest = Vec::new();

    for wp in waypoints.drain(..) {
        match wp {
            Waypoint::Loc(loc) => locs.push(loc),
            Waypoint::Gs(gs) => {
                gss.insert(gs.common.id.clone(), gs);
            }
            Waypoint::Dme(dme) => {
                dmes.insert(dme.common.id.clone(), dme);
            }
            Waypoint::Marker(marker) => {
                markers.entry(marker.name.clone()).or_default().push(marker);
            }
            other => rest.push(other),
        }
    }

    let mut systems = Vec::new();
    for loc in locs {
        let id = loc.common.id.clone();
        let gs = gss.remove(&id);
        let dme = dmes.remove(&id);
        let markers = markers.remove(&loc.name).unwrap_or_default();
        systems.push(NavaidSystem::Ils { loc, gs, dme, markers });
    }

    for (_, gs) in gss {
        rest.push(Waypoint::Gs(gs));
    }
    for (_, dme) in dmes {
        rest.push(Waypoint::Dme(dme));
    }
    for (_, markers) in markers {
        rest.extend(markers.into_iter().map(Waypoint::Marker));
    }

    *waypoints = rest;
    systems
}

fn parse_navaid_line(line: &str, cycle: f64) -> Result<Option<ParsedNavaid>, String> {
    let raw = parse_raw_line(line).ok_or("malformed navaid line")?;
    let subtype = last_token(raw.rest).ok_or("navaid line has no subtype token")?;

    let freq_khz = if raw.line_code == 2 {
        raw.freq_raw
    } else {
        raw.freq_raw * 10
    };
    let position = LatLon::new(raw.lat, raw.lon);
    let elev_m = raw.elev_ft * FEET_TO_METERS;
    let range_m = raw.range_nm * NM_TO_METERS;

    match raw.line_code {
        2 => {
            let name = strip_subtype(raw.rest, subtype);
            let ndb = Ndb::new(raw.id, name, position, elev_m, freq_khz, range_m, raw.magvar);
            Ok(Some(ParsedNavaid::Ndb(ndb)))
        }
        3 => {
            let name = strip_subtype(raw.rest, subtype);
            let vor = Vor::new(raw.id, name, position, elev_m, freq_khz, range_m, raw.magvar);
            Ok(Some(ParsedNavaid::Vor(vor)))
        }
        4 | 5 => {
            // ILS elements: the name field is "<airport> <runway...>";
            // the airport token is dropped.
            let after_airport = raw.rest.splitn(2, char::is_whitespace).nth(1).unwrap_or(raw.rest);
            let name = strip_subtype(after_airport, subtype);
            let loc = Loc::new(raw.id, name, position, elev_m, freq_khz, range_m, raw.magvar);
            Ok(Some(ParsedNavaid::Loc(loc)))
        }
        6 => {
            let after_airport = raw.rest.splitn(2, char::is_whitespace).nth(1).unwrap_or(raw.rest);
            let name = strip_subtype(after_airport, subtype);
            // magvar doubles as glideslope angle (tenths of a degree)
            // for GS records in the source format.
            let gs = Gs::new(raw.id, name, position, elev_m, freq_khz, range_m, raw.magvar, raw.magvar);
            Ok(Some(ParsedNavaid::Gs(gs)))
        }
        7 | 8 | 9 => {
            let kind = match raw.line_code {
                7 => MarkerKind::Outer,
                8 => MarkerKind::Middle,
                _ => MarkerKind::Inner,
            };
            let after_airport = raw.rest.splitn(2, char::is_whitespace).nth(1).unwrap_or(raw.rest);
            let name = strip_subtype(after_airport, subtype);
            let marker = Marker::new(raw.id, name, position, raw.magvar, kind, MARKER_RANGE_NM * NM_TO_METERS);
            Ok(Some(ParsedNavaid::Marker(marker)))
        }
        12 | 13 => parse_dme_or_tacan(&raw, subtype, cycle, elev_m, freq_khz, position),
        other => Err(format!("unknown navaid line code {other}")),
    }
}

#[allow(clippy::too_many_arguments)]
fn parse_dme_or_tacan(
    raw: &RawLine<'_>,
    subtype: &str,
    cycle: f64,
    elev_m: f64,
    freq_khz: u32,
    position: LatLon,
) -> Result<Option<ParsedNavaid>, String> {
    let (real_subtype, name_rest) = if cycle > DME_SHIFT_CYCLE && subtype != "DME-ILS" {
        match second_last_token(raw.rest) {
            Some(sub_sub) if matches!(sub_sub, "NDB-DME" | "TACAN" | "VORTAC" | "VOR-DME") => {
                (sub_sub, strip_subtype(raw.rest, sub_sub))
            }
            _ => (subtype, strip_subtype(raw.rest, subtype)),
        }
    } else {
        (subtype, strip_subtype(raw.rest, subtype))
    };

    let bias_m = raw.magvar * NM_TO_METERS;
    let range_m = raw.range_nm * NM_TO_METERS;

    let kind = match real_subtype {
        "DME-ILS" => DmeSubtype::DmeIls,
        "TACAN" => DmeSubtype::Tacan,
        "VOR-DME" => DmeSubtype::VorDme,
        "VORTAC" => DmeSubtype::Vortac,
        "DME" => DmeSubtype::Dme,
        "NDB-DME" => DmeSubtype::NdbDme,
        _ => DmeSubtype::Unknown,
    };

    let dme = || Dme::new(raw.id, name_rest, position, elev_m, freq_khz, range_m, bias_m);
    let tacan = || Tacan::new(raw.id, name_rest, position, elev_m, freq_khz, range_m, 0.0, bias_m);

    match kind {
        DmeSubtype::Unknown => Ok(None),
        DmeSubtype::Tacan => Ok(Some(ParsedNavaid::DmeLike {
            subtype: kind,
            dme: None,
            tacan: Some(tacan()),
        })),
        _ => Ok(Some(ParsedNavaid::DmeLike {
            subtype: kind,
            dme: Some(dme()),
            tacan: None,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vor_line_strips_subtype_from_name() {
        let line = "3   37.619000 -122.374000   13  11580  130   17 SFO SAN FRANCISCO VOR";
        let parsed = parse_navaid_line(line, 2008.05).unwrap().unwrap();
        match parsed {
            ParsedNavaid::Vor(vor) => {
                assert_eq!(vor.name, "SAN FRANCISCO");
                assert_eq!(vor.freq_khz, 115_800);
            }
            _ => panic!("expected VOR"),
        }
    }

    #[test]
    fn ndb_frequency_is_not_scaled() {
        let line = "2   37.619000 -122.374000   13   362  50   0 OAK OAKLAND NDB";
        let parsed = parse_navaid_line(line, 2008.05).unwrap().unwrap();
        match parsed {
            ParsedNavaid::Ndb(ndb) => assert_eq!(ndb.freq_khz, 362),
            _ => panic!("expected NDB"),
        }
    }

    #[test]
    fn marker_gets_fixed_range() {
        let line = "7 37.6 -122.4 0 0 0 270 IAA SFO 28L OM";
        let parsed = parse_navaid_line(line, 2008.05).unwrap().unwrap();
        match parsed {
            ParsedNavaid::Marker(marker) => {
                assert_eq!(marker.range_m, MARKER_RANGE_NM * NM_TO_METERS);
                assert_eq!(marker.kind, MarkerKind::Outer);
            }
            _ => panic!("expected marker"),
        }
    }

    #[test]
    fn post_shift_vortac_is_recovered_via_lookback() {
        let line = "12 37.6 -122.4 13 1158 130 17 SFO SAN FRANCISCO VORTAC DME";
        let parsed = parse_navaid_line(line, 2008.05).unwrap().unwrap();
        match parsed {
            ParsedNavaid::DmeLike { subtype, tacan, .. } => {
                assert_eq!(subtype, DmeSubtype::Vortac);
                assert!(tacan.is_none());
            }
            _ => panic!("expected DME-like"),
        }
    }

    #[test]
    fn pre_shift_vortac_uses_subtype_directly() {
        let line = "12 37.6 -122.4 13 1158 130 17 SFO SAN FRANCISCO VORTAC";
        let parsed = parse_navaid_line(line, 2006.0).unwrap().unwrap();
        match parsed {
            ParsedNavaid::DmeLike { subtype, .. } => assert_eq!(subtype, DmeSubtype::Vortac),
            _ => panic!("expected DME-like"),
        }
    }

    #[test]
    fn plain_dme_is_independent() {
        let line = "12 37.6 -122.4 13 1158 130 0 BDL BRADLEY DME";
        let parsed = parse_navaid_line(line, 2008.05).unwrap().unwrap();
        match parsed {
            ParsedNavaid::DmeLike { subtype, dme, .. } => {
                assert_eq!(subtype, DmeSubtype::Dme);
                assert!(dme.is_some());
            }
            _ => panic!("expected DME-like"),
        }
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(parse_raw_line("not a valid navaid line").is_none());
    }

    #[test]
    fn markers_attach_to_loc_by_runway_suffix_not_id() {
        let loc_line = "4 37.6 -122.4 13 11000 18 0 ISFO SFO 28L ILS-cat-I";
        let marker_line = "7 37.6 -122.4 0 0 0 270 IAA SFO 28L OM";

        let loc = match parse_navaid_line(loc_line, 2008.05).unwrap().unwrap() {
            ParsedNavaid::Loc(loc) => loc,
            _ => panic!("expected LOC"),
        };
        let marker = match parse_navaid_line(marker_line, 2008.05).unwrap().unwrap() {
            ParsedNavaid::Marker(marker) => marker,
            _ => panic!("expected marker"),
        };

        // Different station ids, same runway suffix: the pairing rule
        // must go by name, not id.
        assert_ne!(loc.common.id, marker.common.id);
        assert_eq!(loc.name, marker.name);

        let mut waypoints = vec![Waypoint::Loc(loc), Waypoint::Marker(marker)];
        let systems = assemble_ils(&mut waypoints);
        assert_eq!(systems.len(), 1);
        match &systems[0] {
            NavaidSystem::Ils { markers, .. } => assert_eq!(markers.len(), 1),
            _ => panic!("expected ILS system"),
        }
        assert!(waypoints.is_empty());
    }
}
