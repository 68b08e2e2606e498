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

//! Crate-level end-to-end scenarios, mirroring `efb/tests/aixm_test.rs`:
//! each test drives the public API the way an embedding application
//! would, across module boundaries, rather than exercising one
//! function in isolation.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use atlas_core::geodesy::LatLon;
use atlas_core::loader::{parse_airways, parse_fixes, parse_navaids};
use atlas_core::searcher::Searcher;
use atlas_core::tile::lat_lon_to_tile;
use atlas_core::track::FlightTrack;
use atlas_core::waypoint::{Searchable, Waypoint};

fn gzip_fixture(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    encoder.finish().unwrap();
    path
}

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("atlas-core-e2e-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Scenario 1: load a VOR from a `nav.dat` fixture, then find it by
/// name through the searcher.
#[test]
fn vor_lookup() {
    let dir = scratch_dir("vor");
    let path = gzip_fixture(
        &dir,
        "nav.dat.gz",
        &[
            "I",
            "810 Version - data cycle 2008.05",
            "3   37.619000 -122.374000   13  11580  130   17 SFO SAN FRANCISCO VOR",
            "99",
        ],
    );

    let (waypoints, _systems) = parse_navaids(&path).unwrap();
    assert_eq!(waypoints.len(), 1);

    let mut searcher = Searcher::new();
    for wp in waypoints {
        let entity: std::rc::Rc<dyn Searchable> = std::rc::Rc::new(wp);
        searcher.add(entity);
    }

    let centre = LatLon::new(37.6, -122.4).to_cart(0.0);
    assert!(searcher.find_matches("sfo", centre, None));
    let found: Vec<_> = searcher.matches().map(|m| m.as_string()).collect();
    assert_eq!(found.len(), 1);
    assert!(found[0].starts_with("VOR: SFO SAN FRANCISCO VOR"));

    std::fs::remove_dir_all(&dir).unwrap();
}

/// Scenario 2: a fix referenced by a low-altitude airway segment picks
/// up the enroute flag once loading completes.
#[test]
fn airway_fix_upgrade() {
    let dir = scratch_dir("airway");
    let fix_path = gzip_fixture(
        &dir,
        "fix.dat.gz",
        &["I", "600 Version", "40.000000 -120.000000 FOO", "99"],
    );
    let airway_path = gzip_fixture(
        &dir,
        "awy.dat.gz",
        &["I", "640 Version", "FOO 40.0 -120.0 BAR 41.0 -119.0 1 0 180 V1", "99"],
    );

    let fixes = parse_fixes(&fix_path).unwrap();
    assert_eq!(fixes.len(), 1);
    let mut waypoints: Vec<Waypoint> = fixes.into_iter().map(Waypoint::Fix).collect();

    let airways = parse_airways(&airway_path, &mut waypoints).unwrap();
    assert_eq!(airways.len(), 1);

    let foo = waypoints.iter().find(|w| w.id() == "FOO").unwrap();
    match foo {
        Waypoint::Fix(fix) => assert!(fix.is_enroute()),
        _ => panic!("expected FOO to resolve to a Fix"),
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

/// Scenario 3: a track file written in the atlas wire protocol parses
/// to the expected sample, and saving then re-loading it round-trips.
#[test]
fn atlas_protocol_round_trip() {
    let dir = scratch_dir("track");
    let path = dir.join("flight.fgtrack");

    // $GPRMC,120000,A,3700.000,N,12200.000,W,100.0,90.0,010118,0.0,E
    // $GPGGA,120000,3700.000,N,12200.000,W,1,,,5000,F,,,,
    // $PATLA,113.00,090.0,112.00,180.0,400
    let rmc_body = "GPRMC,120000,A,3700.000,N,12200.000,W,100.0,90.0,010118,0.0,E";
    let gga_body = "GPGGA,120000,3700.000,N,12200.000,W,1,,,5000,F,,,,";
    let patla_body = "PATLA,113.00,090.0,112.00,180.0,400";
    let contents = format!(
        "${rmc_body}*{:02X}\n${gga_body}*{:02X}\n${patla_body}*{:02X}\n",
        checksum(rmc_body),
        checksum(gga_body),
        checksum(patla_body),
    );
    std::fs::write(&path, contents).unwrap();

    let mut track = FlightTrack::from_file(&path).unwrap();
    assert_eq!(track.len(), 1);
    let sample = track.at(0).unwrap();
    assert_eq!(sample.lat, 37.0);
    assert_eq!(sample.lon, -122.0);
    assert_eq!(sample.alt_ft, 5000.0);
    assert_eq!(sample.hdg_deg, 90.0);
    assert_eq!(sample.spd_kt, 100.0);
    assert_eq!(sample.nav1_freq_khz, 113_000);
    assert_eq!(sample.nav1_radial, 90.0);
    assert_eq!(sample.adf_freq_khz, 400);
    let original = sample.clone();

    track.save().unwrap();
    let reloaded = FlightTrack::from_file(&path).unwrap();
    let round_tripped = reloaded.at(0).unwrap();
    assert_eq!(round_tripped.lat, original.lat);
    assert_eq!(round_tripped.lon, original.lon);
    assert_eq!(round_tripped.alt_ft, original.alt_ft);
    assert_eq!(round_tripped.hdg_deg, original.hdg_deg);
    assert_eq!(round_tripped.spd_kt, original.spd_kt);
    assert_eq!(round_tripped.nav1_freq_khz, original.nav1_freq_khz);
    assert_eq!(round_tripped.nav1_radial, original.nav1_radial);
    assert_eq!(round_tripped.adf_freq_khz, original.adf_freq_khz);

    std::fs::remove_dir_all(&dir).unwrap();
}

fn checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Scenario 4: a live track capped at 3 samples evicts its oldest
/// sample and recomputes offsets from the new first sample.
#[test]
fn buffer_eviction() {
    let mut track = FlightTrack::new_udp(15_600, 3).unwrap();

    for i in 0..5 {
        let mut sample = atlas_core::track::FlightSample {
            time_epoch: 1_000 + i,
            lat: 37.0 + i as f64 * 0.01,
            lon: -122.0,
            alt_ft: 1000.0,
            hdg_deg: 90.0,
            spd_kt: 100.0,
            ..Default::default()
        };
        sample.recompute_cart();
        track.add_sample(sample, 0.0);
    }

    assert_eq!(track.len(), 3);
    assert_eq!(track.at(0).unwrap().cum_dist_m, 0.0);
}

/// Scenario 5: tile naming for a point in each hemisphere combination.
#[test]
fn tile_naming() {
    assert_eq!(
        lat_lon_to_tile(36.7, -120.2),
        ("w121n36".to_string(), "w130n30".to_string(), 36.5, -120.5)
    );
    assert_eq!(
        lat_lon_to_tile(-0.5, 0.5),
        ("e000s01".to_string(), "e000s10".to_string(), -0.5, 0.5)
    );
}

/// Scenario 6: incremental search accumulates across calls, and a
/// narrower query (a trailing space closing off the last token) never
/// grows the match set.
#[test]
fn incremental_search_narrows_on_a_closed_token() {
    use atlas_core::waypoint::Vor;

    // "CAL" itself plus three stations merely prefixed by it, so the
    // bare token "cal" is a prefix match for all four but an exact
    // (closed-token) match only for the first.
    let ids = ["CAL", "CALA", "CALB", "CALC"];
    let mut searcher = Searcher::new();
    for id in ids {
        let entity: std::rc::Rc<dyn Searchable> = std::rc::Rc::new(Waypoint::Vor(Vor::new(
            id,
            "STATION",
            LatLon::new(0.0, 0.0),
            0.0,
            115_000,
            100_000.0,
            0.0,
        )));
        searcher.add(entity);
    }

    let centre = LatLon::new(0.0, 0.0).to_cart(0.0);
    searcher.find_matches("cal", centre, Some(2));
    assert!(searcher.matches().count() >= 2);

    let before: std::collections::HashSet<String> = searcher.matches().map(|m| m.as_string()).collect();
    searcher.find_matches("cal", centre, Some(2));
    let after: std::collections::HashSet<String> = searcher.matches().map(|m| m.as_string()).collect();
    assert!(before.is_subset(&after));
    assert_eq!(after.len(), 4);

    searcher.find_matches("cal ", centre, None);
    let narrowed: std::collections::HashSet<String> = searcher.matches().map(|m| m.as_string()).collect();
    assert!(narrowed.len() < after.len());
    assert!(narrowed.is_subset(&after));
}
