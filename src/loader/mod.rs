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

//! Loads the five gzip-compressed, line-oriented navigation data files
//! into a [`NavigationDatabase`].
//!
//! Each sub-parser follows the same shape as a single ARINC 424 record
//! conversion: read one logical record, `try_from` it into a domain
//! type, and either add it to the builder or record a [`Error::BadRecord`]
//! and move on. A malformed version header is the one failure that
//! aborts the whole file.

mod airports;
mod airways;
mod fixes;
mod navaids;

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::rc::Rc;

use flate2::read::GzDecoder;
use log::warn;

use crate::airport::Airport;
use crate::airway::Airway;
use crate::error::Error;
use crate::waypoint::{NavaidSystem, NavaidSystemRegistry, Waypoint};

pub use airports::parse_airports;
pub use airways::parse_airways;
pub use fixes::parse_fixes;
pub use navaids::parse_navaids;

/// The fully assembled result of a load: every waypoint (plain fixes and
/// navaids alike), every co-located navaid system, every airway and
/// every airport.
#[derive(Default)]
pub struct NavigationDatabase {
    pub waypoints: Vec<Rc<Waypoint>>,
    pub systems: Vec<NavaidSystem>,
    pub system_registry: NavaidSystemRegistry,
    pub airways: Vec<Airway>,
    pub airports: Vec<Airport>,
}

/// Accumulates the pieces of a [`NavigationDatabase`] as each source
/// file is parsed, matching each parser's `BadRecord`-skip-and-continue
/// contract: a parser records what it can and returns the records that
/// failed via the caller's log, never via a hard error.
#[derive(Default)]
pub struct NavigationDatabaseBuilder {
    waypoints: Vec<Rc<Waypoint>>,
    systems: Vec<NavaidSystem>,
    airways: Vec<Airway>,
    airports: Vec<Airport>,
}

impl NavigationDatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_waypoint(&mut self, wp: Waypoint) {
        self.waypoints.push(Rc::new(wp));
    }

    pub fn add_system(&mut self, system: NavaidSystem) {
        self.systems.push(system);
    }

    pub fn add_airway(&mut self, airway: Airway) {
        self.airways.push(airway);
    }

    pub fn add_airport(&mut self, airport: Airport) {
        self.airports.push(airport);
    }

    pub fn waypoints(&self) -> &[Rc<Waypoint>] {
        &self.waypoints
    }

    pub fn build(self) -> NavigationDatabase {
        let mut system_registry = NavaidSystemRegistry::new();
        system_registry.rebuild(&self.systems);
        NavigationDatabase {
            waypoints: self.waypoints,
            systems: self.systems,
            system_registry,
            airways: self.airways,
            airports: self.airports,
        }
    }
}

/// Loads all five files rooted at `fg_root` (FlightGear's `$FG_ROOT`
/// layout: `Navaids/nav.dat.gz`, `Navaids/fix.dat.gz`,
/// `Navaids/awy.dat.gz`, `Airports/apt.dat.gz`) into one database.
pub fn load_all(fg_root: &Path) -> Result<NavigationDatabase, Error> {
    let mut builder = NavigationDatabaseBuilder::new();

    let navaids_path = fg_root.join("Navaids/nav.dat.gz");
    let (mut waypoints, navaid_systems) = parse_navaids(&navaids_path)?;
    for system in navaid_systems {
        builder.add_system(system);
    }

    let fixes_path = fg_root.join("Navaids/fix.dat.gz");
    for fix in parse_fixes(&fixes_path)? {
        waypoints.push(Waypoint::Fix(fix));
    }

    // Airway endpoint resolution needs mutable access to the assembled
    // waypoint list (to flag fixes used by a low-altitude airway as
    // enroute) before anything is handed to the builder.
    let airways_path = fg_root.join("Navaids/awy.dat.gz");
    for airway in parse_airways(&airways_path, &mut waypoints)? {
        builder.add_airway(airway);
    }

    for wp in waypoints {
        builder.add_waypoint(wp);
    }

    let airports_path = fg_root.join("Airports/apt.dat.gz");
    for airport in parse_airports(&airports_path)? {
        builder.add_airport(airport);
    }

    Ok(builder.build())
}

/// Opens `path`, gzip-decompresses it, and splits it into lines.
///
/// Every source file is small enough (tens of MB at most) that reading
/// it whole is simpler than streaming, and the loader is a one-shot
/// startup cost, not a hot path.
fn read_gzip_lines(path: &Path) -> Result<Vec<String>, Error> {
    let file = std::fs::File::open(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut contents = String::new();
    decoder
        .read_to_string(&mut contents)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// Checks that `lines[1]` (the version header, after the Windows/Mac
/// banner on line 0) begins with `expected`. The header carries
/// trailing free text (a data cycle, sometimes a `DAFIF` marker) that
/// callers needing the data cycle parse themselves.
fn check_version(lines: &[String], file: &str, expected: &str) -> Result<(), Error> {
    let header = lines.get(1).ok_or_else(|| Error::Parse {
        file: file.to_string(),
        line: 2,
    })?;
    let found_version = header.split_whitespace().next().unwrap_or("");
    if found_version != expected {
        return Err(Error::BadVersion {
            file: file.to_string(),
            expected: version_leak(expected),
            found: header.clone(),
        });
    }
    Ok(())
}

/// `BadVersion::expected` wants a `&'static str`; every caller passes a
/// literal, so this just asserts that down rather than allocating.
fn version_leak(expected: &str) -> &'static str {
    match expected {
        "810" => "810",
        "600" => "600",
        "640" => "640",
        "1000" => "1000",
        other => {
            warn!("unexpected version constant {other:?} passed to check_version");
            "unknown"
        }
    }
}

/// Extracts the data cycle (e.g. `2008.05`) from a navaid file's
/// version header, used to decide whether the DME-subtype-shift
/// workaround applies. Defaults to `0.0` (pre-shift behaviour) if the
/// header doesn't carry one, which is conservative: the affected files
/// are all recent enough to include it.
fn parse_data_cycle(header: &str) -> f64 {
    header
        .rsplit("cycle")
        .next()
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|token| token.parse().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_data_cycle_reads_trailing_number() {
        assert_eq!(parse_data_cycle("810 Version - data cycle 2008.05"), 2008.05);
    }

    #[test]
    fn parse_data_cycle_handles_dafif_variant() {
        assert_eq!(
            parse_data_cycle("810 Version - DAFIF data cycle 2007.09"),
            2007.09
        );
    }

    #[test]
    fn parse_data_cycle_defaults_when_absent() {
        assert_eq!(parse_data_cycle("no cycle info here"), 0.0);
    }

    #[test]
    fn check_version_accepts_matching_prefix() {
        let lines = vec!["header".to_string(), "810 Version - data cycle 2008.05".to_string()];
        assert!(check_version(&lines, "nav.dat", "810").is_ok());
    }

    #[test]
    fn check_version_rejects_mismatch() {
        let lines = vec!["header".to_string(), "600 Version".to_string()];
        assert!(matches!(
            check_version(&lines, "nav.dat", "810"),
            Err(Error::BadVersion { .. })
        ));
    }
}
