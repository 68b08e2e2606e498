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

//! Parses `Navaids/fix.dat.gz` (version 600): plain named points with
//! no transmitting equipment, each `<lat> <lon> <name>`.
//!
//! A fix's enroute status (used/unused by low-altitude airways) isn't
//! known until the airway file is parsed; [`parse_fixes`] always
//! returns fixes defaulted to not-enroute, matching the source format
//! which carries no such flag either.

use std::path::Path;

use log::warn;

use crate::error::Error;
use crate::geodesy::LatLon;
use crate::waypoint::Fix;

use super::{check_version, read_gzip_lines};

pub fn parse_fixes(path: &Path) -> Result<Vec<Fix>, Error> {
    let lines = read_gzip_lines(path)?;
    check_version(&lines, "fix.dat", "600")?;

    let mut fixes = Vec::new();
    for (lineno, line) in lines.iter().enumerate().skip(2) {
        if line.is_empty() {
            continue;
        }
        if line == "99" {
            break;
        }

        match parse_fix_line(line) {
            Some(fix) => fixes.push(fix),
            None => warn!("fix.dat:{}: malformed line: {line:?}", lineno + 1),
        }
    }
    Ok(fixes)
}

fn parse_fix_line(line: &str) -> Option<Fix> {
    let mut fields = line.split_whitespace();
    let lat: f64 = fields.next()?.parse().ok()?;
    let lon: f64 = fields.next()?.parse().ok()?;
    let name = fields.next()?;
    Some(Fix::new(name, LatLon::new(lat, lon)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_fix_line() {
        let fix = parse_fix_line("37.618900 -122.374080 ALCAT").unwrap();
        assert_eq!(fix.common.id, "ALCAT");
        assert!(!fix.is_enroute());
    }

    #[test]
    fn rejects_a_line_missing_a_field() {
        assert!(parse_fix_line("37.618900 -122.374080").is_none());
    }
}
