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

//! Configuration owned by the [`Controller`](crate::controller::Controller):
//! the paths and tuning knobs the loader, tile manager and palette manager
//! read at startup (spec.md §6, "Configuration").

use std::path::PathBuf;

use crate::error::Error;

/// The flat set of keys the core recognises. Unlike the original's raw
/// string-keyed map, values are parsed and typed once at construction so
/// a malformed `map_size` surfaces immediately as a [`Error::Parse`]
/// rather than silently propagating a zero or a panic deep inside the
/// tile worker.
#[derive(Clone, PartialEq, Debug)]
pub struct Config {
    /// Filesystem root the tile manager walks for scenery (`Terrain/...`).
    pub scenery_root: PathBuf,
    /// Where generated and synced map PNGs are cached.
    pub atlas_root: PathBuf,
    /// FlightGear's `$FG_ROOT`, holding the navaid/airport database.
    pub fg_root: PathBuf,
    /// Path to the external `Map` rendering tool.
    pub map_executable: PathBuf,
    /// `host::module` rsync source for scenery sync.
    pub rsync_server: String,
    /// Hires map edge length in pixels.
    pub map_size: u32,
    /// Lowres map edge length in pixels; `0` disables lowres generation.
    pub lowres_map_size: u32,
}

impl Config {
    /// Builds a [`Config`] from raw string values, the shape configuration
    /// arrives in from a preferences file or command line. Returns
    /// [`Error::Parse`] if `map_size` or `lowres_map_size` isn't an
    /// unsigned integer.
    pub fn from_raw(
        scenery_root: impl Into<PathBuf>,
        atlas_root: impl Into<PathBuf>,
        fg_root: impl Into<PathBuf>,
        map_executable: impl Into<PathBuf>,
        rsync_server: impl Into<String>,
        map_size: &str,
        lowres_map_size: &str,
    ) -> Result<Self, Error> {
        let map_size = parse_size(map_size, "map_size")?;
        let lowres_map_size = parse_size(lowres_map_size, "lowres_map_size")?;
        Ok(Self {
            scenery_root: scenery_root.into(),
            atlas_root: atlas_root.into(),
            fg_root: fg_root.into(),
            map_executable: map_executable.into(),
            rsync_server: rsync_server.into(),
            map_size,
            lowres_map_size,
        })
    }
}

fn parse_size(raw: &str, key: &str) -> Result<u32, Error> {
    raw.parse().map_err(|_| Error::BadRecord {
        file: "config".to_string(),
        line: 0,
        why: format!("{key}: not an unsigned integer: {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_config() {
        let config = Config::from_raw(
            "/scenery", "/atlas", "/fgdata", "/usr/bin/Map", "scenery.flightgear.org", "1000", "256",
        )
        .unwrap();
        assert_eq!(config.map_size, 1000);
        assert_eq!(config.lowres_map_size, 256);
    }

    #[test]
    fn rejects_malformed_map_size() {
        let result = Config::from_raw("/scenery", "/atlas", "/fgdata", "/usr/bin/Map", "server", "big", "256");
        assert!(matches!(result, Err(Error::BadRecord { .. })));
    }

    #[test]
    fn zero_lowres_size_is_allowed_and_means_disabled() {
        let config = Config::from_raw("/scenery", "/atlas", "/fgdata", "/usr/bin/Map", "server", "1000", "0").unwrap();
        assert_eq!(config.lowres_map_size, 0);
    }
}
