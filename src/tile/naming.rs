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

//! Scenery tile naming: `latLonToTileInfo`/`nameToLatLon` from
//! `TileManager.cxx`. A tile name like `w121n36` identifies the 1°×1°
//! cell; its `dir` like `w130n30` identifies the 10°×10° scenery
//! directory that contains it.

/// Splits `latitude`/`longitude` into the 1° tile name, its enclosing
/// 10° directory name, and the tile's centre point.
///
/// The sign characters for both strings come from the *signed*,
/// floored lat/lon, computed before the 10°-banding division — so a
/// point just south of the equator (e.g. `-0.5`) yields a `dir` whose
/// 10° band is labelled `s10` even though the numeric floor of
/// `-1/10` is `-10`, not `-0`: the band is "south of the equator",
/// named from where its southernmost edge sits, not arithmetic rounding.
pub fn lat_lon_to_tile(latitude: f64, longitude: f64) -> (String, String, f64, f64) {
    let lat = latitude.floor() as i32;
    let lon = longitude.floor() as i32;
    let lat = lat.clamp(-90, 89);
    let lon = lon.clamp(-180, 179);

    let lat10 = (lat as f64 / 10.0).floor() as i32 * 10;
    let lon10 = (lon as f64 / 10.0).floor() as i32 * 10;

    let center_lat = lat as f64 + 0.5;
    let center_lon = lon as f64 + 0.5;

    let ns = if lat < 0 { 's' } else { 'n' };
    let ew = if lon < 0 { 'w' } else { 'e' };

    let lat = lat.abs();
    let lon = lon.abs();
    let lat10 = lat10.abs();
    let lon10 = lon10.abs();

    let name = format!("{ew}{lon:03}{ns}{lat:02}");
    let dir = format!("{ew}{lon10:03}{ns}{lat10:02}");

    (name, dir, center_lat, center_lon)
}

/// Inverse of [`lat_lon_to_tile`]'s name half: recovers the tile's
/// centre point from its name.
pub fn name_to_centre(name: &str) -> Option<(f64, f64)> {
    let bytes = name.as_bytes();
    if bytes.len() < 7 {
        return None;
    }
    let ew = name.chars().next()?;
    let lon: i32 = name.get(1..4)?.parse().ok()?;
    let ns = name.chars().nth(4)?;
    let lat: i32 = name.get(5..7)?.parse().ok()?;

    let lon = if ew == 'w' { -lon } else { lon };
    let lat = if ns == 's' { -lat } else { lat };

    Some((lat as f64 + 0.5, lon as f64 + 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_northern_hemisphere_tile() {
        let (name, dir, clat, clon) = lat_lon_to_tile(36.7, -120.2);
        assert_eq!(name, "w121n36");
        assert_eq!(dir, "w130n30");
        assert_eq!(clat, 36.5);
        assert_eq!(clon, -120.5);
    }

    #[test]
    fn sign_of_ten_degree_band_follows_floored_lat_not_band_arithmetic() {
        let (name, dir, clat, clon) = lat_lon_to_tile(-0.5, 0.5);
        assert_eq!(name, "e000s01");
        assert_eq!(dir, "e000s10");
        assert_eq!(clat, -0.5);
        assert_eq!(clon, 0.5);
    }

    #[test]
    fn name_to_centre_inverts_naming() {
        assert_eq!(name_to_centre("w121n36"), Some((36.5, -120.5)));
        assert_eq!(name_to_centre("e000s01"), Some((-0.5, 0.5)));
    }

    #[test]
    fn latitude_and_longitude_are_clamped_to_legal_range() {
        let (name, ..) = lat_lon_to_tile(90.0, 180.0);
        assert_eq!(name, "e179n89");
    }
}
