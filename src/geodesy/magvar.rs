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

use time::{Date, Month};
use world_magnetic_model::{
    uom::si::angle::degree,
    uom::si::f32::{Angle as UomAngle, Length as UomLength},
    uom::si::length::meter,
    GeomagneticField,
};

/// Returns the magnetic variation (declination) in degrees east at the
/// given position, elevation and Julian date.
///
/// Positive values are east, negative west, matching the sign convention
/// used for every navaid/waypoint `mag_var` field in this crate.
pub fn magnetic_variation(lat_deg: f64, lon_deg: f64, elev_m: f64, julian_date: f64) -> f64 {
    let date = julian_to_date(julian_date);

    let field = match GeomagneticField::new(
        UomLength::new::<meter>(elev_m as f32),
        UomAngle::new::<degree>(lat_deg as f32),
        UomAngle::new::<degree>(lon_deg as f32),
        date,
    ) {
        Ok(field) => field,
        Err(_) => return 0.0,
    };

    field.declination().get::<degree>() as f64
}

/// Converts a Julian date to a calendar [`Date`].
///
/// `world_magnetic_model` needs a calendar date for its secular-variation
/// term; the Julian day count used elsewhere in the flight-track pipeline
/// is converted via the standard Julian-to-Gregorian algorithm.
fn julian_to_date(julian_date: f64) -> Date {
    let jd = julian_date + 0.5;
    let z = jd.floor();
    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = (b - d - (30.6001 * e).floor()) as u32;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 } as u32;
    let year = if month > 2 { c - 4716.0 } else { c - 4715.0 } as i32;

    let month_enum = Month::try_from(month as u8).unwrap_or(Month::January);
    Date::from_calendar_date(year, month_enum, day.clamp(1, 28) as u8)
        .unwrap_or(Date::from_calendar_date(year, Month::January, 1).expect("valid fallback date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn julian_to_date_handles_j2000() {
        // 2000-01-01 12:00 UTC has Julian date 2451545.0
        let date = julian_to_date(2_451_545.0);
        assert_eq!(date.year(), 2000);
    }

    #[test]
    fn magnetic_variation_returns_a_small_angle() {
        // Somewhere in central Europe, variation should be within +/-10deg.
        let v = magnetic_variation(50.0, 9.0, 0.0, 2_460_000.0);
        assert!(v.abs() < 10.0);
    }
}
